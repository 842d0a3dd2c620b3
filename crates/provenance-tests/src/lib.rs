//! Backend tests
//!
//! Programs are compiled end to end and the resulting RAM is observed with
//! the reference interpreter: relation layouts, subroutine return values,
//! info facts and fixpoint results. Property-based tests cover randomly
//! generated graphs.

#[cfg(test)]
mod programs;

#[cfg(test)]
mod relation_layout;

#[cfg(test)]
mod subproofs;

#[cfg(test)]
mod info_facts;

#[cfg(test)]
mod evaluation;

#[cfg(test)]
mod proptest_programs;
