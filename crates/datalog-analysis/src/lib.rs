//! Program analyses consulted by the RAM backend
//!
//! These are oracles: the backend asks them narrow questions ("is this clause
//! recursive", "which SCC evaluates this relation", "what may be cleared
//! after this step", "what is the type qualifier of this attribute") and
//! never inspects how they reach their answers.

pub mod recursive_clauses;
pub mod relation_schedule;
pub mod scc_graph;
pub mod type_env;

pub use recursive_clauses::RecursiveClauses;
pub use relation_schedule::{RelationSchedule, ScheduleStep};
pub use scc_graph::SccGraph;
pub use type_env::{TypeEnvironment, TypeError, TypeKind};
