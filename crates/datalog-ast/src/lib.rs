//! Validated Datalog programs
//!
//! This crate holds the program representation handed to the RAM backend
//! after parsing, type checking and the upstream rewriting passes have run.
//! Nothing here validates: every consumer may assume relations referenced by
//! clauses are declared and variables are bound.
//!
//! # Example
//!
//! ```ignore
//! use datalog_ast::{Argument, Atom, Clause, Literal, Program, Relation};
//!
//! let mut program = Program::new();
//! program.add_relation(Relation::new("edge").with_attribute("a", "number").with_attribute("b", "number"));
//! program.add_clause(Clause::new(
//!     Atom::new("path", vec![Argument::var("x"), Argument::var("y")]),
//!     vec![Literal::Atom(Atom::new("edge", vec![Argument::var("x"), Argument::var("y")]))],
//! ));
//! ```

pub mod ast;
pub mod program;

pub use ast::{
    is_level_variable, is_underscore_variable, sym, AggregateOp, Aggregator, Argument, Atom,
    BinaryConstraintOp, Clause, Constant, Constraint, FunctorOp, Literal, QualifiedName, Symbol,
    LEVEL_PREFIX, UNDERSCORE_PREFIX,
};
pub use program::{
    Attribute, ClauseId, Program, Relation, RelationQualifier, RelationRepresentation, TypeDecl,
};
