//! Relational Abstract Machine
//!
//! The imperative intermediate representation produced by the Datalog
//! backend: relation declarations, a main statement, named subroutines and a
//! symbol table. Nodes live in an [`Arena`] and refer to each other by typed
//! index.
//!
//! Programs can be rendered as text (`Display`), serialized to JSON, or run
//! with the reference [`Interpreter`].

pub mod arena;
pub mod interpret;
pub mod ir;
mod print;
pub mod program;
pub mod symbol_table;

pub use arena::Arena;
pub use interpret::{InterpretError, InterpretResult, Interpreter, RelationStore, Tuple};
pub use ir::{
    AggregateFunction, CondId, Condition, ConstraintOp, ExprId, Expression, IntrinsicOp, OpId,
    Operation, RamDomain, StmtId, Statement,
};
pub use program::{Program, Relation, Representation, Subroutine};
pub use symbol_table::SymbolTable;
