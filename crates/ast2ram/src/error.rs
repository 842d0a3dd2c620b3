//! Translation errors
//!
//! Every error here means an upstream pass handed over a program it should
//! have rejected. Translation stops at the first one and produces nothing.

use datalog_analysis::TypeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("relation '{0}' is used but never declared")]
    UndeclaredRelation(String),
    #[error("unhandled argument '{0}'")]
    UnhandledArgument(String),
    #[error("variable '{0}' has no subroutine slot")]
    MissingSlot(String),
    #[error("variable '{0}' is not bound by the clause body")]
    UndefinedVariable(String),
    #[error("clause '{0}' has no sequence number")]
    UnnumberedClause(String),
    #[error("aggregate '{0}' has no generator")]
    UnboundAggregate(String),
    #[error("aggregate '{0}' must range over exactly one atom")]
    UnsupportedAggregate(String),
    #[error(transparent)]
    Type(#[from] TypeError),
}

pub type TranslationResult<T> = Result<T, TranslationError>;
