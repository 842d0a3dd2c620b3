//! Existence checks over relations with bookkeeping columns

use ram::{Arena, CondId, Condition, ExprId};

/// `values IN relation`, with `auxiliary_arity` trailing wildcards for the
/// columns the caller cannot know
pub fn existence_check(
    arena: &mut Arena,
    relation: &str,
    mut values: Vec<ExprId>,
    auxiliary_arity: usize,
) -> CondId {
    for _ in 0..auxiliary_arity {
        values.push(arena.undef());
    }
    arena.cond(Condition::ExistenceCheck {
        relation: relation.to_string(),
        values,
    })
}
