//! Subproof subroutines
//!
//! Two subroutines are built for every rule. Both take the clause variables
//! in [`SlotMap`] order, so one argument tuple drives either.
//!
//! The positive subroutine is the clause query in subproof mode: given the
//! head values and a level (one extra trailing argument), it returns the body
//! tuples of a derivation below that level.
//!
//! The negation subroutine decides a single body literal against the
//! materialized relations:
//!
//! ```text
//! QUERY
//!  IF (argument(0),argument(1),_,_) IN edge
//!   RETURN (1)
//! END QUERY
//! QUERY
//!  IF (NOT (argument(0),argument(1),_,_) IN edge)
//!   RETURN (0)
//! END QUERY
//! ```
//!
//! One such branch pair is emitted per body literal (atoms and negations
//! first, then constraints). Each pair returns on both sides, so only the
//! first literal is ever decided; the remaining pairs are unreachable.

use crate::builder::{concrete_relation_name, ProgramBuilder};
use crate::clause_translator::TranslationMode;
use crate::context::TranslatorContext;
use crate::error::{TranslationError, TranslationResult};
use crate::existence_check::existence_check;
use crate::strategy::LEVEL_NUMBER_ATTRIBUTE;
use crate::value_index::ValueIndex;
use crate::variable_binder::SlotMap;
use datalog_ast::{Argument, Atom, Clause, ClauseId, Literal};
use ram::{CondId, Operation, StmtId, Subroutine};
use tracing::{debug, trace};

/// Both subroutines of one clause
#[derive(Debug)]
pub struct SubproofPair {
    /// Argument order shared by both subroutines
    pub slots: SlotMap,
    /// Returns the body tuples of a derivation below the requested level
    pub positive: Subroutine,
    /// Returns `1` or `0` for the first body literal
    pub negation: Subroutine,
}

/// Build both subroutines for the rule `id`
///
/// Fails with [`TranslationError::UnboundAggregate`] when a body constraint
/// contains an aggregator.
pub fn synthesize(
    ctx: &TranslatorContext<'_>,
    out: &mut ProgramBuilder,
    id: ClauseId,
) -> TranslationResult<SubproofPair> {
    let clause = ctx.clause(id);
    let slots = SlotMap::for_clause(clause);
    debug!(clause = %clause, slots = slots.len(), "synthesizing subproofs");

    let positive_body =
        ctx.translate_non_recursive_clause(out, id, TranslationMode::Subproof(&slots))?;
    let mut positive_parameters = slots.parameter_names();
    positive_parameters.push(LEVEL_NUMBER_ATTRIBUTE.to_string());

    let negation_body = negation_subproof(ctx, out, clause, &slots)?;

    Ok(SubproofPair {
        positive: Subroutine {
            body: positive_body,
            parameters: positive_parameters,
        },
        negation: Subroutine {
            body: negation_body,
            parameters: slots.parameter_names(),
        },
        slots,
    })
}

/// Body literals with constraints moved after atoms and negations
pub fn reorder_body(clause: &Clause) -> Vec<&Literal> {
    let (mut literals, constraints): (Vec<&Literal>, Vec<&Literal>) =
        clause.body.iter().partition(|lit| !lit.is_constraint());
    literals.extend(constraints);
    literals
}

/// One branch pair per body literal, in [`reorder_body`] order, over the
/// arguments laid out by `slots`
pub fn negation_subproof(
    ctx: &TranslatorContext<'_>,
    out: &mut ProgramBuilder,
    clause: &Clause,
    slots: &SlotMap,
) -> TranslationResult<StmtId> {
    let index = slots.value_index();
    let mut branches = Vec::new();

    for literal in reorder_body(clause) {
        let (cond, holds) = match literal {
            Literal::Atom(atom) => (atom_existence_check(ctx, out, &index, atom)?, 1),
            Literal::Negation(atom) => (atom_existence_check(ctx, out, &index, atom)?, 0),
            Literal::Constraint(_) => {
                // no generator is in scope outside the clause query
                if mentions_aggregate(literal) {
                    return Err(TranslationError::UnboundAggregate(literal.to_string()));
                }
                let cond = ctx
                    .translate_constraint(out, &index, literal)
                    .map_err(as_missing_slot)?;
                match cond {
                    Some(cond) => (cond, 1),
                    None => {
                        trace!(literal = %literal, "constraint has no condition");
                        continue;
                    }
                }
            }
        };
        slots.rewrite_cond(&mut out.arena, cond)?;
        branches.push(if_statement(out, cond, holds, 1 - holds));
    }

    Ok(out.arena.sequence(branches))
}

fn atom_existence_check(
    ctx: &TranslatorContext<'_>,
    out: &mut ProgramBuilder,
    index: &ValueIndex,
    atom: &Atom,
) -> TranslationResult<CondId> {
    ctx.relation(&atom.name)?;
    let values = atom
        .args
        .iter()
        .map(|arg| ctx.translate_value(out, index, arg))
        .collect::<TranslationResult<Vec<_>>>()
        .map_err(as_missing_slot)?;
    Ok(existence_check(
        &mut out.arena,
        &concrete_relation_name(&atom.name),
        values,
        ctx.auxiliary_arity(),
    ))
}

/// `IF cond RETURN (then)` followed by `IF NOT cond RETURN (otherwise)`
fn if_statement(out: &mut ProgramBuilder, cond: CondId, then: i64, otherwise: i64) -> StmtId {
    let copy = out.arena.clone_cond(cond);
    let negated = out.arena.negation(copy);

    let then_value = out.arena.signed(then);
    let then_return = out.arena.op(Operation::SubroutineReturn {
        values: vec![then_value],
    });
    let then_filter = out.arena.filter(cond, then_return);
    let then_branch = out.arena.query(then_filter);

    let else_value = out.arena.signed(otherwise);
    let else_return = out.arena.op(Operation::SubroutineReturn {
        values: vec![else_value],
    });
    let else_filter = out.arena.filter(negated, else_return);
    let else_branch = out.arena.query(else_filter);

    out.arena.sequence(vec![then_branch, else_branch])
}

/// Every variable of the clause has a slot, so an unbound one is a slot the
/// map failed to assign
fn as_missing_slot(err: TranslationError) -> TranslationError {
    match err {
        TranslationError::UndefinedVariable(var) => TranslationError::MissingSlot(var),
        other => other,
    }
}

fn mentions_aggregate(literal: &Literal) -> bool {
    fn walk(arg: &Argument) -> bool {
        match arg {
            Argument::Aggregator(_) => true,
            Argument::IntrinsicFunctor { args, .. }
            | Argument::UserDefinedFunctor { args, .. }
            | Argument::RecordInit(args) => args.iter().any(walk),
            _ => false,
        }
    }
    match literal {
        Literal::Constraint(datalog_ast::Constraint::Binary { lhs, rhs, .. }) => {
            walk(lhs) || walk(rhs)
        }
        _ => false,
    }
}
