//! Literal to condition translation

use crate::builder::{concrete_relation_name, ProgramBuilder};
use crate::context::TranslatorContext;
use crate::error::TranslationResult;
use crate::existence_check::existence_check;
use crate::value_index::ValueIndex;
use crate::value_translator::translate_value;
use datalog_ast::{BinaryConstraintOp, Constraint, Literal};
use ram::{CondId, Condition, ConstraintOp};

pub fn translate_constraint(
    ctx: &TranslatorContext<'_>,
    out: &mut ProgramBuilder,
    index: &ValueIndex,
    literal: &Literal,
    auxiliary_arity: usize,
) -> TranslationResult<Option<CondId>> {
    let cond = match literal {
        Literal::Atom(_) => return Ok(None),
        Literal::Negation(atom) => {
            ctx.relation(&atom.name)?;
            let values = atom
                .args
                .iter()
                .map(|arg| translate_value(out, index, arg))
                .collect::<TranslationResult<Vec<_>>>()?;
            let check = existence_check(
                &mut out.arena,
                &concrete_relation_name(&atom.name),
                values,
                auxiliary_arity,
            );
            out.arena.negation(check)
        }
        Literal::Constraint(Constraint::Binary { op, lhs, rhs }) => {
            let lhs = translate_value(out, index, lhs)?;
            let rhs = translate_value(out, index, rhs)?;
            out.arena.cond(Condition::Constraint {
                op: constraint_op(*op),
                lhs,
                rhs,
            })
        }
        Literal::Constraint(Constraint::Boolean(true)) => out.arena.cond(Condition::True),
        Literal::Constraint(Constraint::Boolean(false)) => out.arena.cond(Condition::False),
    };
    Ok(Some(cond))
}

pub(crate) fn constraint_op(op: BinaryConstraintOp) -> ConstraintOp {
    match op {
        BinaryConstraintOp::Eq => ConstraintOp::Eq,
        BinaryConstraintOp::Ne => ConstraintOp::Ne,
        BinaryConstraintOp::Lt => ConstraintOp::Lt,
        BinaryConstraintOp::Le => ConstraintOp::Le,
        BinaryConstraintOp::Gt => ConstraintOp::Gt,
        BinaryConstraintOp::Ge => ConstraintOp::Ge,
    }
}
