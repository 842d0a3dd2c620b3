//! Argument to expression translation

use crate::builder::ProgramBuilder;
use crate::error::{TranslationError, TranslationResult};
use crate::value_index::ValueIndex;
use datalog_ast::{Argument, Constant, FunctorOp};
use ram::{Expression, ExprId, IntrinsicOp};

pub fn translate_value(
    out: &mut ProgramBuilder,
    index: &ValueIndex,
    arg: &Argument,
) -> TranslationResult<ExprId> {
    let expr = match arg {
        Argument::Variable(name) => {
            let loc = index
                .definition_point(*name)
                .ok_or_else(|| TranslationError::UndefinedVariable(name.to_string()))?;
            Expression::TupleElement {
                tuple: loc.tuple,
                element: loc.element,
            }
        }
        Argument::UnnamedVariable => Expression::UndefValue,
        Argument::Constant(constant) => match constant {
            Constant::Number(n) => Expression::SignedConstant(*n),
            Constant::Unsigned(u) => Expression::UnsignedConstant(*u),
            Constant::Float(f) => Expression::FloatConstant(*f),
            Constant::String(s) => Expression::SignedConstant(out.symbols.encode(s)),
            Constant::Nil => Expression::SignedConstant(0),
        },
        Argument::IntrinsicFunctor { op, args } => Expression::IntrinsicOperator {
            op: intrinsic_op(*op),
            args: translate_values(out, index, args)?,
        },
        Argument::UserDefinedFunctor { name, args } => Expression::UserDefinedOperator {
            name: name.to_string(),
            args: translate_values(out, index, args)?,
        },
        Argument::Aggregator(aggregator) => {
            let loc = index
                .generator_location(aggregator)
                .ok_or_else(|| TranslationError::UnboundAggregate(arg.to_string()))?;
            Expression::TupleElement {
                tuple: loc.tuple,
                element: loc.element,
            }
        }
        Argument::RecordInit(args) => Expression::PackRecord(translate_values(out, index, args)?),
        Argument::Counter => Expression::AutoIncrement,
    };
    Ok(out.arena.expr(expr))
}

fn translate_values(
    out: &mut ProgramBuilder,
    index: &ValueIndex,
    args: &[Argument],
) -> TranslationResult<Vec<ExprId>> {
    args.iter().map(|a| translate_value(out, index, a)).collect()
}

fn intrinsic_op(op: FunctorOp) -> IntrinsicOp {
    match op {
        FunctorOp::Add => IntrinsicOp::Add,
        FunctorOp::Sub => IntrinsicOp::Sub,
        FunctorOp::Mul => IntrinsicOp::Mul,
        FunctorOp::Div => IntrinsicOp::Div,
        FunctorOp::Mod => IntrinsicOp::Mod,
        FunctorOp::Neg => IntrinsicOp::Neg,
        FunctorOp::Max => IntrinsicOp::Max,
        FunctorOp::Min => IntrinsicOp::Min,
        FunctorOp::Cat => IntrinsicOp::Cat,
        FunctorOp::StrLen => IntrinsicOp::StrLen,
    }
}
