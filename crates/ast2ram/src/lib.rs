//! Datalog to RAM translation
//!
//! Takes a validated [`datalog_ast::Program`] and produces a
//! [`ram::Program`]. The [`TranslationStrategy`] picks between plain
//! semi-naive evaluation and the provenance variant, which records a rule
//! number and derivation level with every tuple and emits the metadata and
//! subroutines an explanation engine queries.
//!
//! # Example
//!
//! ```
//! use ast2ram::{compile_program, TranslationStrategy};
//! use datalog_ast::{Argument, Atom, Clause, Literal, Program, Relation};
//!
//! let mut program = Program::new();
//! program.add_relation(Relation::new("edge").with_attribute("a", "number"));
//! program.add_relation(Relation::new("node").with_attribute("a", "number"));
//! program.add_clause(Clause::new(
//!     Atom::new("node", vec![Argument::var("x")]),
//!     vec![Literal::Atom(Atom::new("edge", vec![Argument::var("x")]))],
//! ));
//!
//! let compiled = compile_program(&program, TranslationStrategy::Provenance).unwrap();
//! assert!(compiled.subroutine("node_1_subproof").is_some());
//! ```

pub mod builder;
pub mod clause_translator;
pub mod constraint_translator;
pub mod context;
pub mod error;
pub mod existence_check;
pub mod info_facts;
pub mod provenance;
pub mod seminaive;
pub mod strategy;
pub mod subproof;
pub mod value_index;
pub mod value_translator;
pub mod variable_binder;

pub use builder::ProgramBuilder;
pub use clause_translator::TranslationMode;
pub use context::TranslatorContext;
pub use error::{TranslationError, TranslationResult};
pub use info_facts::{describe_clause, info_relation_name, InfoFact};
pub use strategy::{TranslationStrategy, LEVEL_NUMBER_ATTRIBUTE, RULE_NUMBER_ATTRIBUTE};
pub use variable_binder::{SlotMap, SlotMapBuilder};

use datalog_ast::Program;

/// Translate `program` with `strategy`, emitting debug info
pub fn compile_program(
    program: &Program,
    strategy: TranslationStrategy,
) -> TranslationResult<ram::Program> {
    let ctx = TranslatorContext::new(program, strategy)?;
    translate_unit(&ctx)
}

/// Translate the program held by `ctx`. Nothing is produced on error.
pub fn translate_unit(ctx: &TranslatorContext<'_>) -> TranslationResult<ram::Program> {
    let mut out = ProgramBuilder::new();
    let main = match ctx.strategy() {
        TranslationStrategy::Seminaive => {
            seminaive::UnitTranslator::new(ctx, &mut out).generate_program()?
        }
        TranslationStrategy::Provenance => {
            provenance::UnitTranslator::new(ctx, &mut out).generate_program()?
        }
    };
    Ok(out.finish(main))
}
