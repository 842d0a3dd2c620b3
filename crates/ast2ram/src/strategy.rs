//! Translation strategies
//!
//! The strategy is chosen once per compilation and consulted by every
//! translator. Both strategies share the orchestration in
//! [`seminaive`](crate::seminaive); they differ in the relation layout, the
//! shape of clause projections, and whether expired relations are cleared.

use crate::builder::{concrete_relation_name, ProgramBuilder};
use crate::clause_translator::{ClauseTranslator, TranslationMode};
use crate::constraint_translator;
use crate::context::TranslatorContext;
use crate::error::TranslationResult;
use crate::value_index::ValueIndex;
use crate::value_translator;
use datalog_ast::{Argument, ClauseId, Literal, QualifiedName, RelationRepresentation};
use ram::{CondId, ExprId, Representation, Statement, StmtId};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Name of the rule-number bookkeeping column
pub const RULE_NUMBER_ATTRIBUTE: &str = "@rule_number";
/// Name of the derivation-level bookkeeping column
pub const LEVEL_NUMBER_ATTRIBUTE: &str = "@level_number";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStrategy {
    /// Plain semi-naive evaluation
    #[default]
    Seminaive,
    /// Semi-naive evaluation with rule and level columns, clause metadata
    /// and subproof subroutines
    Provenance,
}

impl TranslationStrategy {
    pub fn name(self) -> &'static str {
        match self {
            TranslationStrategy::Seminaive => "seminaive",
            TranslationStrategy::Provenance => "provenance",
        }
    }

    /// Number of bookkeeping columns appended to every relation
    pub fn auxiliary_arity(self) -> usize {
        match self {
            TranslationStrategy::Seminaive => 0,
            TranslationStrategy::Provenance => 2,
        }
    }

    /// Value translation is identical under both strategies.
    pub fn translate_value(
        self,
        out: &mut ProgramBuilder,
        index: &ValueIndex,
        arg: &Argument,
    ) -> TranslationResult<ExprId> {
        value_translator::translate_value(out, index, arg)
    }

    /// Condition for a negation or constraint literal; `None` for atoms
    pub fn translate_constraint(
        self,
        ctx: &TranslatorContext<'_>,
        out: &mut ProgramBuilder,
        index: &ValueIndex,
        literal: &Literal,
    ) -> TranslationResult<Option<CondId>> {
        constraint_translator::translate_constraint(ctx, out, index, literal, self.auxiliary_arity())
    }

    pub fn translate_non_recursive_clause(
        self,
        ctx: &TranslatorContext<'_>,
        out: &mut ProgramBuilder,
        clause: ClauseId,
        mode: TranslationMode<'_>,
    ) -> TranslationResult<StmtId> {
        ClauseTranslator::new(ctx, out, mode).translate_non_recursive_clause(clause)
    }

    /// Translate one version of a recursive clause: the `version`-th body
    /// atom from `scc` reads the delta relation
    pub fn translate_recursive_clause(
        self,
        ctx: &TranslatorContext<'_>,
        out: &mut ProgramBuilder,
        clause: ClauseId,
        scc: &[QualifiedName],
        version: usize,
        mode: TranslationMode<'_>,
    ) -> TranslationResult<StmtId> {
        ClauseTranslator::new(ctx, out, mode).translate_recursive_clause(clause, scc, version)
    }

    /// RAM declaration of `relation` stored under `name`
    pub fn create_relation(
        self,
        ctx: &TranslatorContext<'_>,
        relation: &datalog_ast::Relation,
        name: String,
    ) -> TranslationResult<ram::Relation> {
        let mut attribute_names = Vec::with_capacity(relation.arity() + self.auxiliary_arity());
        let mut attribute_types = Vec::with_capacity(relation.arity() + self.auxiliary_arity());
        for attribute in &relation.attributes {
            attribute_names.push(attribute.name.to_string());
            attribute_types.push(ctx.attribute_type_qualifier(&attribute.type_name)?);
        }

        if self == TranslationStrategy::Provenance {
            attribute_names.push(RULE_NUMBER_ATTRIBUTE.to_string());
            attribute_types.push("i:number".to_string());
            attribute_names.push(LEVEL_NUMBER_ATTRIBUTE.to_string());
            attribute_types.push("i:number".to_string());
        }

        Ok(ram::Relation {
            name,
            arity: attribute_names.len(),
            auxiliary_arity: self.auxiliary_arity(),
            attribute_names,
            attribute_types,
            representation: representation(relation.representation),
        })
    }

    /// Statement run after an SCC to dispose of relations nothing reads any
    /// more. Provenance keeps everything so explanations can still read it.
    pub fn clear_expired_relations(
        self,
        out: &mut ProgramBuilder,
        expired: &[QualifiedName],
    ) -> StmtId {
        match self {
            TranslationStrategy::Seminaive => {
                let clears = expired
                    .iter()
                    .map(|name| {
                        trace!(relation = %name, "clearing expired relation");
                        out.arena.stmt(Statement::Clear(concrete_relation_name(name)))
                    })
                    .collect();
                out.arena.sequence(clears)
            }
            TranslationStrategy::Provenance => out.arena.sequence(Vec::new()),
        }
    }
}

fn representation(repr: RelationRepresentation) -> Representation {
    match repr {
        RelationRepresentation::Default => Representation::Default,
        RelationRepresentation::Btree => Representation::Btree,
        RelationRepresentation::Brie => Representation::Brie,
        RelationRepresentation::Eqrel => Representation::Eqrel,
        RelationRepresentation::Info => Representation::Info,
    }
}
