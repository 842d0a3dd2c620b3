//! Provenance instrumentation
//!
//! Runs the semi-naive translation under the provenance strategy, then adds
//! what explanations need on top of the evaluated relations: one info
//! relation per rule, and the positive and negation subproof subroutines of
//! every rule (`path_1_subproof`, `path_1_negation_subproof`).

use crate::builder::ProgramBuilder;
use crate::context::TranslatorContext;
use crate::error::TranslationResult;
use crate::info_facts::{generate_info_clause, is_info_relation};
use crate::seminaive;
use crate::subproof;
use ram::StmtId;
use tracing::debug;

pub struct UnitTranslator<'a, 'p> {
    ctx: &'a TranslatorContext<'p>,
    out: &'a mut ProgramBuilder,
}

impl<'a, 'p> UnitTranslator<'a, 'p> {
    pub fn new(ctx: &'a TranslatorContext<'p>, out: &'a mut ProgramBuilder) -> Self {
        UnitTranslator { ctx, out }
    }

    pub fn generate_program(&mut self) -> TranslationResult<StmtId> {
        let evaluation = seminaive::UnitTranslator::new(self.ctx, self.out).generate_program()?;
        let info = self.generate_info_clauses()?;
        self.add_clause_subroutines()?;
        Ok(self.out.arena.sequence(vec![evaluation, info]))
    }

    /// Info relations and facts for every rule, relation by relation
    fn generate_info_clauses(&mut self) -> TranslationResult<StmtId> {
        let program = self.ctx.program();
        let mut facts = Vec::new();
        for relation in &program.relations {
            for (id, clause) in program.clauses_of(&relation.name) {
                if clause.is_fact() {
                    continue;
                }
                facts.push(generate_info_clause(self.ctx, self.out, id)?);
            }
        }
        debug!(facts = facts.len(), "generated info facts");
        Ok(self.out.arena.sequence(facts))
    }

    fn add_clause_subroutines(&mut self) -> TranslationResult<()> {
        let program = self.ctx.program();
        for (id, clause) in program.clauses_with_ids() {
            if clause.is_fact() || is_info_relation(&clause.head.name) {
                continue;
            }
            let label = format!("{}_{}", clause.head.name, self.ctx.clause_num(id)?);
            debug!(subroutine = %label, "adding subproof subroutines");

            let pair = subproof::synthesize(self.ctx, self.out, id)?;
            self.out
                .add_subroutine(format!("{}_subproof", label), pair.positive);
            self.out
                .add_subroutine(format!("{}_negation_subproof", label), pair.negation);
        }
        Ok(())
    }
}
