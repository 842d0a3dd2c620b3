//! Program translation by semi-naive evaluation
//!
//! Relations are evaluated one SCC at a time in topological order. A
//! recursive SCC is seeded by its non-recursive clauses and then iterated:
//!
//! ```text
//! MERGE EXTEND @delta_path WITH path
//! LOOP
//!  <each recursive clause version, reading @delta_, inserting into @new_>
//!  EXIT ISEMPTY(@new_path)
//!  MERGE EXTEND path WITH @new_path
//!  SWAP (@delta_path, @new_path)
//!  CLEAR @new_path
//! END LOOP
//! CLEAR @delta_path
//! CLEAR @new_path
//! ```

use crate::builder::{concrete_relation_name, delta_relation_name, new_relation_name, ProgramBuilder};
use crate::clause_translator::TranslationMode;
use crate::context::TranslatorContext;
use crate::error::TranslationResult;
use datalog_ast::{ClauseId, QualifiedName};
use ram::{Condition, Statement, StmtId};
use tracing::debug;

pub struct UnitTranslator<'a, 'p> {
    ctx: &'a TranslatorContext<'p>,
    out: &'a mut ProgramBuilder,
}

impl<'a, 'p> UnitTranslator<'a, 'p> {
    pub fn new(ctx: &'a TranslatorContext<'p>, out: &'a mut ProgramBuilder) -> Self {
        UnitTranslator { ctx, out }
    }

    /// Declare all relations and build the main statement
    pub fn generate_program(&mut self) -> TranslationResult<StmtId> {
        self.declare_relations()?;

        let ctx = self.ctx;
        let mut strata = Vec::with_capacity(ctx.number_of_sccs());
        for scc in 0..ctx.number_of_sccs() {
            let stratum = self.generate_stratum(scc)?;
            let clear = ctx
                .strategy()
                .clear_expired_relations(self.out, ctx.expired_relations(scc));
            strata.push(self.out.arena.sequence(vec![stratum, clear]));
        }
        Ok(self.out.arena.sequence(strata))
    }

    fn declare_relations(&mut self) -> TranslationResult<()> {
        let strategy = self.ctx.strategy();
        for relation in &self.ctx.program().relations {
            let name = concrete_relation_name(&relation.name);
            self.out
                .declare(strategy.create_relation(self.ctx, relation, name)?);

            let recursive = self
                .ctx
                .scc_of(&relation.name)
                .is_some_and(|scc| self.ctx.is_recursive_scc(scc));
            if recursive {
                for name in [
                    delta_relation_name(&relation.name),
                    new_relation_name(&relation.name),
                ] {
                    self.out
                        .declare(strategy.create_relation(self.ctx, relation, name)?);
                }
            }
        }
        Ok(())
    }

    fn generate_stratum(&mut self, scc: usize) -> TranslationResult<StmtId> {
        let ctx = self.ctx;
        let relations = ctx.relations_in_scc(scc);
        let recursive = ctx.is_recursive_scc(scc);
        debug!(scc, relations = relations.len(), recursive, "translating stratum");

        let mut stmts = Vec::new();
        for relation in relations {
            for id in self.clauses_of(relation, false) {
                stmts.push(ctx.translate_non_recursive_clause(
                    self.out,
                    id,
                    TranslationMode::Default,
                )?);
            }
        }
        if !recursive {
            return Ok(self.out.arena.sequence(stmts));
        }

        for relation in relations {
            stmts.push(self.out.arena.stmt(Statement::MergeExtend {
                source: concrete_relation_name(relation),
                target: delta_relation_name(relation),
            }));
        }
        stmts.push(self.generate_loop(relations)?);
        for relation in relations {
            stmts.push(self.out.arena.stmt(Statement::Clear(delta_relation_name(relation))));
            stmts.push(self.out.arena.stmt(Statement::Clear(new_relation_name(relation))));
        }
        Ok(self.out.arena.sequence(stmts))
    }

    fn generate_loop(&mut self, scc: &[QualifiedName]) -> TranslationResult<StmtId> {
        let mut body = Vec::new();
        for relation in scc {
            for id in self.clauses_of(relation, true) {
                let versions = self
                    .ctx
                    .clause(id)
                    .body_atoms()
                    .filter(|atom| scc.contains(&atom.name))
                    .count();
                for version in 0..versions {
                    body.push(self.ctx.translate_recursive_clause(
                        self.out,
                        id,
                        scc,
                        version,
                        TranslationMode::Default,
                    )?);
                }
            }
        }

        let empty = scc
            .iter()
            .map(|relation| {
                self.out.arena.cond(Condition::EmptinessCheck {
                    relation: new_relation_name(relation),
                })
            })
            .collect();
        let exit = self.out.arena.conjunction(empty);
        body.push(self.out.arena.stmt(Statement::Exit(exit)));

        for relation in scc {
            body.push(self.out.arena.stmt(Statement::MergeExtend {
                source: new_relation_name(relation),
                target: concrete_relation_name(relation),
            }));
            body.push(self.out.arena.stmt(Statement::Swap(
                delta_relation_name(relation),
                new_relation_name(relation),
            )));
            body.push(self.out.arena.stmt(Statement::Clear(new_relation_name(relation))));
        }

        let body = self.out.arena.sequence(body);
        Ok(self.out.arena.stmt(Statement::Loop(body)))
    }

    /// Clauses of `relation` that are (or are not) recursive
    fn clauses_of(&self, relation: &QualifiedName, recursive: bool) -> Vec<ClauseId> {
        self.ctx
            .program()
            .clauses_of(relation)
            .filter(|(id, _)| self.ctx.is_recursive_clause(*id) == recursive)
            .map(|(id, _)| id)
            .collect()
    }
}
