//! Translator context
//!
//! Bundles the input program, the chosen strategy and the analyses the
//! translators consult. Built once per compilation; read-only afterwards.

use crate::builder::ProgramBuilder;
use crate::clause_translator::TranslationMode;
use crate::error::{TranslationError, TranslationResult};
use crate::strategy::TranslationStrategy;
use crate::value_index::ValueIndex;
use datalog_analysis::{RecursiveClauses, RelationSchedule, SccGraph, TypeEnvironment};
use datalog_ast::{Argument, Clause, ClauseId, Literal, Program, QualifiedName, Relation};
use ram::{CondId, ExprId, StmtId};
use std::collections::HashMap;
use tracing::info;

pub struct TranslatorContext<'p> {
    program: &'p Program,
    strategy: TranslationStrategy,
    emit_debug_info: bool,
    types: TypeEnvironment,
    recursive_clauses: RecursiveClauses,
    sccs: SccGraph,
    schedule: RelationSchedule,
    clause_nums: HashMap<ClauseId, usize>,
}

impl<'p> TranslatorContext<'p> {
    pub fn new(program: &'p Program, strategy: TranslationStrategy) -> TranslationResult<Self> {
        info!(strategy = strategy.name(), "selected translation strategy");

        let types = TypeEnvironment::new(&program.types)?;
        let recursive_clauses = RecursiveClauses::run(program);
        let sccs = SccGraph::new(program);
        let schedule = RelationSchedule::new(program, &sccs);

        // Non-fact clauses are numbered from 1 per relation; facts get 0
        let mut clause_nums = HashMap::new();
        for relation in &program.relations {
            let mut count = 1;
            for (id, clause) in program.clauses_of(&relation.name) {
                if clause.is_fact() {
                    clause_nums.insert(id, 0);
                } else {
                    clause_nums.insert(id, count);
                    count += 1;
                }
            }
        }

        Ok(TranslatorContext {
            program,
            strategy,
            emit_debug_info: true,
            types,
            recursive_clauses,
            sccs,
            schedule,
            clause_nums,
        })
    }

    /// Wrap clause queries in `DebugInfo` statements carrying the clause text
    pub fn with_debug_info(mut self, emit: bool) -> Self {
        self.emit_debug_info = emit;
        self
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn strategy(&self) -> TranslationStrategy {
        self.strategy
    }

    pub fn emit_debug_info(&self) -> bool {
        self.emit_debug_info
    }

    pub fn auxiliary_arity(&self) -> usize {
        self.strategy.auxiliary_arity()
    }

    pub fn clause(&self, id: ClauseId) -> &'p Clause {
        self.program.clause(id)
    }

    pub fn is_recursive_clause(&self, id: ClauseId) -> bool {
        self.recursive_clauses.is_recursive(id)
    }

    /// Sequence number of a clause within its relation
    pub fn clause_num(&self, id: ClauseId) -> TranslationResult<usize> {
        self.clause_nums
            .get(&id)
            .copied()
            .ok_or_else(|| TranslationError::UnnumberedClause(self.clause(id).to_string()))
    }

    pub fn relation(&self, name: &QualifiedName) -> TranslationResult<&'p Relation> {
        self.program
            .relation(name)
            .ok_or_else(|| TranslationError::UndeclaredRelation(name.to_string()))
    }

    pub fn attribute_type_qualifier(&self, type_name: &QualifiedName) -> TranslationResult<String> {
        Ok(self.types.type_qualifier(type_name)?)
    }

    pub fn number_of_sccs(&self) -> usize {
        self.sccs.number_of_sccs()
    }

    pub fn relations_in_scc(&self, scc: usize) -> &[QualifiedName] {
        self.sccs.relations_in_scc(scc)
    }

    pub fn is_recursive_scc(&self, scc: usize) -> bool {
        self.sccs.is_recursive(scc)
    }

    pub fn scc_of(&self, relation: &QualifiedName) -> Option<usize> {
        self.sccs.scc_of(relation)
    }

    /// Relations the schedule allows to be disposed after `scc`
    pub fn expired_relations(&self, scc: usize) -> &[QualifiedName] {
        self.schedule.expired(scc)
    }

    // Strategy surface

    pub fn translate_value(
        &self,
        out: &mut ProgramBuilder,
        index: &ValueIndex,
        arg: &Argument,
    ) -> TranslationResult<ExprId> {
        self.strategy.translate_value(out, index, arg)
    }

    pub fn translate_constraint(
        &self,
        out: &mut ProgramBuilder,
        index: &ValueIndex,
        literal: &Literal,
    ) -> TranslationResult<Option<CondId>> {
        self.strategy.translate_constraint(self, out, index, literal)
    }

    pub fn translate_non_recursive_clause(
        &self,
        out: &mut ProgramBuilder,
        clause: ClauseId,
        mode: TranslationMode<'_>,
    ) -> TranslationResult<StmtId> {
        self.strategy
            .translate_non_recursive_clause(self, out, clause, mode)
    }

    pub fn translate_recursive_clause(
        &self,
        out: &mut ProgramBuilder,
        clause: ClauseId,
        scc: &[QualifiedName],
        version: usize,
        mode: TranslationMode<'_>,
    ) -> TranslationResult<StmtId> {
        self.strategy
            .translate_recursive_clause(self, out, clause, scc, version, mode)
    }
}
