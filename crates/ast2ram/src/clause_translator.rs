//! Clause translation
//!
//! A clause becomes one query: a nest of scans (one per body atom, tuple id =
//! position among the body atoms), the equality filters binding repeated
//! variables and constants, one aggregate per aggregator, the negation and
//! constraint filters, and finally the projection into the head relation.
//!
//! ```text
//! path(x,z) :- edge(x,y), path(y,z).
//!
//! FOR t0 IN edge
//!  FOR t1 IN @delta_path
//!   IF (t1.0 = t0.1)
//!    IF (NOT (t0.0,t1.1) IN path)
//!     INSERT (t0.0, t1.1) INTO @new_path
//! ```
//!
//! In [`TranslationMode::Subproof`] the projection is replaced by a return of
//! the body tuples, guarded by the head variables matching the subroutine
//! arguments and, under provenance, by every body level being below the
//! requested one.

use crate::builder::{concrete_relation_name, delta_relation_name, new_relation_name, ProgramBuilder};
use crate::context::TranslatorContext;
use crate::error::{TranslationError, TranslationResult};
use crate::existence_check::existence_check;
use crate::value_index::{Location, ValueIndex};
use crate::variable_binder::SlotMap;
use datalog_ast::{
    AggregateOp, Aggregator, Argument, Atom, BinaryConstraintOp, Clause, ClauseId, Constraint,
    Literal, QualifiedName,
};
use ram::{
    AggregateFunction, CondId, Condition, ConstraintOp, Expression, ExprId, IntrinsicOp, OpId,
    Operation, Statement, StmtId,
};
use tracing::trace;

/// What the innermost operation of a clause query does
#[derive(Debug, Clone, Copy)]
pub enum TranslationMode<'s> {
    /// Insert the head tuple
    Default,
    /// Return the body tuples justifying the head bound by `SlotMap`
    Subproof(&'s SlotMap),
}

pub struct ClauseTranslator<'a, 'p> {
    ctx: &'a TranslatorContext<'p>,
    out: &'a mut ProgramBuilder,
    mode: TranslationMode<'a>,
    index: ValueIndex,
    atoms: Vec<&'p Atom>,
    generators: Vec<&'p Aggregator>,
}

/// The recursive version being translated
struct Version {
    /// Position among the body atoms of the atom reading the delta relation
    delta_atom: Option<usize>,
}

impl<'a, 'p> ClauseTranslator<'a, 'p> {
    pub fn new(
        ctx: &'a TranslatorContext<'p>,
        out: &'a mut ProgramBuilder,
        mode: TranslationMode<'a>,
    ) -> Self {
        ClauseTranslator {
            ctx,
            out,
            mode,
            index: ValueIndex::new(),
            atoms: Vec::new(),
            generators: Vec::new(),
        }
    }

    pub fn translate_non_recursive_clause(mut self, id: ClauseId) -> TranslationResult<StmtId> {
        let clause = self.ctx.clause(id);
        trace!(clause = %clause, "translating non-recursive clause");
        self.translate_clause(id, clause, None)
    }

    pub fn translate_recursive_clause(
        mut self,
        id: ClauseId,
        scc: &[QualifiedName],
        version: usize,
    ) -> TranslationResult<StmtId> {
        let clause = self.ctx.clause(id);
        trace!(clause = %clause, version, "translating recursive clause");
        let delta_atom = clause
            .body_atoms()
            .enumerate()
            .filter(|(_, atom)| scc.contains(&atom.name))
            .map(|(i, _)| i)
            .nth(version);
        self.translate_clause(id, clause, Some(Version { delta_atom }))
    }

    fn translate_clause(
        &mut self,
        id: ClauseId,
        clause: &'p Clause,
        version: Option<Version>,
    ) -> TranslationResult<StmtId> {
        self.ctx.relation(&clause.head.name)?;
        if clause.is_fact() {
            return self.translate_fact(id, clause);
        }

        self.index_clause(clause)?;

        let mut op = match self.mode {
            TranslationMode::Default => self.create_insertion(id, clause, version.is_some())?,
            TranslationMode::Subproof(slots) => self.create_subproof_return(clause, slots)?,
        };
        op = self.add_body_literal_constraints(clause, op)?;
        op = self.add_generator_levels(op)?;
        op = self.add_scans(op, version.as_ref())?;

        let query = self.out.arena.query(op);
        Ok(self.wrap_debug_info(clause, query))
    }

    fn translate_fact(&mut self, id: ClauseId, clause: &'p Clause) -> TranslationResult<StmtId> {
        let head = &clause.head;
        let mut values = self.translate_args(&head.args)?;
        if self.ctx.auxiliary_arity() > 0 {
            let rule = self.ctx.clause_num(id)? as i64;
            values.push(self.out.arena.signed(rule));
            values.push(self.out.arena.signed(0));
        }
        let project = self.project_with_guard(head, values, false)?;
        let query = self.out.arena.query(project);
        Ok(self.wrap_debug_info(clause, query))
    }

    /// Record variable and aggregate locations
    fn index_clause(&mut self, clause: &'p Clause) -> TranslationResult<()> {
        for (tuple, atom) in clause.body_atoms().enumerate() {
            self.ctx.relation(&atom.name)?;
            for (element, arg) in atom.args.iter().enumerate() {
                if let Argument::Variable(var) = arg {
                    self.index
                        .add_var_reference(*var, Location::new(tuple, element));
                }
            }
            self.atoms.push(atom);
        }

        let mut generators = Vec::new();
        for arg in &clause.head.args {
            collect_aggregators(arg, &mut generators);
        }
        for literal in &clause.body {
            match literal {
                Literal::Atom(atom) | Literal::Negation(atom) => {
                    for arg in &atom.args {
                        collect_aggregators(arg, &mut generators);
                    }
                }
                Literal::Constraint(Constraint::Binary { lhs, rhs, .. }) => {
                    collect_aggregators(lhs, &mut generators);
                    collect_aggregators(rhs, &mut generators);
                }
                Literal::Constraint(Constraint::Boolean(_)) => {}
            }
        }
        for (k, aggregator) in generators.iter().enumerate() {
            let loc = Location::new(self.atoms.len() + k, 0);
            self.index.set_generator_location(aggregator, loc);
        }
        self.generators = generators;

        // `x = <aggregate>` binds x to the aggregate result
        for constraint in clause.body_constraints() {
            if let Constraint::Binary {
                op: BinaryConstraintOp::Eq,
                lhs,
                rhs,
            } = constraint
            {
                let bound = match (lhs, rhs) {
                    (Argument::Variable(var), Argument::Aggregator(agg))
                    | (Argument::Aggregator(agg), Argument::Variable(var)) => Some((*var, agg)),
                    _ => None,
                };
                if let Some((var, agg)) = bound {
                    if !self.index.is_defined(var) {
                        if let Some(loc) = self.index.generator_location(agg) {
                            self.index.add_var_reference(var, loc);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn create_insertion(
        &mut self,
        id: ClauseId,
        clause: &'p Clause,
        recursive: bool,
    ) -> TranslationResult<OpId> {
        let head = &clause.head;
        let mut values = self.translate_args(&head.args)?;
        if self.ctx.auxiliary_arity() > 0 {
            let rule = self.ctx.clause_num(id)? as i64;
            values.push(self.out.arena.signed(rule));
            let level = self.level_number();
            values.push(level);
        }
        self.project_with_guard(head, values, recursive)
    }

    /// Project `values` into the head relation (or its new version), guarded
    /// so a tuple is only derived once
    fn project_with_guard(
        &mut self,
        head: &Atom,
        values: Vec<ExprId>,
        recursive: bool,
    ) -> TranslationResult<OpId> {
        let relation = concrete_relation_name(&head.name);
        let aux = self.ctx.auxiliary_arity();
        let logical = &values[..values.len() - aux];

        let guard = if aux > 0 || recursive {
            let copies = self.out.arena.clone_exprs(logical);
            let check = existence_check(&mut self.out.arena, &relation, copies, aux);
            Some(self.out.arena.negation(check))
        } else if head.arity() == 0 {
            Some(self.out.arena.cond(Condition::EmptinessCheck {
                relation: relation.clone(),
            }))
        } else {
            None
        };

        let target = if recursive {
            new_relation_name(&head.name)
        } else {
            relation
        };
        let project = self.out.arena.op(Operation::Project {
            relation: target,
            values,
        });
        Ok(match guard {
            Some(cond) => self.out.arena.filter(cond, project),
            None => project,
        })
    }

    /// `max(body levels) + 1`, or 0 without body atoms
    fn level_number(&mut self) -> ExprId {
        let arities: Vec<usize> = self.atoms.iter().map(|atom| atom.arity()).collect();
        let mut levels = Vec::with_capacity(arities.len());
        for (tuple, arity) in arities.into_iter().enumerate() {
            levels.push(self.out.arena.expr(Expression::TupleElement {
                tuple,
                element: arity + 1,
            }));
        }
        let max = match levels.len() {
            0 => return self.out.arena.signed(0),
            1 => levels[0],
            _ => self.out.arena.expr(Expression::IntrinsicOperator {
                op: IntrinsicOp::Max,
                args: levels,
            }),
        };
        let one = self.out.arena.signed(1);
        self.out.arena.expr(Expression::IntrinsicOperator {
            op: IntrinsicOp::Add,
            args: vec![max, one],
        })
    }

    fn create_subproof_return(
        &mut self,
        clause: &'p Clause,
        slots: &SlotMap,
    ) -> TranslationResult<OpId> {
        let mut values = Vec::new();
        for (tuple, atom) in self.atoms.iter().enumerate() {
            let columns = atom.arity() + if self.ctx.auxiliary_arity() > 0 { 2 } else { 0 };
            for element in (0..atom.arity()).chain(atom.arity() + 1..columns) {
                values.push(self.out.arena.expr(Expression::TupleElement { tuple, element }));
            }
        }
        for atom in clause.body_negations() {
            values.extend(self.translate_args(&atom.args)?);
        }
        let ret = self.out.arena.op(Operation::SubroutineReturn { values });

        let mut conds = Vec::new();
        let slot_index = slots.value_index();
        for arg in &clause.head.args {
            let rhs = match arg {
                Argument::Variable(var) => {
                    let slot = slots
                        .slot(*var)
                        .ok_or_else(|| TranslationError::MissingSlot(var.to_string()))?;
                    self.out.arena.expr(Expression::SubroutineArgument(slot))
                }
                Argument::UnnamedVariable | Argument::Constant(_) => continue,
                _ if mentions_aggregator(arg) => continue,
                // functor and record heads compare against the same value
                // computed from the arguments
                _ => {
                    let rhs = self.ctx.translate_value(self.out, &slot_index, arg)?;
                    slots.rewrite_expr(&mut self.out.arena, rhs)?;
                    rhs
                }
            };
            let lhs = self.translate_value(arg)?;
            conds.push(self.eq(lhs, rhs));
        }
        if self.ctx.auxiliary_arity() > 0 {
            for (tuple, atom) in self.atoms.iter().enumerate() {
                let lhs = self.out.arena.expr(Expression::TupleElement {
                    tuple,
                    element: atom.arity() + 1,
                });
                let rhs = self
                    .out
                    .arena
                    .expr(Expression::SubroutineArgument(slots.len()));
                conds.push(self.out.arena.cond(Condition::Constraint {
                    op: ConstraintOp::Lt,
                    lhs,
                    rhs,
                }));
            }
        }
        if conds.is_empty() {
            return Ok(ret);
        }
        let cond = self.out.arena.conjunction(conds);
        Ok(self.out.arena.filter(cond, ret))
    }

    /// Filters for negations and constraints, in body order
    fn add_body_literal_constraints(
        &mut self,
        clause: &'p Clause,
        mut op: OpId,
    ) -> TranslationResult<OpId> {
        for literal in clause.body.iter().rev() {
            if let Some(cond) = self.ctx.translate_constraint(self.out, &self.index, literal)? {
                op = self.out.arena.filter(cond, op);
            }
        }
        Ok(op)
    }

    /// One aggregate operation per generator, innermost last
    fn add_generator_levels(&mut self, mut op: OpId) -> TranslationResult<OpId> {
        let generators = self.generators.clone();
        for (k, aggregator) in generators.into_iter().enumerate().rev() {
            let tuple = self.atoms.len() + k;
            op = self.create_aggregate(aggregator, tuple, op)?;
        }
        Ok(op)
    }

    fn create_aggregate(
        &mut self,
        aggregator: &Aggregator,
        tuple: usize,
        nested: OpId,
    ) -> TranslationResult<OpId> {
        let mut atoms = aggregator.body.iter().filter_map(|lit| match lit {
            Literal::Atom(atom) => Some(atom),
            _ => None,
        });
        let (Some(atom), None) = (atoms.next(), atoms.next()) else {
            return Err(TranslationError::UnsupportedAggregate(
                Argument::Aggregator(Box::new(aggregator.clone())).to_string(),
            ));
        };
        self.ctx.relation(&atom.name)?;

        // Variables local to the aggregate body live in the scanned tuple
        let mut local = self.index.clone();
        let mut conds = Vec::new();
        for (element, arg) in atom.args.iter().enumerate() {
            match arg {
                Argument::UnnamedVariable => {}
                Argument::Variable(var) if !local.is_defined(*var) => {
                    local.add_var_reference(*var, Location::new(tuple, element));
                }
                _ => {
                    let lhs = self.out.arena.expr(Expression::TupleElement { tuple, element });
                    let rhs = self.ctx.translate_value(self.out, &local, arg)?;
                    conds.push(self.eq(lhs, rhs));
                }
            }
        }
        for literal in &aggregator.body {
            if let Some(cond) = self.ctx.translate_constraint(self.out, &local, literal)? {
                conds.push(cond);
            }
        }
        let expression = match &aggregator.target {
            Some(target) => Some(self.ctx.translate_value(self.out, &local, target)?),
            None => None,
        };
        let condition = self.out.arena.conjunction(conds);

        Ok(self.out.arena.op(Operation::Aggregate {
            relation: concrete_relation_name(&atom.name),
            tuple,
            function: aggregate_function(aggregator.op),
            expression,
            condition,
            nested,
        }))
    }

    /// Scans for the body atoms, with the filters binding each atom's
    /// arguments placed directly inside its scan
    fn add_scans(&mut self, mut op: OpId, version: Option<&Version>) -> TranslationResult<OpId> {
        for tuple in (0..self.atoms.len()).rev() {
            let atom = self.atoms[tuple];
            let mut conds = Vec::new();
            for (element, arg) in atom.args.iter().enumerate() {
                let here = Location::new(tuple, element);
                let bound = match arg {
                    Argument::UnnamedVariable => continue,
                    Argument::Variable(var) => match self.index.definition_point(*var) {
                        Some(def) if def == here => continue,
                        _ => self.translate_value(arg)?,
                    },
                    _ => self.translate_value(arg)?,
                };
                let lhs = self.out.arena.expr(Expression::TupleElement { tuple, element });
                conds.push(self.eq(lhs, bound));
            }
            if !conds.is_empty() {
                let cond = self.out.arena.conjunction(conds);
                op = self.out.arena.filter(cond, op);
            }

            let relation = match version {
                Some(v) if v.delta_atom == Some(tuple) => delta_relation_name(&atom.name),
                _ => concrete_relation_name(&atom.name),
            };
            op = self.out.arena.op(Operation::Scan {
                relation,
                tuple,
                nested: op,
            });
        }
        Ok(op)
    }

    fn wrap_debug_info(&mut self, clause: &Clause, query: StmtId) -> StmtId {
        match self.mode {
            TranslationMode::Default if self.ctx.emit_debug_info() => {
                self.out.arena.stmt(Statement::DebugInfo {
                    message: clause.to_string(),
                    statement: query,
                })
            }
            _ => query,
        }
    }

    fn translate_value(&mut self, arg: &Argument) -> TranslationResult<ExprId> {
        self.ctx.translate_value(self.out, &self.index, arg)
    }

    fn translate_args(&mut self, args: &[Argument]) -> TranslationResult<Vec<ExprId>> {
        args.iter().map(|arg| self.translate_value(arg)).collect()
    }

    fn eq(&mut self, lhs: ExprId, rhs: ExprId) -> CondId {
        self.out.arena.cond(Condition::Constraint {
            op: ConstraintOp::Eq,
            lhs,
            rhs,
        })
    }
}

/// Aggregators reachable from `arg` without entering another aggregate
fn collect_aggregators<'p>(arg: &'p Argument, out: &mut Vec<&'p Aggregator>) {
    match arg {
        Argument::Aggregator(agg) => {
            let agg: &'p Aggregator = agg;
            if !out.contains(&agg) {
                out.push(agg);
            }
        }
        Argument::IntrinsicFunctor { args, .. }
        | Argument::UserDefinedFunctor { args, .. }
        | Argument::RecordInit(args) => {
            for arg in args {
                collect_aggregators(arg, out);
            }
        }
        Argument::Variable(_)
        | Argument::UnnamedVariable
        | Argument::Constant(_)
        | Argument::Counter => {}
    }
}

fn mentions_aggregator(arg: &Argument) -> bool {
    let mut found = Vec::new();
    collect_aggregators(arg, &mut found);
    !found.is_empty()
}

fn aggregate_function(op: AggregateOp) -> AggregateFunction {
    match op {
        AggregateOp::Count => AggregateFunction::Count,
        AggregateOp::Sum => AggregateFunction::Sum,
        AggregateOp::Min => AggregateFunction::Min,
        AggregateOp::Max => AggregateFunction::Max,
        AggregateOp::Mean => AggregateFunction::Mean,
    }
}
