//! Node arena
//!
//! Every IR node lives in exactly one slot of the arena and has exactly one
//! parent. Sharing a subtree between two parents is done with the `clone_*`
//! methods, which insert a fresh copy of the whole subtree; ids are never
//! duplicated across owners.

use crate::ir::{CondId, Condition, ExprId, Expression, OpId, Operation, StmtId, Statement};
use serde::Serialize;
use std::ops::Index;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Arena {
    exprs: Vec<Expression>,
    conds: Vec<Condition>,
    ops: Vec<Operation>,
    stmts: Vec<Statement>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expr(&mut self, expr: Expression) -> ExprId {
        self.exprs.push(expr);
        ExprId(self.exprs.len() as u32 - 1)
    }

    pub fn cond(&mut self, cond: Condition) -> CondId {
        self.conds.push(cond);
        CondId(self.conds.len() as u32 - 1)
    }

    pub fn op(&mut self, op: Operation) -> OpId {
        self.ops.push(op);
        OpId(self.ops.len() as u32 - 1)
    }

    pub fn stmt(&mut self, stmt: Statement) -> StmtId {
        self.stmts.push(stmt);
        StmtId(self.stmts.len() as u32 - 1)
    }

    /// Replace the expression stored at `id`
    pub fn replace_expr(&mut self, id: ExprId, expr: Expression) {
        self.exprs[id.index()] = expr;
    }

    // Convenience constructors

    pub fn signed(&mut self, value: i64) -> ExprId {
        self.expr(Expression::SignedConstant(value))
    }

    pub fn undef(&mut self) -> ExprId {
        self.expr(Expression::UndefValue)
    }

    pub fn negation(&mut self, cond: CondId) -> CondId {
        self.cond(Condition::Negation(cond))
    }

    /// Fold a list of conditions into nested conjunctions (`True` if empty)
    pub fn conjunction(&mut self, conds: Vec<CondId>) -> CondId {
        let mut iter = conds.into_iter();
        match iter.next() {
            None => self.cond(Condition::True),
            Some(first) => iter.fold(first, |acc, c| self.cond(Condition::Conjunction(acc, c))),
        }
    }

    pub fn filter(&mut self, condition: CondId, nested: OpId) -> OpId {
        self.op(Operation::Filter { condition, nested })
    }

    pub fn sequence(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.stmt(Statement::Sequence(stmts))
    }

    pub fn query(&mut self, op: OpId) -> StmtId {
        self.stmt(Statement::Query(op))
    }

    // Deep copies

    pub fn clone_expr(&mut self, id: ExprId) -> ExprId {
        let copy = match self[id].clone() {
            Expression::IntrinsicOperator { op, args } => Expression::IntrinsicOperator {
                op,
                args: self.clone_exprs(&args),
            },
            Expression::UserDefinedOperator { name, args } => Expression::UserDefinedOperator {
                name,
                args: self.clone_exprs(&args),
            },
            Expression::PackRecord(args) => Expression::PackRecord(self.clone_exprs(&args)),
            leaf => leaf,
        };
        self.expr(copy)
    }

    pub fn clone_exprs(&mut self, ids: &[ExprId]) -> Vec<ExprId> {
        ids.iter().map(|&id| self.clone_expr(id)).collect()
    }

    pub fn clone_cond(&mut self, id: CondId) -> CondId {
        let copy = match self[id].clone() {
            Condition::Conjunction(lhs, rhs) => {
                Condition::Conjunction(self.clone_cond(lhs), self.clone_cond(rhs))
            }
            Condition::Negation(inner) => Condition::Negation(self.clone_cond(inner)),
            Condition::Constraint { op, lhs, rhs } => Condition::Constraint {
                op,
                lhs: self.clone_expr(lhs),
                rhs: self.clone_expr(rhs),
            },
            Condition::ExistenceCheck { relation, values } => Condition::ExistenceCheck {
                relation,
                values: self.clone_exprs(&values),
            },
            leaf => leaf,
        };
        self.cond(copy)
    }

    /// Top-level expressions of a condition subtree, in left-to-right order
    pub fn exprs_of_cond(&self, id: CondId) -> Vec<ExprId> {
        let mut out = Vec::new();
        self.collect_cond_exprs(id, &mut out);
        out
    }

    fn collect_cond_exprs(&self, id: CondId, out: &mut Vec<ExprId>) {
        match &self[id] {
            Condition::Conjunction(lhs, rhs) => {
                self.collect_cond_exprs(*lhs, out);
                self.collect_cond_exprs(*rhs, out);
            }
            Condition::Negation(inner) => self.collect_cond_exprs(*inner, out),
            Condition::Constraint { lhs, rhs, .. } => {
                out.push(*lhs);
                out.push(*rhs);
            }
            Condition::ExistenceCheck { values, .. } => out.extend(values.iter().copied()),
            Condition::True | Condition::False | Condition::EmptinessCheck { .. } => {}
        }
    }

    /// Rewrite every expression reachable from `root`.
    ///
    /// `mapper` is offered each expression top-down; returning `Some` replaces
    /// the node (its old children are not visited), returning `None` descends
    /// into its children.
    pub fn rewrite_expr<E>(
        &mut self,
        root: ExprId,
        mapper: &mut impl FnMut(&Expression) -> Result<Option<Expression>, E>,
    ) -> Result<(), E> {
        match mapper(&self[root])? {
            Some(replacement) => self.replace_expr(root, replacement),
            None => {
                let children = self[root].children().to_vec();
                for child in children {
                    self.rewrite_expr(child, mapper)?;
                }
            }
        }
        Ok(())
    }

    /// Rewrite every expression reachable from the condition `root`
    pub fn rewrite_cond_exprs<E>(
        &mut self,
        root: CondId,
        mapper: &mut impl FnMut(&Expression) -> Result<Option<Expression>, E>,
    ) -> Result<(), E> {
        for expr in self.exprs_of_cond(root) {
            self.rewrite_expr(expr, mapper)?;
        }
        Ok(())
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }
}

impl Index<ExprId> for Arena {
    type Output = Expression;
    fn index(&self, id: ExprId) -> &Expression {
        &self.exprs[id.index()]
    }
}

impl Index<CondId> for Arena {
    type Output = Condition;
    fn index(&self, id: CondId) -> &Condition {
        &self.conds[id.index()]
    }
}

impl Index<OpId> for Arena {
    type Output = Operation;
    fn index(&self, id: OpId) -> &Operation {
        &self.ops[id.index()]
    }
}

impl Index<StmtId> for Arena {
    type Output = Statement;
    fn index(&self, id: StmtId) -> &Statement {
        &self.stmts[id.index()]
    }
}
