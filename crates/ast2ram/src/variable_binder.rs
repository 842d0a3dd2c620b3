//! Variable slots for subroutine arguments
//!
//! A subroutine built from a clause receives one argument per clause
//! variable. [`SlotMapBuilder`] assigns the slots in two passes over the
//! clause (body literals in order, then the head, each depth-first):
//!
//! 1. named variables, first occurrence first;
//! 2. variables introduced for anonymous positions (`+underscore...`).
//!
//! Derivation-level variables (`@level_num...`) never get a slot. They are
//! erased: every reference to them becomes a wildcard.

use crate::error::{TranslationError, TranslationResult};
use crate::value_index::{Location, ValueIndex};
use datalog_ast::{is_level_variable, is_underscore_variable, Clause, Symbol};
use indexmap::IndexSet;
use ram::{Arena, CondId, ExprId, Expression};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMap {
    slots: IndexSet<Symbol>,
    erased: IndexSet<Symbol>,
}

impl SlotMap {
    pub fn for_clause(clause: &Clause) -> Self {
        let mut builder = SlotMapBuilder::new();
        builder.collect_named(clause);
        builder.collect_underscores(clause);
        builder.build()
    }

    /// Number of slots, i.e. subroutine arguments
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, var: Symbol) -> Option<usize> {
        self.slots.get_index_of(&var)
    }

    /// Variables in slot order
    pub fn variables(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.slots.iter().copied()
    }

    pub fn parameter_names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.to_string()).collect()
    }

    /// Index placing slot `i` at tuple `i`; erased variables follow the slots
    pub fn value_index(&self) -> ValueIndex {
        let mut index = ValueIndex::new();
        for (slot, var) in self.slots.iter().enumerate() {
            index.add_var_reference(*var, Location::new(slot, 0));
        }
        for (i, var) in self.erased.iter().enumerate() {
            index.add_var_reference(*var, Location::new(self.slots.len() + i, 0));
        }
        index
    }

    /// Redirect every tuple reference below `root` (built against
    /// [`value_index`](Self::value_index)) to subroutine arguments
    pub fn rewrite_cond(&self, arena: &mut Arena, root: CondId) -> TranslationResult<()> {
        arena.rewrite_cond_exprs(root, &mut |expr| self.map_tuple(expr))
    }

    pub fn rewrite_expr(&self, arena: &mut Arena, root: ExprId) -> TranslationResult<()> {
        arena.rewrite_expr(root, &mut |expr| self.map_tuple(expr))
    }

    fn map_tuple(&self, expr: &Expression) -> TranslationResult<Option<Expression>> {
        let Expression::TupleElement { tuple, .. } = expr else {
            return Ok(None);
        };
        if *tuple < self.slots.len() {
            Ok(Some(Expression::SubroutineArgument(*tuple)))
        } else if *tuple - self.slots.len() < self.erased.len() {
            Ok(Some(Expression::UndefValue))
        } else {
            Err(TranslationError::MissingSlot(format!("t{}", tuple)))
        }
    }
}

/// Two-pass slot assignment
#[derive(Debug, Default)]
pub struct SlotMapBuilder {
    slots: IndexSet<Symbol>,
    erased: IndexSet<Symbol>,
}

impl SlotMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// First pass: named variables, erasing derivation levels
    pub fn collect_named(&mut self, clause: &Clause) {
        visit_clause_variables(clause, &mut |var| {
            if is_level_variable(&var) {
                self.erased.insert(var);
            } else if !is_underscore_variable(&var) {
                self.slots.insert(var);
            }
        });
    }

    /// Second pass: variables standing for anonymous positions
    pub fn collect_underscores(&mut self, clause: &Clause) {
        visit_clause_variables(clause, &mut |var| {
            if is_underscore_variable(&var) {
                self.slots.insert(var);
            }
        });
    }

    pub fn build(self) -> SlotMap {
        SlotMap {
            slots: self.slots,
            erased: self.erased,
        }
    }
}

fn visit_clause_variables(clause: &Clause, f: &mut impl FnMut(Symbol)) {
    for literal in &clause.body {
        literal.for_each_variable(f);
    }
    clause.head.for_each_variable(f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use datalog_ast::{sym, Argument, Atom, BinaryConstraintOp, Constraint, Literal};

    fn atom(name: &str, vars: &[&str]) -> Atom {
        Atom::new(name, vars.iter().map(|v| Argument::var(v)).collect())
    }

    #[test]
    fn test_first_occurrence_order() {
        let clause = Clause::new(
            atom("reach", &["x", "y"]),
            vec![
                Literal::Atom(atom("edge", &["x", "z"])),
                Literal::Atom(atom("reach", &["z", "y"])),
            ],
        );
        let slots = SlotMap::for_clause(&clause);
        let order: Vec<Symbol> = slots.variables().collect();
        assert_eq!(order, vec![sym("x"), sym("z"), sym("y")]);
    }

    #[test]
    fn test_underscores_follow_named_and_levels_are_erased() {
        let clause = Clause::new(
            atom("p", &["x"]),
            vec![
                Literal::Atom(atom("q", &["+underscore0", "x"])),
                Literal::Atom(atom("r", &["x", "w"])),
                Literal::Constraint(Constraint::Binary {
                    op: BinaryConstraintOp::Lt,
                    lhs: Argument::var("@level_num_0"),
                    rhs: Argument::number(3),
                }),
            ],
        );
        let slots = SlotMap::for_clause(&clause);
        assert_eq!(
            slots.parameter_names(),
            vec!["x".to_string(), "w".to_string(), "+underscore0".to_string()]
        );
        assert_eq!(slots.slot(sym("@level_num_0")), None);

        let index = slots.value_index();
        assert_eq!(
            index.definition_point(sym("@level_num_0")),
            Some(Location::new(3, 0))
        );
    }

    #[test]
    fn test_rewrite_to_arguments() {
        let clause = Clause::new(atom("p", &["x"]), vec![Literal::Atom(atom("q", &["x"]))]);
        let slots = SlotMap::for_clause(&clause);
        let mut arena = Arena::new();
        let x = arena.expr(Expression::TupleElement { tuple: 0, element: 0 });
        slots.rewrite_expr(&mut arena, x).unwrap();
        assert_eq!(arena[x], Expression::SubroutineArgument(0));

        let stray = arena.expr(Expression::TupleElement { tuple: 5, element: 0 });
        assert_eq!(
            slots.rewrite_expr(&mut arena, stray),
            Err(TranslationError::MissingSlot("t5".to_string()))
        );
    }
}
