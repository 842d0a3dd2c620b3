//! Where clause values live during evaluation
//!
//! Every variable is recorded at each tuple position it occupies. The first
//! recorded position is its definition point; later ones become equality
//! filters. Aggregates are recorded at the tuple their result is bound to.

use datalog_ast::{Aggregator, Symbol};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Element `element` of the tuple bound to `tuple`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub tuple: usize,
    pub element: usize,
}

impl Location {
    pub fn new(tuple: usize, element: usize) -> Self {
        Location { tuple, element }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValueIndex {
    var_references: IndexMap<Symbol, Vec<Location>>,
    generators: HashMap<Aggregator, Location>,
}

impl ValueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_var_reference(&mut self, var: Symbol, location: Location) {
        self.var_references.entry(var).or_default().push(location);
    }

    pub fn is_defined(&self, var: Symbol) -> bool {
        self.var_references.contains_key(&var)
    }

    /// First location recorded for `var`
    pub fn definition_point(&self, var: Symbol) -> Option<Location> {
        self.var_references
            .get(&var)
            .and_then(|refs| refs.first())
            .copied()
    }

    /// All variables with their locations, in first-reference order
    pub fn var_references(&self) -> impl Iterator<Item = (Symbol, &[Location])> {
        self.var_references
            .iter()
            .map(|(var, refs)| (*var, refs.as_slice()))
    }

    pub fn set_generator_location(&mut self, aggregator: &Aggregator, location: Location) {
        self.generators.insert(aggregator.clone(), location);
    }

    pub fn generator_location(&self, aggregator: &Aggregator) -> Option<Location> {
        self.generators.get(aggregator).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datalog_ast::sym;

    #[test]
    fn test_first_reference_is_definition() {
        let mut index = ValueIndex::new();
        index.add_var_reference(sym("x"), Location::new(1, 0));
        index.add_var_reference(sym("x"), Location::new(0, 2));
        index.add_var_reference(sym("y"), Location::new(0, 1));

        assert_eq!(index.definition_point(sym("x")), Some(Location::new(1, 0)));
        assert!(!index.is_defined(sym("z")));
        let order: Vec<Symbol> = index.var_references().map(|(v, _)| v).collect();
        assert_eq!(order, vec![sym("x"), sym("y")]);
    }
}
