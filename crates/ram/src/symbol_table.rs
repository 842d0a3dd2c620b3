//! Append-only symbol table
//!
//! Strings are stored as dense ordinals in the value domain. Ordinals are
//! assigned in insertion order and never change.

use crate::ir::RamDomain;
use indexmap::IndexSet;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolTable {
    symbols: IndexSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordinal of `symbol`, inserting it if it is new
    pub fn encode(&mut self, symbol: &str) -> RamDomain {
        if let Some(index) = self.symbols.get_index_of(symbol) {
            return index as RamDomain;
        }
        let (index, _) = self.symbols.insert_full(symbol.to_string());
        index as RamDomain
    }

    /// Ordinal of `symbol` if it was interned
    pub fn lookup(&self, symbol: &str) -> Option<RamDomain> {
        self.symbols.get_index_of(symbol).map(|i| i as RamDomain)
    }

    pub fn decode(&self, ordinal: RamDomain) -> Option<&str> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| self.symbols.get_index(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }
}
