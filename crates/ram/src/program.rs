//! Compiled programs

use crate::arena::Arena;
use crate::ir::StmtId;
use crate::symbol_table::SymbolTable;
use serde::Serialize;
use std::collections::BTreeMap;

/// Physical representation of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Representation {
    #[default]
    Default,
    Btree,
    Brie,
    Eqrel,
    Info,
}

/// A relation declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub name: String,
    /// Total number of columns, auxiliary ones included
    pub arity: usize,
    /// Trailing columns that are not part of the logical schema
    pub auxiliary_arity: usize,
    pub attribute_names: Vec<String>,
    pub attribute_types: Vec<String>,
    pub representation: Representation,
}

impl Relation {
    /// Number of columns visible to the source program
    pub fn logical_arity(&self) -> usize {
        self.arity - self.auxiliary_arity
    }
}

/// A named subroutine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subroutine {
    pub body: StmtId,
    /// Names of the expected arguments, in calling order
    pub parameters: Vec<String>,
}

/// A complete compiled program
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub arena: Arena,
    pub relations: Vec<Relation>,
    pub main: StmtId,
    pub subroutines: BTreeMap<String, Subroutine>,
    pub symbols: SymbolTable,
}

impl Program {
    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    pub fn subroutine(&self, name: &str) -> Option<&Subroutine> {
        self.subroutines.get(name)
    }

    /// Serialize the whole program, arena included, to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
