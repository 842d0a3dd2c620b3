//! Accumulates the pieces of a compiled program

use ram::{Arena, Program, Relation, StmtId, Subroutine, SymbolTable};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    pub arena: Arena,
    pub symbols: SymbolTable,
    relations: Vec<Relation>,
    subroutines: BTreeMap<String, Subroutine>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a relation; later declarations of the same name are ignored
    pub fn declare(&mut self, relation: Relation) {
        if self.relation(&relation.name).is_none() {
            self.relations.push(relation);
        }
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    pub fn add_subroutine(&mut self, name: String, subroutine: Subroutine) {
        self.subroutines.insert(name, subroutine);
    }

    pub fn finish(self, main: StmtId) -> Program {
        Program {
            arena: self.arena,
            relations: self.relations,
            main,
            subroutines: self.subroutines,
            symbols: self.symbols,
        }
    }
}

/// Name of the RAM relation holding `name`
pub fn concrete_relation_name(name: &datalog_ast::QualifiedName) -> String {
    name.to_string()
}

/// Tuples discovered in the previous iteration of a recursive SCC
pub fn delta_relation_name(name: &datalog_ast::QualifiedName) -> String {
    format!("@delta_{}", name)
}

/// Tuples discovered in the current iteration of a recursive SCC
pub fn new_relation_name(name: &datalog_ast::QualifiedName) -> String {
    format!("@new_{}", name)
}
