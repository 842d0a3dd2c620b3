//! Recursive clause detection
//!
//! A clause is recursive when the relation it defines can be reached from its
//! own body atoms by following the body atoms of the clauses defining them.
//! Attributes typed by an equivalence relation count as an implicit read of
//! that relation.

use datalog_ast::{ClauseId, Clause, Program, QualifiedName, RelationRepresentation};
use std::collections::HashSet;

/// Set of recursive clauses of a program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecursiveClauses {
    recursive: HashSet<ClauseId>,
}

impl RecursiveClauses {
    pub fn run(program: &Program) -> Self {
        let recursive = program
            .clauses_with_ids()
            .filter(|(_, clause)| compute_is_recursive(program, clause))
            .map(|(id, _)| id)
            .collect();
        RecursiveClauses { recursive }
    }

    pub fn is_recursive(&self, clause: ClauseId) -> bool {
        self.recursive.contains(&clause)
    }
}

fn compute_is_recursive(program: &Program, clause: &Clause) -> bool {
    let target = &clause.head.name;

    let mut reached: HashSet<QualifiedName> = HashSet::new();
    let mut worklist: Vec<QualifiedName> = Vec::new();

    for atom in clause.body_atoms() {
        if &atom.name == target {
            return true;
        }
        worklist.push(atom.name.clone());
    }

    while let Some(current) = worklist.pop() {
        if !reached.insert(current.clone()) {
            continue;
        }

        // Undeclared relations have no clauses and no attributes to follow
        let Some(relation) = program.relation(&current) else {
            continue;
        };

        for attr in &relation.attributes {
            if let Some(eqrel) = program.relation(&attr.type_name) {
                if eqrel.representation == RelationRepresentation::Eqrel {
                    if &eqrel.name == target {
                        return true;
                    }
                    worklist.push(eqrel.name.clone());
                }
            }
        }

        for (_, defining) in program.clauses_of(&current) {
            for atom in defining.body_atoms() {
                if &atom.name == target {
                    return true;
                }
                worklist.push(atom.name.clone());
            }
        }
    }

    false
}
