//! Relation schedule
//!
//! One schedule step per SCC, in evaluation order. A relation expires at the
//! last step that computes or reads it; after that step its contents are no
//! longer needed for the fixpoint. Output relations never expire.

use crate::scc_graph::{collect_read_atoms, SccGraph};
use datalog_ast::{Program, QualifiedName, RelationQualifier};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleStep {
    /// Relations computed at this step
    pub computed: Vec<QualifiedName>,
    /// Relations whose last use is this step
    pub expired: Vec<QualifiedName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSchedule {
    steps: Vec<ScheduleStep>,
}

impl RelationSchedule {
    pub fn new(program: &Program, sccs: &SccGraph) -> Self {
        let step_count = sccs.number_of_sccs();

        // Relations touched by each step, in first-touch order
        let mut used: Vec<Vec<QualifiedName>> = Vec::with_capacity(step_count);
        for scc in 0..step_count {
            let computed = sccs.relations_in_scc(scc);
            let mut touched: Vec<QualifiedName> = computed.to_vec();
            for relation in computed {
                for (_, clause) in program.clauses_of(relation) {
                    let mut reads = Vec::new();
                    collect_read_atoms(&clause.body, &mut reads);
                    for atom in reads {
                        if !touched.contains(&atom.name) {
                            touched.push(atom.name.clone());
                        }
                    }
                }
            }
            used.push(touched);
        }

        let mut expired: Vec<Vec<QualifiedName>> = vec![Vec::new(); step_count];
        let mut alive: HashSet<QualifiedName> = HashSet::new();
        for step in (0..step_count).rev() {
            for relation in &used[step] {
                if alive.insert(relation.clone()) && !is_output(program, relation) {
                    expired[step].push(relation.clone());
                }
            }
        }

        let steps = expired
            .into_iter()
            .enumerate()
            .map(|(scc, expired)| ScheduleStep {
                computed: sccs.relations_in_scc(scc).to_vec(),
                expired,
            })
            .collect();

        RelationSchedule { steps }
    }

    pub fn steps(&self) -> &[ScheduleStep] {
        &self.steps
    }

    /// Relations that may be disposed after evaluating step `step`
    pub fn expired(&self, step: usize) -> &[QualifiedName] {
        &self.steps[step].expired
    }
}

fn is_output(program: &Program, name: &QualifiedName) -> bool {
    program
        .relation(name)
        .map(|r| r.has_qualifier(RelationQualifier::Output))
        .unwrap_or(false)
}
