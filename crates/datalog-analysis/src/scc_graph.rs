//! Precedence graph and strongly connected components
//!
//! A relation depends on every relation read by one of its clauses: positive
//! atoms, negated atoms and atoms inside aggregator bodies. Relations that
//! depend on each other (directly or transitively) form one SCC and are
//! evaluated together in a fixpoint loop.
//!
//! # Algorithm
//!
//! 1. Build the dependency graph over declared relations
//! 2. Run Tarjan's algorithm; it emits an SCC only after every SCC it
//!    depends on, which is exactly the evaluation order
//! 3. Mark an SCC recursive when it has several relations or a self-edge

use datalog_ast::{Argument, Atom, Literal, Program, QualifiedName};
use std::collections::HashMap;
use tracing::debug;

/// Dependency graph for the relations of a program
#[derive(Debug, Clone)]
struct DependencyGraph {
    /// Declared relations, in declaration order
    nodes: Vec<QualifiedName>,
    /// Outgoing edges: relation -> relations it reads
    edges: Vec<Vec<usize>>,
}

impl DependencyGraph {
    fn new(program: &Program) -> Self {
        let nodes: Vec<QualifiedName> = program.relations.iter().map(|r| r.name.clone()).collect();
        let index: HashMap<&QualifiedName, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n, i)).collect();
        let mut edges = vec![Vec::new(); nodes.len()];

        for clause in &program.clauses {
            let Some(&head) = index.get(&clause.head.name) else {
                continue;
            };
            let mut reads = Vec::new();
            collect_read_atoms(&clause.body, &mut reads);
            for atom in reads {
                // Undeclared relations are reported by the translator
                if let Some(&dep) = index.get(&atom.name) {
                    if !edges[head].contains(&dep) {
                        edges[head].push(dep);
                    }
                }
            }
        }

        DependencyGraph { nodes, edges }
    }
}

/// Collect every atom read by a body, including aggregator sub-bodies
pub(crate) fn collect_read_atoms<'a>(body: &'a [Literal], out: &mut Vec<&'a Atom>) {
    for literal in body {
        match literal {
            Literal::Atom(atom) | Literal::Negation(atom) => {
                out.push(atom);
                for arg in &atom.args {
                    collect_aggregator_atoms(arg, out);
                }
            }
            Literal::Constraint(datalog_ast::Constraint::Binary { lhs, rhs, .. }) => {
                collect_aggregator_atoms(lhs, out);
                collect_aggregator_atoms(rhs, out);
            }
            Literal::Constraint(datalog_ast::Constraint::Boolean(_)) => {}
        }
    }
}

fn collect_aggregator_atoms<'a>(arg: &'a Argument, out: &mut Vec<&'a Atom>) {
    match arg {
        Argument::Aggregator(agg) => {
            collect_read_atoms(&agg.body, out);
            if let Some(target) = &agg.target {
                collect_aggregator_atoms(target, out);
            }
        }
        Argument::IntrinsicFunctor { args, .. }
        | Argument::UserDefinedFunctor { args, .. }
        | Argument::RecordInit(args) => {
            for a in args {
                collect_aggregator_atoms(a, out);
            }
        }
        _ => {}
    }
}

/// Strongly connected components of the precedence graph, in evaluation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SccGraph {
    sccs: Vec<Vec<QualifiedName>>,
    recursive: Vec<bool>,
    scc_of: HashMap<QualifiedName, usize>,
    /// SCCs each SCC reads from (excluding itself)
    dependencies: Vec<Vec<usize>>,
}

/// Tarjan bookkeeping
struct Tarjan<'g> {
    graph: &'g DependencyGraph,
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
    components: Vec<Vec<usize>>,
}

impl<'g> Tarjan<'g> {
    fn new(graph: &'g DependencyGraph) -> Self {
        let n = graph.nodes.len();
        Tarjan {
            graph,
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            next_index: 0,
            components: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Vec<usize>> {
        for node in 0..self.graph.nodes.len() {
            if self.index[node].is_none() {
                self.visit(node);
            }
        }
        self.components
    }

    fn visit(&mut self, node: usize) {
        self.index[node] = Some(self.next_index);
        self.lowlink[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[node] = true;

        for &succ in &self.graph.edges[node] {
            match self.index[succ] {
                None => {
                    self.visit(succ);
                    self.lowlink[node] = self.lowlink[node].min(self.lowlink[succ]);
                }
                Some(succ_index) if self.on_stack[succ] => {
                    self.lowlink[node] = self.lowlink[node].min(succ_index);
                }
                Some(_) => {}
            }
        }

        if Some(self.lowlink[node]) == self.index[node] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack[member] = false;
                component.push(member);
                if member == node {
                    break;
                }
            }
            // Keep declaration order within a component
            component.sort_unstable();
            self.components.push(component);
        }
    }
}

impl SccGraph {
    pub fn new(program: &Program) -> Self {
        let graph = DependencyGraph::new(program);
        let components = Tarjan::new(&graph).run();

        let mut component_of = vec![0; graph.nodes.len()];
        for (scc, members) in components.iter().enumerate() {
            for &m in members {
                component_of[m] = scc;
            }
        }

        let recursive = components
            .iter()
            .map(|members| {
                members.len() > 1 || members.iter().any(|&m| graph.edges[m].contains(&m))
            })
            .collect();

        let dependencies = components
            .iter()
            .enumerate()
            .map(|(scc, members)| {
                let mut deps: Vec<usize> = members
                    .iter()
                    .flat_map(|&m| graph.edges[m].iter().map(|&d| component_of[d]))
                    .filter(|&d| d != scc)
                    .collect();
                deps.sort_unstable();
                deps.dedup();
                deps
            })
            .collect();

        let sccs: Vec<Vec<QualifiedName>> = components
            .iter()
            .map(|members| members.iter().map(|&m| graph.nodes[m].clone()).collect())
            .collect();

        let scc_of = sccs
            .iter()
            .enumerate()
            .flat_map(|(i, rels)| rels.iter().map(move |r| (r.clone(), i)))
            .collect();

        debug!(sccs = sccs.len(), "computed precedence graph components");

        SccGraph {
            sccs,
            recursive,
            scc_of,
            dependencies,
        }
    }

    pub fn number_of_sccs(&self) -> usize {
        self.sccs.len()
    }

    /// Relations evaluated together in `scc`, in declaration order
    pub fn relations_in_scc(&self, scc: usize) -> &[QualifiedName] {
        &self.sccs[scc]
    }

    /// An SCC is recursive if it has several relations or one that reads itself
    pub fn is_recursive(&self, scc: usize) -> bool {
        self.recursive[scc]
    }

    pub fn scc_of(&self, relation: &QualifiedName) -> Option<usize> {
        self.scc_of.get(relation).copied()
    }

    /// SCCs read by `scc`, all earlier in evaluation order
    pub fn dependencies(&self, scc: usize) -> &[usize] {
        &self.dependencies[scc]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datalog_ast::{Argument, Clause, Relation};

    fn binary(name: &str) -> Relation {
        Relation::new(name)
            .with_attribute("a", "number")
            .with_attribute("b", "number")
    }

    fn atom(rel: &str, a: &str, b: &str) -> Atom {
        Atom::new(rel, vec![Argument::var(a), Argument::var(b)])
    }

    fn transitive_closure() -> Program {
        let mut program = Program::new();
        program.add_relation(binary("reach"));
        program.add_relation(binary("edge"));
        program.add_clause(Clause::new(
            atom("reach", "x", "y"),
            vec![Literal::Atom(atom("edge", "x", "y"))],
        ));
        program.add_clause(Clause::new(
            atom("reach", "x", "y"),
            vec![
                Literal::Atom(atom("edge", "x", "z")),
                Literal::Atom(atom("reach", "z", "y")),
            ],
        ));
        program
    }

    #[test]
    fn test_dependencies_come_first() {
        let graph = SccGraph::new(&transitive_closure());

        assert_eq!(graph.number_of_sccs(), 2);
        let edge = graph.scc_of(&QualifiedName::new("edge")).unwrap();
        let reach = graph.scc_of(&QualifiedName::new("reach")).unwrap();
        assert!(edge < reach);
        assert!(graph.is_recursive(reach));
        assert!(!graph.is_recursive(edge));
        assert_eq!(graph.dependencies(reach), &[edge]);
    }

    #[test]
    fn test_mutual_recursion_shares_component() {
        let mut program = Program::new();
        program.add_relation(binary("even"));
        program.add_relation(binary("odd"));
        program.add_relation(binary("succ"));
        program.add_clause(Clause::new(
            atom("even", "x", "y"),
            vec![Literal::Atom(atom("odd", "x", "z")), Literal::Atom(atom("succ", "z", "y"))],
        ));
        program.add_clause(Clause::new(
            atom("odd", "x", "y"),
            vec![Literal::Atom(atom("even", "x", "z")), Literal::Atom(atom("succ", "z", "y"))],
        ));

        let graph = SccGraph::new(&program);
        let even = graph.scc_of(&QualifiedName::new("even")).unwrap();
        assert_eq!(graph.scc_of(&QualifiedName::new("odd")), Some(even));
        assert!(graph.is_recursive(even));
        assert_eq!(
            graph.relations_in_scc(even),
            &[QualifiedName::new("even"), QualifiedName::new("odd")]
        );
    }

    #[test]
    fn test_negation_creates_dependency() {
        let mut program = Program::new();
        program.add_relation(binary("safe"));
        program.add_relation(binary("edge"));
        program.add_relation(binary("blocked"));
        program.add_clause(Clause::new(
            atom("safe", "x", "y"),
            vec![
                Literal::Atom(atom("edge", "x", "y")),
                Literal::Negation(atom("blocked", "x", "y")),
            ],
        ));

        let graph = SccGraph::new(&program);
        let safe = graph.scc_of(&QualifiedName::new("safe")).unwrap();
        let blocked = graph.scc_of(&QualifiedName::new("blocked")).unwrap();
        assert!(blocked < safe);
        assert!(!graph.is_recursive(safe));
    }
}
