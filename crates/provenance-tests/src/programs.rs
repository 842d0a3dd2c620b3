//! Program fixtures and helpers shared by the tests

use ast2ram::TranslationStrategy;
use compiler::Compiler;
use datalog_ast::{Argument, Atom, Clause, Literal, Program, Relation, RelationQualifier};
use ram::{Interpreter, RamDomain};
use std::collections::BTreeSet;

pub fn unary(name: &str) -> Relation {
    Relation::new(name).with_attribute("a", "number")
}

pub fn binary(name: &str) -> Relation {
    Relation::new(name)
        .with_attribute("src", "number")
        .with_attribute("dst", "number")
}

pub fn atom(name: &str, vars: &[&str]) -> Atom {
    Atom::new(name, vars.iter().map(|v| Argument::var(v)).collect())
}

pub fn pos(name: &str, vars: &[&str]) -> Literal {
    Literal::Atom(atom(name, vars))
}

pub fn neg(name: &str, vars: &[&str]) -> Literal {
    Literal::Negation(atom(name, vars))
}

pub fn edge_fact(src: i64, dst: i64) -> Clause {
    Clause::fact(Atom::new(
        "edge",
        vec![Argument::number(src), Argument::number(dst)],
    ))
}

/// `path(x,y) :- edge(x,y).` and `path(x,z) :- path(x,y), edge(y,z).`
pub fn path_program(edges: &[(i64, i64)]) -> Program {
    let mut program = Program::new();
    program.add_relation(binary("edge"));
    program.add_relation(binary("path").with_qualifier(RelationQualifier::Output));
    for &(src, dst) in edges {
        program.add_clause(edge_fact(src, dst));
    }
    program.add_clause(Clause::new(atom("path", &["x", "y"]), vec![pos("edge", &["x", "y"])]));
    program.add_clause(Clause::new(
        atom("path", &["x", "z"]),
        vec![pos("path", &["x", "y"]), pos("edge", &["y", "z"])],
    ));
    program
}

/// `reach(x,y) :- edge(x,z), reach(z,y).` as the only rule of `reach`
pub fn reach_program() -> Program {
    let mut program = Program::new();
    program.add_relation(binary("edge"));
    program.add_relation(binary("reach").with_qualifier(RelationQualifier::Output));
    program.add_clause(Clause::new(
        atom("reach", &["x", "y"]),
        vec![pos("edge", &["x", "z"]), pos("reach", &["z", "y"])],
    ));
    program
}

pub fn compile(program: &Program, strategy: TranslationStrategy) -> ram::Program {
    Compiler::new()
        .with_strategy(strategy)
        .with_debug_info(false)
        .compile(program)
        .unwrap()
}

/// Run `compiled` to its fixpoint and return the first `arity` columns of
/// every tuple of `relation`
pub fn evaluate(
    compiled: &ram::Program,
    relation: &str,
    arity: usize,
) -> BTreeSet<Vec<RamDomain>> {
    let mut interp = Interpreter::new(compiled);
    interp.run().unwrap();
    interp
        .store()
        .tuples(relation)
        .map(|tuple| tuple[..arity].to_vec())
        .collect()
}

/// Transitive closure computed directly
pub fn closure(edges: &[(i64, i64)]) -> BTreeSet<Vec<RamDomain>> {
    let mut paths: BTreeSet<(i64, i64)> = edges.iter().copied().collect();
    loop {
        let mut next = paths.clone();
        for &(a, b) in &paths {
            for &(c, d) in edges {
                if b == c {
                    next.insert((a, d));
                }
            }
        }
        if next.len() == paths.len() {
            break;
        }
        paths = next;
    }
    paths.into_iter().map(|(a, b)| vec![a, b]).collect()
}
