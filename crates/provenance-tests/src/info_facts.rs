//! Info facts as stored by the compiled program

use crate::programs::{atom, compile, neg, path_program, pos, reach_program, unary};
use ast2ram::TranslationStrategy;
use datalog_ast::{Argument, Atom, Clause, Program};
use ram::Interpreter;

/// Decoded `(clause_num, head, literals...)` rows of `relation`
fn info_rows(compiled: &ram::Program, relation: &str) -> Vec<(i64, Vec<String>)> {
    let mut interp = Interpreter::new(compiled);
    interp.run().unwrap();
    let arity = compiled.relation(relation).unwrap().logical_arity();
    interp
        .store()
        .tuples(relation)
        .map(|tuple| {
            let strings = tuple[1..arity]
                .iter()
                .map(|&ordinal| interp.symbols().decode(ordinal).unwrap().to_string())
                .collect();
            (tuple[0], strings)
        })
        .collect()
}

#[test]
fn test_reach_info_fact() {
    let compiled = compile(&reach_program(), TranslationStrategy::Provenance);
    assert_eq!(
        info_rows(&compiled, "reach.@info.1"),
        vec![(
            1,
            vec!["x,y".to_string(), "edge,x,z".to_string(), "reach,z,y".to_string()]
        )]
    );
}

#[test]
fn test_info_fact_bookkeeping_columns_are_zero() {
    let compiled = compile(&reach_program(), TranslationStrategy::Provenance);
    let mut interp = Interpreter::new(&compiled);
    interp.run().unwrap();
    let tuple = interp.store().tuples("reach.@info.1").next().unwrap().clone();
    assert_eq!(tuple.len(), 4 + 2);
    assert_eq!(&tuple[4..], &[0, 0]);
}

#[test]
fn test_unnamed_head_argument() {
    let mut program = Program::new();
    program.add_relation(unary("q"));
    program.add_relation(unary("p"));
    program.add_clause(Clause::new(
        Atom::new("p", vec![Argument::UnnamedVariable]),
        vec![pos("q", &["x"])],
    ));
    let compiled = compile(&program, TranslationStrategy::Provenance);
    assert_eq!(
        info_rows(&compiled, "p.@info.1"),
        vec![(1, vec!["_".to_string(), "q,x".to_string()])]
    );
}

#[test]
fn test_negations_are_described_by_name() {
    let mut program = Program::new();
    program.add_relation(unary("q"));
    program.add_relation(unary("r"));
    program.add_relation(unary("p"));
    program.add_clause(Clause::new(
        atom("p", &["x"]),
        vec![pos("q", &["x"]), neg("r", &["x"])],
    ));
    let compiled = compile(&program, TranslationStrategy::Provenance);
    assert_eq!(
        info_rows(&compiled, "p.@info.1"),
        vec![(1, vec!["x".to_string(), "q,x".to_string(), "!r".to_string()])]
    );
}

#[test]
fn test_recompilation_is_deterministic() {
    let program = path_program(&[(1, 2), (2, 3)]);
    let first = compile(&program, TranslationStrategy::Provenance);
    let second = compile(&program, TranslationStrategy::Provenance);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    assert_eq!(
        info_rows(&first, "path.@info.2"),
        info_rows(&second, "path.@info.2")
    );
}
