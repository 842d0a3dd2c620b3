//! Fixpoint evaluation of compiled programs

use crate::programs::{atom, binary, closure, compile, evaluate, neg, path_program, pos, unary};
use ast2ram::TranslationStrategy;
use datalog_ast::{
    AggregateOp, Aggregator, Argument, Atom, BinaryConstraintOp, Clause, Constraint, Literal,
    Program, Relation, RelationQualifier,
};
use ram::Interpreter;

#[test]
fn test_transitive_closure_under_both_strategies() {
    logging::init_test_subscriber();
    let edges = [(1, 2), (2, 3), (3, 4), (4, 2)];
    let program = path_program(&edges);

    let seminaive = evaluate(&compile(&program, TranslationStrategy::Seminaive), "path", 2);
    let provenance = evaluate(&compile(&program, TranslationStrategy::Provenance), "path", 2);
    assert_eq!(seminaive, closure(&edges));
    assert_eq!(provenance, seminaive);
}

#[test]
fn test_levels_record_shortest_derivation_depth() {
    let compiled = compile(&path_program(&[(1, 2), (2, 3), (3, 4)]), TranslationStrategy::Provenance);
    let mut interp = Interpreter::new(&compiled);
    interp.run().unwrap();
    let store = interp.store();

    assert!(store.contains("edge", &[1, 2, 0, 0]));
    assert!(store.contains("path", &[1, 2, 1, 1]));
    assert!(store.contains("path", &[1, 3, 2, 2]));
    assert!(store.contains("path", &[1, 4, 2, 3]));
    // each tuple is derived once
    assert_eq!(store.len("path"), 6);
}

#[test]
fn test_negation_filters_derivations() {
    let mut program = path_program(&[(1, 2), (2, 3)]);
    program.add_relation(binary("blocked"));
    program.add_relation(binary("open").with_qualifier(RelationQualifier::Output));
    program.add_clause(Clause::fact(Atom::new(
        "blocked",
        vec![Argument::number(1), Argument::number(3)],
    )));
    program.add_clause(Clause::new(
        atom("open", &["x", "y"]),
        vec![pos("path", &["x", "y"]), neg("blocked", &["x", "y"])],
    ));

    for strategy in [TranslationStrategy::Seminaive, TranslationStrategy::Provenance] {
        let open = evaluate(&compile(&program, strategy), "open", 2);
        assert_eq!(open, [vec![1, 2], vec![2, 3]].into_iter().collect());
    }
}

#[test]
fn test_count_aggregate() {
    let mut program = path_program(&[(1, 2), (1, 3), (2, 3)]);
    program.add_relation(unary("node"));
    program.add_relation(binary("degree").with_qualifier(RelationQualifier::Output));
    for n in 1..=3 {
        program.add_clause(Clause::fact(Atom::new("node", vec![Argument::number(n)])));
    }
    let count = Argument::Aggregator(Box::new(Aggregator {
        op: AggregateOp::Count,
        target: None,
        body: vec![Literal::Atom(Atom::new(
            "edge",
            vec![Argument::var("x"), Argument::UnnamedVariable],
        ))],
    }));
    program.add_clause(Clause::new(
        atom("degree", &["x", "n"]),
        vec![
            pos("node", &["x"]),
            Literal::Constraint(Constraint::Binary {
                op: BinaryConstraintOp::Eq,
                lhs: Argument::var("n"),
                rhs: count,
            }),
        ],
    ));

    let degree = evaluate(&compile(&program, TranslationStrategy::Seminaive), "degree", 2);
    assert_eq!(
        degree,
        [vec![1, 2], vec![2, 1], vec![3, 0]].into_iter().collect()
    );
}

#[test]
fn test_string_constants_are_interned() {
    let mut program = Program::new();
    program.add_relation(
        Relation::new("name")
            .with_attribute("id", "number")
            .with_attribute("label", "symbol"),
    );
    program.add_relation(unary("alice").with_qualifier(RelationQualifier::Output));
    program.add_clause(Clause::fact(Atom::new(
        "name",
        vec![Argument::number(1), Argument::string("alice")],
    )));
    program.add_clause(Clause::new(
        atom("alice", &["x"]),
        vec![Literal::Atom(Atom::new(
            "name",
            vec![Argument::var("x"), Argument::string("alice")],
        ))],
    ));

    let compiled = compile(&program, TranslationStrategy::Seminaive);
    assert_eq!(compiled.symbols.lookup("alice"), Some(0));
    assert_eq!(compiled.relation("name").unwrap().attribute_types[1], "s:symbol");
    assert_eq!(evaluate(&compiled, "alice", 1), [vec![1]].into_iter().collect());
}
