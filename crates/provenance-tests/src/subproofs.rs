//! Subproof subroutines observed through the interpreter

use crate::programs::{atom, binary, compile, neg, path_program, pos, reach_program, unary};
use ast2ram::{SlotMap, TranslationError, TranslationStrategy};
use compiler::{CompileError, Compiler};
use datalog_ast::{
    AggregateOp, Aggregator, Argument, Atom, BinaryConstraintOp, Clause, Constraint, FunctorOp,
    Literal, Program,
};
use ram::{Interpreter, RelationStore};

fn lt(lhs: i64, rhs: i64) -> Literal {
    Literal::Constraint(Constraint::Binary {
        op: BinaryConstraintOp::Lt,
        lhs: Argument::number(lhs),
        rhs: Argument::number(rhs),
    })
}

/// `out(x) :- a(x), !b(x), x < 3.`
fn mixed_body_program() -> Program {
    let mut program = Program::new();
    program.add_relation(unary("a"));
    program.add_relation(unary("b"));
    program.add_relation(unary("out"));
    program.add_clause(Clause::new(
        atom("out", &["x"]),
        vec![
            pos("a", &["x"]),
            neg("b", &["x"]),
            Literal::Constraint(Constraint::Binary {
                op: BinaryConstraintOp::Lt,
                lhs: Argument::var("x"),
                rhs: Argument::number(3),
            }),
        ],
    ));
    program
}

#[test]
fn test_single_atom_rule_has_one_branch_pair() {
    let mut program = Program::new();
    program.add_relation(binary("edge"));
    program.add_relation(binary("path"));
    program.add_clause(Clause::new(atom("path", &["x", "y"]), vec![pos("edge", &["x", "y"])]));
    let compiled = compile(&program, TranslationStrategy::Provenance);

    let negation = compiled.subroutine("path_1_negation_subproof").unwrap();
    assert_eq!(negation.parameters, vec!["x", "y"]);
    assert_eq!(
        compiled.arena.display_stmt(negation.body),
        "QUERY\n IF (argument(0),argument(1),_,_) IN edge\n  RETURN (1)\nEND QUERY\n\
         QUERY\n IF (NOT (argument(0),argument(1),_,_) IN edge)\n  RETURN (0)\nEND QUERY\n"
    );
}

#[test]
fn test_negation_subproof_reports_only_the_first_literal() {
    let compiled = compile(&mixed_body_program(), TranslationStrategy::Provenance);
    let text = compiled
        .arena
        .display_stmt(compiled.subroutine("out_1_negation_subproof").unwrap().body);
    // one pair per literal, constraints last
    assert_eq!(text.lines().filter(|line| *line == "QUERY").count(), 3 * 2);
    assert!(text.ends_with(
        "QUERY\n IF (argument(0) < 3)\n  RETURN (1)\nEND QUERY\n\
         QUERY\n IF (NOT (argument(0) < 3))\n  RETURN (0)\nEND QUERY\n"
    ));

    for (in_a, in_b) in [(false, false), (false, true), (true, false), (true, true)] {
        for x in [1, 5] {
            let mut store = RelationStore::new();
            if in_a {
                store.insert("a", vec![x, 0, 0]);
            }
            if in_b {
                store.insert("b", vec![x, 0, 0]);
            }
            let mut interp = Interpreter::with_store(&compiled, store);
            let signal = interp.call("out_1_negation_subproof", &[x]).unwrap();
            assert_eq!(signal, Some(vec![i64::from(in_a)]), "a={in_a} b={in_b} x={x}");
        }
    }
}

#[test]
fn test_both_subroutines_share_the_slot_map() {
    let program = reach_program();
    let compiled = compile(&program, TranslationStrategy::Provenance);
    let positive = compiled.subroutine("reach_1_subproof").unwrap();
    let negation = compiled.subroutine("reach_1_negation_subproof").unwrap();

    let slots = SlotMap::for_clause(&program.clauses[0]);
    assert_eq!(slots.parameter_names(), vec!["x", "z", "y"]);
    assert_eq!(negation.parameters, slots.parameter_names());
    assert_eq!(&positive.parameters[..slots.len()], &negation.parameters[..]);
    assert_eq!(positive.parameters[slots.len()], "@level_number");
}

#[test]
fn test_positive_subproof_after_evaluation() {
    let compiled = compile(&path_program(&[(1, 2), (2, 3)]), TranslationStrategy::Provenance);
    let mut interp = Interpreter::new(&compiled);
    interp.run().unwrap();
    assert!(interp.store().contains("path", &[1, 3, 2, 2]));

    // path(x,z) :- path(x,y), edge(y,z) with slots [x, y, z]; y is free
    let proof = interp.call("path_2_subproof", &[1, 0, 3, 2]).unwrap();
    assert_eq!(proof, Some(vec![1, 2, 1, 2, 3, 0]));

    // a proof strictly below level 1 does not exist
    assert_eq!(interp.call("path_2_subproof", &[1, 0, 3, 1]).unwrap(), None);

    // path(1,3) has no single-edge proof
    assert_eq!(interp.call("path_1_subproof", &[1, 3, 5]).unwrap(), None);
    assert_eq!(
        interp.call("path_1_subproof", &[1, 2, 5]).unwrap(),
        Some(vec![1, 2, 0])
    );
}

#[test]
fn test_argument_count_is_checked() {
    let compiled = compile(&reach_program(), TranslationStrategy::Provenance);
    let mut interp = Interpreter::new(&compiled);
    assert!(interp.call("reach_1_negation_subproof", &[1, 2]).is_err());
    assert!(interp.call("reach_1_subproof", &[1, 2, 3]).is_err());
}

#[test]
fn test_functor_head_subproof_after_evaluation() {
    // p(x+1) :- q(x).
    let mut program = Program::new();
    program.add_relation(unary("q"));
    program.add_relation(unary("p"));
    for n in [1, 7] {
        program.add_clause(Clause::fact(Atom::new("q", vec![Argument::number(n)])));
    }
    let succ = Argument::IntrinsicFunctor {
        op: FunctorOp::Add,
        args: vec![Argument::var("x"), Argument::number(1)],
    };
    program.add_clause(Clause::new(Atom::new("p", vec![succ]), vec![pos("q", &["x"])]));

    let compiled = compile(&program, TranslationStrategy::Provenance);
    let mut interp = Interpreter::new(&compiled);
    interp.run().unwrap();
    assert!(interp.store().contains("p", &[8, 1, 1]));

    assert_eq!(interp.call("p_1_subproof", &[7, 1]).unwrap(), Some(vec![7, 0]));
    assert_eq!(interp.call("p_1_subproof", &[7, 0]).unwrap(), None);
    assert_eq!(interp.call("p_1_subproof", &[3, 1]).unwrap(), None);
}

#[test]
fn test_constraint_only_body_decides_first_constraint() {
    for (body, expected) in [
        (vec![lt(1, 2), lt(5, 3)], 1),
        (vec![lt(5, 3), lt(1, 2)], 0),
    ] {
        let mut program = Program::new();
        program.add_relation(unary("p"));
        program.add_clause(Clause::new(
            Atom::new("p", vec![Argument::number(3)]),
            body,
        ));
        let compiled = compile(&program, TranslationStrategy::Provenance);
        let negation = compiled.subroutine("p_1_negation_subproof").unwrap();
        assert!(negation.parameters.is_empty());

        let mut interp = Interpreter::new(&compiled);
        assert_eq!(
            interp.call("p_1_negation_subproof", &[]).unwrap(),
            Some(vec![expected])
        );
    }
}

#[test]
fn test_aggregate_constraint_fails_provenance_compilation() {
    logging::init_test_subscriber();
    // p(n) :- n = count : { q(y) }.
    let mut program = Program::new();
    program.add_relation(unary("q"));
    program.add_relation(unary("p"));
    let count = Argument::Aggregator(Box::new(Aggregator {
        op: AggregateOp::Count,
        target: None,
        body: vec![pos("q", &["y"])],
    }));
    program.add_clause(Clause::new(
        atom("p", &["n"]),
        vec![Literal::Constraint(Constraint::Binary {
            op: BinaryConstraintOp::Eq,
            lhs: Argument::var("n"),
            rhs: count,
        })],
    ));

    let result = Compiler::new()
        .with_strategy(TranslationStrategy::Provenance)
        .compile(&program);
    assert!(matches!(
        result,
        Err(CompileError::Translation(TranslationError::UnboundAggregate(_)))
    ));
    assert!(Compiler::new()
        .with_strategy(TranslationStrategy::Seminaive)
        .compile(&program)
        .is_ok());
}
