//! Relation declarations under both strategies

use crate::programs::{compile, path_program};
use ast2ram::{TranslationStrategy, LEVEL_NUMBER_ATTRIBUTE, RULE_NUMBER_ATTRIBUTE};
use ram::Representation;

#[test]
fn test_provenance_appends_two_columns() {
    let program = path_program(&[(1, 2)]);
    let compiled = compile(&program, TranslationStrategy::Provenance);

    for declared in &program.relations {
        let relation = compiled.relation(&declared.name.to_string()).unwrap();
        assert_eq!(relation.arity, declared.arity() + 2);
        assert_eq!(relation.auxiliary_arity, 2);
        assert_eq!(relation.logical_arity(), declared.arity());
        assert_eq!(
            &relation.attribute_names[declared.arity()..],
            &[RULE_NUMBER_ATTRIBUTE, LEVEL_NUMBER_ATTRIBUTE]
        );
        assert_eq!(
            &relation.attribute_types[declared.arity()..],
            &["i:number", "i:number"]
        );
    }
}

#[test]
fn test_versions_share_the_layout() {
    let compiled = compile(&path_program(&[]), TranslationStrategy::Provenance);
    let path = compiled.relation("path").unwrap();
    for name in ["@delta_path", "@new_path"] {
        let version = compiled.relation(name).unwrap();
        assert_eq!(version.attribute_names, path.attribute_names);
        assert_eq!(version.attribute_types, path.attribute_types);
    }
}

#[test]
fn test_seminaive_keeps_declared_schema() {
    let compiled = compile(&path_program(&[]), TranslationStrategy::Seminaive);
    let path = compiled.relation("path").unwrap();
    assert_eq!(path.attribute_names, vec!["src", "dst"]);
    assert_eq!(path.attribute_types, vec!["i:number", "i:number"]);
    assert_eq!(path.auxiliary_arity, 0);
}

#[test]
fn test_info_relations_are_declared_per_rule() {
    let compiled = compile(&path_program(&[(1, 2)]), TranslationStrategy::Provenance);
    let info: Vec<&str> = compiled
        .relations
        .iter()
        .filter(|r| r.representation == Representation::Info)
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(info, vec!["path.@info.1", "path.@info.2"]);
}

#[test]
fn test_expired_relations_are_never_cleared_under_provenance() {
    let program = path_program(&[(1, 2)]);
    let seminaive = compile(&program, TranslationStrategy::Seminaive).to_string();
    let provenance = compile(&program, TranslationStrategy::Provenance).to_string();

    assert!(seminaive.contains("CLEAR edge"));
    assert!(!provenance.contains("CLEAR edge"));
}

#[test]
fn test_json_dump_carries_bookkeeping_columns() {
    let compiled = compile(&path_program(&[(1, 2)]), TranslationStrategy::Provenance);
    let json: serde_json::Value = serde_json::from_str(&compiled.to_json().unwrap()).unwrap();
    let relations = json["relations"].as_array().unwrap();
    let path = relations.iter().find(|r| r["name"] == "path").unwrap();
    assert_eq!(path["auxiliary_arity"], 2);
    assert_eq!(path["attribute_names"][2], RULE_NUMBER_ATTRIBUTE);
}
