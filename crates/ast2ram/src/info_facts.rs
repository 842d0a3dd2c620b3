//! Clause metadata for explanations
//!
//! Every rule gets an info relation holding a single fact that describes the
//! rule's shape: its number, its head arguments and one entry per body atom
//! or negation. `reach(x,y) :- edge(x,z), reach(z,y).` is described as
//! `(1, "x,y", "edge,x,z", "reach,z,y")`.

use crate::builder::ProgramBuilder;
use crate::context::TranslatorContext;
use crate::error::{TranslationError, TranslationResult};
use datalog_ast::{Argument, Clause, ClauseId, Literal, QualifiedName};
use ram::{Operation, Representation, StmtId};
use tracing::trace;

/// Textual description of one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoFact {
    pub clause_num: usize,
    pub head: String,
    pub literals: Vec<String>,
}

/// Names arguments in descriptions. Functor and aggregate counters run
/// across the whole clause, head first.
#[derive(Debug, Default)]
struct ArgumentDescriber {
    functors: usize,
    aggregates: usize,
}

impl ArgumentDescriber {
    fn describe(&mut self, arg: &Argument) -> TranslationResult<String> {
        Ok(match arg {
            Argument::Variable(name) => name.to_string(),
            Argument::Constant(constant) => constant.to_string(),
            Argument::UnnamedVariable => "_".to_string(),
            Argument::IntrinsicFunctor { .. } | Argument::UserDefinedFunctor { .. } => {
                let name = format!("functor_{}", self.functors);
                self.functors += 1;
                name
            }
            Argument::Aggregator(_) => {
                let name = format!("agg_{}", self.aggregates);
                self.aggregates += 1;
                name
            }
            Argument::RecordInit(_) | Argument::Counter => {
                return Err(TranslationError::UnhandledArgument(arg.to_string()))
            }
        })
    }
}

pub fn describe_clause(clause: &Clause, clause_num: usize) -> TranslationResult<InfoFact> {
    let mut describer = ArgumentDescriber::default();

    let head = clause
        .head
        .args
        .iter()
        .map(|arg| describer.describe(arg))
        .collect::<TranslationResult<Vec<_>>>()?
        .join(",");

    let mut literals = Vec::new();
    for literal in &clause.body {
        match literal {
            Literal::Atom(atom) => {
                let mut description = atom.name.to_string();
                for arg in &atom.args {
                    description.push(',');
                    description.push_str(&describer.describe(arg)?);
                }
                literals.push(description);
            }
            Literal::Negation(atom) => literals.push(format!("!{}", atom.name)),
            Literal::Constraint(_) => {}
        }
    }

    Ok(InfoFact {
        clause_num,
        head,
        literals,
    })
}

/// `path` clause 1 is described in `path.@info.1`
pub fn info_relation_name(head: &QualifiedName, clause_num: usize) -> QualifiedName {
    let mut name = head.clone();
    name.append("@info");
    name.append(clause_num.to_string());
    name
}

/// True for relations holding clause metadata, which get no subproofs
pub fn is_info_relation(name: &QualifiedName) -> bool {
    name.first().is_some_and(|first| first.starts_with("info"))
        || name.segments().iter().any(|s| s.as_str() == "@info")
}

/// Declare the info relation of rule `id` and return the query inserting
/// its fact
pub fn generate_info_clause(
    ctx: &TranslatorContext<'_>,
    out: &mut ProgramBuilder,
    id: ClauseId,
) -> TranslationResult<StmtId> {
    let clause = ctx.clause(id);
    let fact = describe_clause(clause, ctx.clause_num(id)?)?;
    let name = info_relation_name(&clause.head.name, fact.clause_num).to_string();
    trace!(relation = %name, "generating info fact");

    let mut attribute_names = vec!["clause_num".to_string(), "head_vars".to_string()];
    let mut attribute_types = vec!["i:number".to_string(), "s:symbol".to_string()];
    for i in 0..fact.literals.len() {
        attribute_names.push(format!("rel_{}", i));
        attribute_types.push("s:symbol".to_string());
    }
    let aux = ctx.auxiliary_arity();
    if aux > 0 {
        attribute_names.push(crate::strategy::RULE_NUMBER_ATTRIBUTE.to_string());
        attribute_names.push(crate::strategy::LEVEL_NUMBER_ATTRIBUTE.to_string());
        attribute_types.extend(["i:number".to_string(), "i:number".to_string()]);
    }
    out.declare(ram::Relation {
        name: name.clone(),
        arity: attribute_names.len(),
        auxiliary_arity: aux,
        attribute_names,
        attribute_types,
        representation: Representation::Info,
    });

    let mut values = vec![out.arena.signed(fact.clause_num as i64)];
    let head = out.symbols.encode(&fact.head);
    values.push(out.arena.signed(head));
    for literal in &fact.literals {
        let encoded = out.symbols.encode(literal);
        values.push(out.arena.signed(encoded));
    }
    for _ in 0..aux {
        values.push(out.arena.signed(0));
    }
    let project = out.arena.op(Operation::Project {
        relation: name,
        values,
    });
    Ok(out.arena.query(project))
}
