//! Type environment
//!
//! Resolves every declared type to the primitive kind it is represented by,
//! which is all the backend needs: attribute type qualifiers of the form
//! `<kind>:<type name>` (`i:number`, `s:Name`, `r:Pair`).

use datalog_ast::{QualifiedName, TypeDecl};
use std::collections::HashMap;
use thiserror::Error;

/// Primitive representation of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Signed,
    Unsigned,
    Float,
    Symbol,
    Record,
}

impl TypeKind {
    pub fn qualifier_prefix(&self) -> char {
        match self {
            TypeKind::Signed => 'i',
            TypeKind::Unsigned => 'u',
            TypeKind::Float => 'f',
            TypeKind::Symbol => 's',
            TypeKind::Record => 'r',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("undeclared type '{0}'")]
    Undeclared(String),
    #[error("type '{0}' is defined in terms of itself")]
    Cyclic(String),
    #[error("union type '{0}' mixes different primitive kinds")]
    MixedUnion(String),
}

/// Kinds of all primitive and declared types
#[derive(Debug, Clone)]
pub struct TypeEnvironment {
    kinds: HashMap<String, TypeKind>,
}

impl TypeEnvironment {
    /// Resolve the given declarations on top of the primitive types
    pub fn new(decls: &[TypeDecl]) -> Result<Self, TypeError> {
        let by_name: HashMap<String, &TypeDecl> =
            decls.iter().map(|d| (d.name().to_string(), d)).collect();

        let mut resolver = Resolver {
            decls: &by_name,
            kinds: primitive_kinds(),
            in_progress: Vec::new(),
        };
        for decl in decls {
            resolver.resolve(decl.name())?;
        }

        Ok(TypeEnvironment {
            kinds: resolver.kinds,
        })
    }

    pub fn kind(&self, name: &QualifiedName) -> Option<TypeKind> {
        self.kinds.get(&name.to_string()).copied()
    }

    /// Qualifier string for an attribute of type `name`, e.g. `i:number`
    pub fn type_qualifier(&self, name: &QualifiedName) -> Result<String, TypeError> {
        let kind = self
            .kind(name)
            .ok_or_else(|| TypeError::Undeclared(name.to_string()))?;
        Ok(format!("{}:{}", kind.qualifier_prefix(), name))
    }
}

impl Default for TypeEnvironment {
    fn default() -> Self {
        TypeEnvironment {
            kinds: primitive_kinds(),
        }
    }
}

fn primitive_kinds() -> HashMap<String, TypeKind> {
    [
        ("number", TypeKind::Signed),
        ("unsigned", TypeKind::Unsigned),
        ("float", TypeKind::Float),
        ("symbol", TypeKind::Symbol),
    ]
    .into_iter()
    .map(|(n, k)| (n.to_string(), k))
    .collect()
}

struct Resolver<'a> {
    decls: &'a HashMap<String, &'a TypeDecl>,
    kinds: HashMap<String, TypeKind>,
    in_progress: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, name: &QualifiedName) -> Result<TypeKind, TypeError> {
        let key = name.to_string();
        if let Some(kind) = self.kinds.get(&key) {
            return Ok(*kind);
        }
        if self.in_progress.contains(&key) {
            return Err(TypeError::Cyclic(key));
        }
        let decl = *self
            .decls
            .get(&key)
            .ok_or_else(|| TypeError::Undeclared(key.clone()))?;

        self.in_progress.push(key.clone());
        let kind = match decl {
            TypeDecl::Subset { base, .. }
            | TypeDecl::Eqrel { base, .. }
            | TypeDecl::Poset { base, .. } => self.resolve(base)?,
            TypeDecl::Alias { alias, .. } => self.resolve(alias)?,
            TypeDecl::Record { .. } => TypeKind::Record,
            TypeDecl::Union { types, .. } => {
                let mut kind = None;
                for member in types {
                    let member_kind = self.resolve(member)?;
                    match kind {
                        None => kind = Some(member_kind),
                        Some(k) if k == member_kind => {}
                        Some(_) => return Err(TypeError::MixedUnion(key.clone())),
                    }
                }
                kind.ok_or_else(|| TypeError::MixedUnion(key.clone()))?
            }
        };
        self.in_progress.pop();

        self.kinds.insert(key, kind);
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> QualifiedName {
        QualifiedName::new(s)
    }

    #[test]
    fn test_primitive_qualifiers() {
        let env = TypeEnvironment::default();
        assert_eq!(env.type_qualifier(&name("number")).unwrap(), "i:number");
        assert_eq!(env.type_qualifier(&name("symbol")).unwrap(), "s:symbol");
    }

    #[test]
    fn test_declared_types_resolve_to_base_kind() {
        let env = TypeEnvironment::new(&[
            TypeDecl::Subset {
                name: name("Age"),
                base: name("unsigned"),
            },
            TypeDecl::Alias {
                name: name("Years"),
                alias: name("Age"),
            },
            TypeDecl::Eqrel {
                name: name("Same"),
                base: name("symbol"),
            },
            TypeDecl::Record {
                name: name("Pair"),
                fields: vec![],
            },
        ])
        .unwrap();

        assert_eq!(env.type_qualifier(&name("Years")).unwrap(), "u:Years");
        assert_eq!(env.type_qualifier(&name("Same")).unwrap(), "s:Same");
        assert_eq!(env.type_qualifier(&name("Pair")).unwrap(), "r:Pair");
    }

    #[test]
    fn test_cyclic_and_mixed_types_are_rejected() {
        let cyclic = TypeEnvironment::new(&[
            TypeDecl::Alias {
                name: name("A"),
                alias: name("B"),
            },
            TypeDecl::Alias {
                name: name("B"),
                alias: name("A"),
            },
        ]);
        assert!(matches!(cyclic, Err(TypeError::Cyclic(_))));

        let mixed = TypeEnvironment::new(&[TypeDecl::Union {
            name: name("U"),
            types: vec![name("number"), name("symbol")],
        }]);
        assert_eq!(mixed.unwrap_err(), TypeError::MixedUnion("U".to_string()));
    }

    #[test]
    fn test_undeclared_attribute_type() {
        let env = TypeEnvironment::default();
        assert_eq!(
            env.type_qualifier(&name("Missing")),
            Err(TypeError::Undeclared("Missing".to_string()))
        );
    }
}
