//! Program-level declarations: relations, attributes and types

use crate::ast::{sym, Clause, QualifiedName, Symbol};

/// Index of a clause within [`Program::clauses`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClauseId(pub usize);

/// A validated program: type declarations, relation declarations and clauses
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub types: Vec<TypeDecl>,
    pub relations: Vec<Relation>,
    pub clauses: Vec<Clause>,
}

/// A declared relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: QualifiedName,
    pub attributes: Vec<Attribute>,
    pub representation: RelationRepresentation,
    pub qualifiers: Vec<RelationQualifier>,
}

/// A named, typed relation column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Symbol,
    pub type_name: QualifiedName,
}

/// Physical representation requested for a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RelationRepresentation {
    #[default]
    Default,
    Btree,
    Brie,
    Eqrel,
    /// Clause metadata relation used for explanations
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationQualifier {
    Input,
    Output,
    /// Relation generated for an eqrel or poset type
    Type,
}

/// User type declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDecl {
    /// `.type Age <: number`
    Subset {
        name: QualifiedName,
        base: QualifiedName,
    },
    /// `.type Id = symbol`
    Alias {
        name: QualifiedName,
        alias: QualifiedName,
    },
    /// `.type Node = A | B`
    Union {
        name: QualifiedName,
        types: Vec<QualifiedName>,
    },
    /// `.type Pair = [a: number, b: number]`
    Record {
        name: QualifiedName,
        fields: Vec<Attribute>,
    },
    /// `.type Same = eqrel Node`
    Eqrel {
        name: QualifiedName,
        base: QualifiedName,
    },
    /// `.type Below = poset Node`
    Poset {
        name: QualifiedName,
        base: QualifiedName,
    },
}

impl TypeDecl {
    pub fn name(&self) -> &QualifiedName {
        match self {
            TypeDecl::Subset { name, .. }
            | TypeDecl::Alias { name, .. }
            | TypeDecl::Union { name, .. }
            | TypeDecl::Record { name, .. }
            | TypeDecl::Eqrel { name, .. }
            | TypeDecl::Poset { name, .. } => name,
        }
    }
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, decl: TypeDecl) {
        self.types.push(decl);
    }

    pub fn add_relation(&mut self, relation: Relation) {
        self.relations.push(relation);
    }

    pub fn add_clause(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// Look up a relation declaration by name
    pub fn relation(&self, name: &QualifiedName) -> Option<&Relation> {
        self.relations.iter().find(|r| &r.name == name)
    }

    pub fn clause(&self, id: ClauseId) -> &Clause {
        &self.clauses[id.0]
    }

    /// All clauses with their ids, in declaration order
    pub fn clauses_with_ids(&self) -> impl Iterator<Item = (ClauseId, &Clause)> {
        self.clauses.iter().enumerate().map(|(i, c)| (ClauseId(i), c))
    }

    /// Clauses defining `name`, in declaration order
    pub fn clauses_of<'a>(
        &'a self,
        name: &'a QualifiedName,
    ) -> impl Iterator<Item = (ClauseId, &'a Clause)> + 'a {
        self.clauses_with_ids()
            .filter(move |(_, c)| &c.head.name == name)
    }
}

impl Relation {
    pub fn new(name: &str) -> Self {
        Relation {
            name: QualifiedName::new(name),
            attributes: Vec::new(),
            representation: RelationRepresentation::Default,
            qualifiers: Vec::new(),
        }
    }

    /// Builder: add an attribute `name: type_name`
    pub fn with_attribute(mut self, name: &str, type_name: &str) -> Self {
        self.attributes.push(Attribute::new(name, type_name));
        self
    }

    pub fn with_representation(mut self, representation: RelationRepresentation) -> Self {
        self.representation = representation;
        self
    }

    pub fn with_qualifier(mut self, qualifier: RelationQualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    pub fn has_qualifier(&self, qualifier: RelationQualifier) -> bool {
        self.qualifiers.contains(&qualifier)
    }
}

impl Attribute {
    pub fn new(name: &str, type_name: &str) -> Self {
        Attribute {
            name: sym(name),
            type_name: QualifiedName::new(type_name),
        }
    }
}
