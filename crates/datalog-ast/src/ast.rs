//! Clause-level syntax tree definitions
//!
//! This module defines the structures the backend reads from a validated
//! program: clauses, atoms, literals and arguments.
//!
//! # Key Components
//!
//! - **Clause**: A head atom with an ordered body (`path(x, y) :- edge(x, y).`)
//! - **Literal**: Positive atom, negated atom, or constraint
//! - **Argument**: Variables, constants, functors, aggregators, records
//! - **QualifiedName**: Dotted relation / type names (`graph.edge`)
//!
//! # Reserved Variable Names
//!
//! Upstream passes rename anonymous positions to variables prefixed with
//! [`UNDERSCORE_PREFIX`] and synthesize derivation-level variables prefixed
//! with [`LEVEL_PREFIX`]. Neither is ever written by a user.

use internment::Intern;
use std::fmt;

/// Interned string for efficient storage and comparison
pub type Symbol = Intern<String>;

/// Prefix of variables that were named from an anonymous position
pub const UNDERSCORE_PREFIX: &str = "+underscore";

/// Prefix of synthesized derivation-level variables
pub const LEVEL_PREFIX: &str = "@level_num";

/// Intern a string as a [`Symbol`]
pub fn sym(name: &str) -> Symbol {
    Intern::new(name.to_string())
}

/// A dotted name: `graph.edge`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    segments: Vec<Symbol>,
}

impl QualifiedName {
    /// Parse a dotted name into its segments
    pub fn new(name: &str) -> Self {
        QualifiedName {
            segments: name.split('.').map(sym).collect(),
        }
    }

    pub fn from_segments(segments: Vec<Symbol>) -> Self {
        QualifiedName { segments }
    }

    /// Append one more segment
    pub fn append(&mut self, segment: impl Into<String>) {
        self.segments.push(Intern::new(segment.into()));
    }

    pub fn segments(&self) -> &[Symbol] {
        &self.segments
    }

    /// First segment of the name, used for prefix tests
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(|s| s.as_str())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        QualifiedName::new(name)
    }
}

/// A clause: `head :- body.` A clause with an empty body is a fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    pub head: Atom,
    pub body: Vec<Literal>,
}

/// A literal is a positive atom, a negated atom, or a constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Positive atom: `edge(x, y)`
    Atom(Atom),
    /// Negated atom: `!edge(x, y)`
    Negation(Atom),
    /// Constraint: `x < y`, `true`
    Constraint(Constraint),
}

/// Constraint literals
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// Binary comparison between two arguments
    Binary {
        op: BinaryConstraintOp,
        lhs: Argument,
        rhs: Argument,
    },
    /// `true` / `false`
    Boolean(bool),
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryConstraintOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// An atom is a relation applied to arguments: `edge(x, y)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub name: QualifiedName,
    pub args: Vec<Argument>,
}

/// Arguments appearing in atoms, constraints and functors
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Argument {
    /// Named variable: `x`
    Variable(Symbol),
    /// Anonymous position: `_`
    UnnamedVariable,
    /// Constant value
    Constant(Constant),
    /// Built-in functor: `x + 1`, `cat(a, b)`
    IntrinsicFunctor { op: FunctorOp, args: Vec<Argument> },
    /// User-defined functor: `@hash(x)`
    UserDefinedFunctor { name: Symbol, args: Vec<Argument> },
    /// Aggregate expression: `count : { edge(x, _) }`
    Aggregator(Box<Aggregator>),
    /// Record constructor: `[x, y]`
    RecordInit(Vec<Argument>),
    /// Auto-increment counter: `$`
    Counter,
}

/// An aggregate over a sub-body
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Aggregator {
    pub op: AggregateOp,
    /// Aggregated expression (absent for `count`)
    pub target: Option<Argument>,
    pub body: Vec<Literal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    Count,
    Sum,
    Min,
    Max,
    Mean,
}

/// Built-in functor operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctorOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Max,
    Min,
    Cat,
    StrLen,
}

/// Constant values
#[derive(Debug, Clone)]
pub enum Constant {
    Number(i64),
    Unsigned(u64),
    Float(f64),
    String(Symbol),
    Nil,
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Constant::Number(a), Constant::Number(b)) => a == b,
            (Constant::Unsigned(a), Constant::Unsigned(b)) => a == b,
            (Constant::Float(a), Constant::Float(b)) => a.to_bits() == b.to_bits(),
            (Constant::String(a), Constant::String(b)) => a == b,
            (Constant::Nil, Constant::Nil) => true,
            _ => false,
        }
    }
}

impl Eq for Constant {}

impl std::hash::Hash for Constant {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Constant::Number(n) => {
                0u8.hash(state);
                n.hash(state);
            }
            Constant::Unsigned(u) => {
                1u8.hash(state);
                u.hash(state);
            }
            Constant::Float(f) => {
                2u8.hash(state);
                f.to_bits().hash(state);
            }
            Constant::String(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            Constant::Nil => 4u8.hash(state),
        }
    }
}

impl Clause {
    pub fn new(head: Atom, body: Vec<Literal>) -> Self {
        Clause { head, body }
    }

    /// Create a fact (clause with an empty body)
    pub fn fact(head: Atom) -> Self {
        Clause {
            head,
            body: Vec::new(),
        }
    }

    pub fn is_fact(&self) -> bool {
        self.body.is_empty()
    }

    /// Positive body atoms, in body order
    pub fn body_atoms(&self) -> impl Iterator<Item = &Atom> {
        self.body.iter().filter_map(|lit| match lit {
            Literal::Atom(atom) => Some(atom),
            _ => None,
        })
    }

    /// Negated body atoms, in body order
    pub fn body_negations(&self) -> impl Iterator<Item = &Atom> {
        self.body.iter().filter_map(|lit| match lit {
            Literal::Negation(atom) => Some(atom),
            _ => None,
        })
    }

    /// Constraint body literals, in body order
    pub fn body_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.body.iter().filter_map(|lit| match lit {
            Literal::Constraint(c) => Some(c),
            _ => None,
        })
    }
}

impl Literal {
    /// Get the underlying atom from a literal (None for constraints)
    pub fn atom(&self) -> Option<&Atom> {
        match self {
            Literal::Atom(atom) | Literal::Negation(atom) => Some(atom),
            Literal::Constraint(_) => None,
        }
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, Literal::Constraint(_))
    }

    /// Visit every variable in this literal, depth-first, in argument order
    pub fn for_each_variable(&self, f: &mut impl FnMut(Symbol)) {
        match self {
            Literal::Atom(atom) | Literal::Negation(atom) => atom.for_each_variable(f),
            Literal::Constraint(Constraint::Binary { lhs, rhs, .. }) => {
                lhs.for_each_variable(f);
                rhs.for_each_variable(f);
            }
            Literal::Constraint(Constraint::Boolean(_)) => {}
        }
    }
}

impl Atom {
    /// Create a new atom with the given relation name and arguments
    pub fn new(name: &str, args: Vec<Argument>) -> Self {
        Atom {
            name: QualifiedName::new(name),
            args,
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn for_each_variable(&self, f: &mut impl FnMut(Symbol)) {
        for arg in &self.args {
            arg.for_each_variable(f);
        }
    }
}

impl Argument {
    /// Shorthand for a named variable
    pub fn var(name: &str) -> Self {
        Argument::Variable(sym(name))
    }

    pub fn number(n: i64) -> Self {
        Argument::Constant(Constant::Number(n))
    }

    pub fn string(s: &str) -> Self {
        Argument::Constant(Constant::String(sym(s)))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Argument::Variable(_))
    }

    /// Visit every variable in this argument, depth-first
    pub fn for_each_variable(&self, f: &mut impl FnMut(Symbol)) {
        match self {
            Argument::Variable(name) => f(*name),
            Argument::IntrinsicFunctor { args, .. }
            | Argument::UserDefinedFunctor { args, .. }
            | Argument::RecordInit(args) => {
                for arg in args {
                    arg.for_each_variable(f);
                }
            }
            Argument::Aggregator(agg) => {
                if let Some(target) = &agg.target {
                    target.for_each_variable(f);
                }
                for lit in &agg.body {
                    lit.for_each_variable(f);
                }
            }
            Argument::UnnamedVariable | Argument::Constant(_) | Argument::Counter => {}
        }
    }
}

/// True when `name` was synthesized for an anonymous position
pub fn is_underscore_variable(name: &str) -> bool {
    name.starts_with(UNDERSCORE_PREFIX)
}

/// True when `name` is a synthesized derivation-level variable
pub fn is_level_variable(name: &str) -> bool {
    name.starts_with(LEVEL_PREFIX)
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        if !self.body.is_empty() {
            write!(f, " :- ")?;
            write_joined(f, &self.body, ", ")?;
        }
        write!(f, ".")
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Atom(atom) => write!(f, "{}", atom),
            Literal::Negation(atom) => write!(f, "!{}", atom),
            Literal::Constraint(c) => write!(f, "{}", c),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Binary { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op, rhs),
            Constraint::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl fmt::Display for BinaryConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryConstraintOp::Eq => "=",
            BinaryConstraintOp::Ne => "!=",
            BinaryConstraintOp::Lt => "<",
            BinaryConstraintOp::Le => "<=",
            BinaryConstraintOp::Gt => ">",
            BinaryConstraintOp::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        write_joined(f, &self.args, ",")?;
        write!(f, ")")
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Variable(name) => write!(f, "{}", name),
            Argument::UnnamedVariable => write!(f, "_"),
            Argument::Constant(c) => write!(f, "{}", c),
            Argument::IntrinsicFunctor { op, args } => match (op.infix_symbol(), args.as_slice()) {
                (Some(symbol), [lhs, rhs]) => write!(f, "({}{}{})", lhs, symbol, rhs),
                _ => {
                    write!(f, "{}(", op.name())?;
                    write_joined(f, args, ",")?;
                    write!(f, ")")
                }
            },
            Argument::UserDefinedFunctor { name, args } => {
                write!(f, "@{}(", name)?;
                write_joined(f, args, ",")?;
                write!(f, ")")
            }
            Argument::Aggregator(agg) => {
                write!(f, "{}", agg.op.name())?;
                if let Some(target) = &agg.target {
                    write!(f, " {}", target)?;
                }
                write!(f, " : {{ ")?;
                write_joined(f, &agg.body, ", ")?;
                write!(f, " }}")
            }
            Argument::RecordInit(args) => {
                write!(f, "[")?;
                write_joined(f, args, ",")?;
                write!(f, "]")
            }
            Argument::Counter => write!(f, "$"),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Number(n) => write!(f, "{}", n),
            Constant::Unsigned(u) => write!(f, "{}", u),
            Constant::Float(x) => write!(f, "{}", x),
            Constant::String(s) => write!(f, "\"{}\"", s),
            Constant::Nil => write!(f, "nil"),
        }
    }
}

impl FunctorOp {
    pub fn name(&self) -> &'static str {
        match self {
            FunctorOp::Add => "add",
            FunctorOp::Sub => "sub",
            FunctorOp::Mul => "mul",
            FunctorOp::Div => "div",
            FunctorOp::Mod => "mod",
            FunctorOp::Neg => "neg",
            FunctorOp::Max => "max",
            FunctorOp::Min => "min",
            FunctorOp::Cat => "cat",
            FunctorOp::StrLen => "strlen",
        }
    }

    fn infix_symbol(&self) -> Option<&'static str> {
        match self {
            FunctorOp::Add => Some("+"),
            FunctorOp::Sub => Some("-"),
            FunctorOp::Mul => Some("*"),
            FunctorOp::Div => Some("/"),
            FunctorOp::Mod => Some("%"),
            _ => None,
        }
    }
}

impl AggregateOp {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateOp::Count => "count",
            AggregateOp::Sum => "sum",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
            AggregateOp::Mean => "mean",
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
