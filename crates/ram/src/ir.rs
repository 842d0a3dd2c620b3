//! IR node types
//!
//! These are the nodes stored in an [`Arena`](crate::Arena). Nodes never own
//! other nodes directly; they refer to their children by typed index, which
//! keeps every subtree addressable for in-place rewriting and explicit deep
//! copies.
//!
//! The IR is split into four layers:
//! - **Expression**: values (constants, tuple elements, subroutine arguments)
//! - **Condition**: boolean tests over expressions and relations
//! - **Operation**: the nested loop body of a query
//! - **Statement**: imperative control flow around queries

use serde::Serialize;

/// Value domain of the abstract machine
pub type RamDomain = i64;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Index of an [`Expression`] in the arena
    ExprId
);
define_id!(
    /// Index of a [`Condition`] in the arena
    CondId
);
define_id!(
    /// Index of an [`Operation`] in the arena
    OpId
);
define_id!(
    /// Index of a [`Statement`] in the arena
    StmtId
);

/// An expression producing a single value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    SignedConstant(RamDomain),
    UnsignedConstant(u64),
    FloatConstant(f64),
    /// Element `element` of the tuple bound to `tuple` by an enclosing scan
    TupleElement { tuple: usize, element: usize },
    /// Argument `index` of the enclosing subroutine
    SubroutineArgument(usize),
    /// Wildcard: matches any value in an existence check
    UndefValue,
    IntrinsicOperator { op: IntrinsicOp, args: Vec<ExprId> },
    UserDefinedOperator { name: String, args: Vec<ExprId> },
    PackRecord(Vec<ExprId>),
    AutoIncrement,
}

/// Built-in operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IntrinsicOp {
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

/// Comparison operators of binary constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AggregateFunction {
    Count,
    Sum,
    Min,
    Max,
    Mean,
}

/// Boolean conditions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    True,
    False,
    Conjunction(CondId, CondId),
    Negation(CondId),
    Constraint {
        op: ConstraintOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    /// Does `relation` hold a row matching `values` (undefined values match anything)?
    ExistenceCheck {
        relation: String,
        values: Vec<ExprId>,
    },
    EmptinessCheck {
        relation: String,
    },
}

/// Nested query operations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Operation {
    /// Bind every row of `relation` to `tuple` in turn
    Scan {
        relation: String,
        tuple: usize,
        nested: OpId,
    },
    Filter {
        condition: CondId,
        nested: OpId,
    },
    /// Fold `function` over the rows of `relation` satisfying `condition`;
    /// the result is bound to element 0 of `tuple`
    Aggregate {
        relation: String,
        tuple: usize,
        function: AggregateFunction,
        expression: Option<ExprId>,
        condition: CondId,
        nested: OpId,
    },
    /// Insert a row into `relation`
    Project {
        relation: String,
        values: Vec<ExprId>,
    },
    /// Leave the enclosing subroutine with `values`
    SubroutineReturn {
        values: Vec<ExprId>,
    },
}

/// Imperative statements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Sequence(Vec<StmtId>),
    Query(OpId),
    Loop(StmtId),
    /// Leave the innermost loop when the condition holds
    Exit(CondId),
    Clear(String),
    Swap(String, String),
    MergeExtend {
        source: String,
        target: String,
    },
    DebugInfo {
        message: String,
        statement: StmtId,
    },
}

impl Expression {
    /// Child expressions, in argument order
    pub fn children(&self) -> &[ExprId] {
        match self {
            Expression::IntrinsicOperator { args, .. }
            | Expression::UserDefinedOperator { args, .. }
            | Expression::PackRecord(args) => args,
            _ => &[],
        }
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, Expression::UndefValue)
    }
}

impl IntrinsicOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            IntrinsicOp::Add => "+",
            IntrinsicOp::Sub => "-",
            IntrinsicOp::Mul => "*",
            IntrinsicOp::Div => "/",
            IntrinsicOp::Mod => "%",
            IntrinsicOp::Neg => "-",
            IntrinsicOp::Max => "max",
            IntrinsicOp::Min => "min",
            IntrinsicOp::Cat => "cat",
            IntrinsicOp::StrLen => "strlen",
        }
    }

    pub fn is_infix(&self) -> bool {
        matches!(
            self,
            IntrinsicOp::Add | IntrinsicOp::Sub | IntrinsicOp::Mul | IntrinsicOp::Div | IntrinsicOp::Mod
        )
    }
}

impl ConstraintOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ConstraintOp::Eq => "=",
            ConstraintOp::Ne => "!=",
            ConstraintOp::Lt => "<",
            ConstraintOp::Le => "<=",
            ConstraintOp::Gt => ">",
            ConstraintOp::Ge => ">=",
        }
    }

    pub fn holds(&self, lhs: RamDomain, rhs: RamDomain) -> bool {
        match self {
            ConstraintOp::Eq => lhs == rhs,
            ConstraintOp::Ne => lhs != rhs,
            ConstraintOp::Lt => lhs < rhs,
            ConstraintOp::Le => lhs <= rhs,
            ConstraintOp::Gt => lhs > rhs,
            ConstraintOp::Ge => lhs >= rhs,
        }
    }
}

impl AggregateFunction {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Mean => "MEAN",
        }
    }
}
