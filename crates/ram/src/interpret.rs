//! Reference interpreter
//!
//! A direct tree-walking evaluator over the arena. It is not meant to be
//! fast; it exists so that compiled programs and their subroutines can be
//! executed in tests. Relations are kept as ordered sets of tuples.

use crate::ir::{
    AggregateFunction, CondId, Condition, ExprId, Expression, IntrinsicOp, OpId, Operation,
    RamDomain, StmtId, Statement,
};
use crate::program::Program;
use crate::symbol_table::SymbolTable;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

pub type Tuple = Vec<RamDomain>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    #[error("unknown subroutine '{0}'")]
    UnknownSubroutine(String),
    #[error("subroutine '{name}' expects {expected} arguments, got {actual}")]
    ArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("subroutine argument {0} is out of range")]
    UnknownArgument(usize),
    #[error("tuple t{0} is not bound")]
    UnboundTuple(usize),
    #[error("tuple t{tuple} has no element {element}")]
    MissingElement { tuple: usize, element: usize },
    #[error("undefined value used outside an existence check")]
    UndefinedValue,
    #[error("division by zero")]
    DivisionByZero,
    #[error("symbol ordinal {0} is not interned")]
    UnknownSymbol(RamDomain),
    #[error("cannot evaluate {0}")]
    Unsupported(String),
}

pub type InterpretResult<T> = Result<T, InterpretError>;

/// Contents of every relation touched by a program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationStore {
    relations: HashMap<String, BTreeSet<Tuple>>,
}

impl RelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tuple, returning whether it was new
    pub fn insert(&mut self, relation: &str, tuple: Tuple) -> bool {
        self.relations
            .entry(relation.to_string())
            .or_default()
            .insert(tuple)
    }

    pub fn contains(&self, relation: &str, tuple: &[RamDomain]) -> bool {
        self.relations
            .get(relation)
            .is_some_and(|rows| rows.contains(tuple))
    }

    /// Does any row match `pattern`, where `None` matches anything?
    pub fn matches(&self, relation: &str, pattern: &[Option<RamDomain>]) -> bool {
        self.relations.get(relation).is_some_and(|rows| {
            rows.iter().any(|row| {
                row.len() == pattern.len()
                    && row
                        .iter()
                        .zip(pattern)
                        .all(|(value, p)| p.map_or(true, |p| p == *value))
            })
        })
    }

    pub fn tuples(&self, relation: &str) -> impl Iterator<Item = &Tuple> {
        self.relations.get(relation).into_iter().flatten()
    }

    pub fn len(&self, relation: &str) -> usize {
        self.relations.get(relation).map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self, relation: &str) -> bool {
        self.len(relation) == 0
    }

    pub fn clear(&mut self, relation: &str) {
        self.relations.remove(relation);
    }

    pub fn swap(&mut self, a: &str, b: &str) {
        let first = self.relations.remove(a).unwrap_or_default();
        let second = self.relations.remove(b).unwrap_or_default();
        self.relations.insert(a.to_string(), second);
        self.relations.insert(b.to_string(), first);
    }

    /// Copy every tuple of `source` into `target`
    pub fn merge(&mut self, source: &str, target: &str) {
        let rows: Vec<Tuple> = self.tuples(source).cloned().collect();
        let dest = self.relations.entry(target.to_string()).or_default();
        dest.extend(rows);
    }
}

/// Outcome of executing a node
enum Flow {
    Continue,
    Exit,
    Return(Tuple),
}

/// Bindings visible while evaluating a query
struct Env<'a> {
    tuples: Vec<Option<Tuple>>,
    args: &'a [RamDomain],
}

impl Env<'_> {
    fn bind(&mut self, tuple: usize, row: Tuple) {
        if self.tuples.len() <= tuple {
            self.tuples.resize(tuple + 1, None);
        }
        self.tuples[tuple] = Some(row);
    }
}

pub struct Interpreter<'p> {
    program: &'p Program,
    store: RelationStore,
    symbols: SymbolTable,
    counter: RamDomain,
}

impl<'p> Interpreter<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self::with_store(program, RelationStore::new())
    }

    /// Interpreter over pre-populated relations
    pub fn with_store(program: &'p Program, store: RelationStore) -> Self {
        Interpreter {
            program,
            store,
            symbols: program.symbols.clone(),
            counter: 0,
        }
    }

    pub fn store(&self) -> &RelationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RelationStore {
        &mut self.store
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Execute the main statement to a fixpoint
    pub fn run(&mut self) -> InterpretResult<()> {
        let mut env = Env {
            tuples: Vec::new(),
            args: &[],
        };
        self.stmt(self.program.main, &mut env)?;
        Ok(())
    }

    /// Call a subroutine. The first return executed ends the call; `None`
    /// means the body finished without returning.
    pub fn call(&mut self, name: &str, args: &[RamDomain]) -> InterpretResult<Option<Tuple>> {
        let subroutine = self
            .program
            .subroutine(name)
            .ok_or_else(|| InterpretError::UnknownSubroutine(name.to_string()))?;
        if subroutine.parameters.len() != args.len() {
            return Err(InterpretError::ArgumentCount {
                name: name.to_string(),
                expected: subroutine.parameters.len(),
                actual: args.len(),
            });
        }
        let mut env = Env {
            tuples: Vec::new(),
            args,
        };
        match self.stmt(subroutine.body, &mut env)? {
            Flow::Return(values) => Ok(Some(values)),
            Flow::Continue | Flow::Exit => Ok(None),
        }
    }

    fn stmt(&mut self, id: StmtId, env: &mut Env<'_>) -> InterpretResult<Flow> {
        let program = self.program;
        match &program.arena[id] {
            Statement::Sequence(stmts) => {
                for stmt in stmts {
                    match self.stmt(*stmt, env)? {
                        Flow::Continue => {}
                        flow => return Ok(flow),
                    }
                }
                Ok(Flow::Continue)
            }
            Statement::Query(op) => self.op(*op, env),
            Statement::Loop(body) => loop {
                match self.stmt(*body, env)? {
                    Flow::Continue => {}
                    Flow::Exit => return Ok(Flow::Continue),
                    flow @ Flow::Return(_) => return Ok(flow),
                }
            },
            Statement::Exit(cond) => Ok(if self.cond(*cond, env)? {
                Flow::Exit
            } else {
                Flow::Continue
            }),
            Statement::Clear(relation) => {
                self.store.clear(relation);
                Ok(Flow::Continue)
            }
            Statement::Swap(a, b) => {
                self.store.swap(a, b);
                Ok(Flow::Continue)
            }
            Statement::MergeExtend { source, target } => {
                self.store.merge(source, target);
                Ok(Flow::Continue)
            }
            Statement::DebugInfo { statement, .. } => self.stmt(*statement, env),
        }
    }

    fn op(&mut self, id: OpId, env: &mut Env<'_>) -> InterpretResult<Flow> {
        let program = self.program;
        match &program.arena[id] {
            Operation::Scan {
                relation,
                tuple,
                nested,
            } => {
                let rows: Vec<Tuple> = self.store.tuples(relation).cloned().collect();
                for row in rows {
                    env.bind(*tuple, row);
                    if let flow @ Flow::Return(_) = self.op(*nested, env)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Continue)
            }
            Operation::Filter { condition, nested } => {
                if self.cond(*condition, env)? {
                    self.op(*nested, env)
                } else {
                    Ok(Flow::Continue)
                }
            }
            Operation::Aggregate {
                relation,
                tuple,
                function,
                expression,
                condition,
                nested,
            } => {
                let rows: Vec<Tuple> = self.store.tuples(relation).cloned().collect();
                let mut values = Vec::new();
                for row in rows {
                    env.bind(*tuple, row);
                    if !self.cond(*condition, env)? {
                        continue;
                    }
                    values.push(match expression {
                        Some(expr) => self.expr(*expr, env)?,
                        None => 0,
                    });
                }
                match aggregate(*function, &values) {
                    Some(result) => {
                        env.bind(*tuple, vec![result]);
                        self.op(*nested, env)
                    }
                    None => Ok(Flow::Continue),
                }
            }
            Operation::Project { relation, values } => {
                let row = self.exprs(values, env)?;
                self.store.insert(relation, row);
                Ok(Flow::Continue)
            }
            Operation::SubroutineReturn { values } => Ok(Flow::Return(self.exprs(values, env)?)),
        }
    }

    fn cond(&mut self, id: CondId, env: &mut Env<'_>) -> InterpretResult<bool> {
        let program = self.program;
        Ok(match &program.arena[id] {
            Condition::True => true,
            Condition::False => false,
            Condition::Conjunction(lhs, rhs) => self.cond(*lhs, env)? && self.cond(*rhs, env)?,
            Condition::Negation(inner) => !self.cond(*inner, env)?,
            Condition::Constraint { op, lhs, rhs } => {
                let lhs = self.expr(*lhs, env)?;
                let rhs = self.expr(*rhs, env)?;
                op.holds(lhs, rhs)
            }
            Condition::ExistenceCheck { relation, values } => {
                let mut pattern = Vec::with_capacity(values.len());
                for value in values {
                    pattern.push(if program.arena[*value].is_undef() {
                        None
                    } else {
                        Some(self.expr(*value, env)?)
                    });
                }
                self.store.matches(relation, &pattern)
            }
            Condition::EmptinessCheck { relation } => self.store.is_empty(relation),
        })
    }

    fn exprs(&mut self, ids: &[ExprId], env: &mut Env<'_>) -> InterpretResult<Tuple> {
        ids.iter().map(|id| self.expr(*id, env)).collect()
    }

    fn expr(&mut self, id: ExprId, env: &mut Env<'_>) -> InterpretResult<RamDomain> {
        let program = self.program;
        match &program.arena[id] {
            Expression::SignedConstant(v) => Ok(*v),
            Expression::UnsignedConstant(v) => Ok(*v as RamDomain),
            Expression::FloatConstant(v) => Ok(v.to_bits() as RamDomain),
            Expression::TupleElement { tuple, element } => {
                let row = env
                    .tuples
                    .get(*tuple)
                    .and_then(Option::as_ref)
                    .ok_or(InterpretError::UnboundTuple(*tuple))?;
                row.get(*element)
                    .copied()
                    .ok_or(InterpretError::MissingElement {
                        tuple: *tuple,
                        element: *element,
                    })
            }
            Expression::SubroutineArgument(i) => env
                .args
                .get(*i)
                .copied()
                .ok_or(InterpretError::UnknownArgument(*i)),
            Expression::UndefValue => Err(InterpretError::UndefinedValue),
            Expression::IntrinsicOperator { op, args } => {
                let args = self.exprs(args, env)?;
                self.intrinsic(*op, &args)
            }
            Expression::UserDefinedOperator { name, .. } => Err(InterpretError::Unsupported(
                format!("user-defined functor '{}'", name),
            )),
            Expression::PackRecord(_) => Err(InterpretError::Unsupported("records".to_string())),
            Expression::AutoIncrement => {
                let value = self.counter;
                self.counter += 1;
                Ok(value)
            }
        }
    }

    fn intrinsic(&mut self, op: IntrinsicOp, args: &[RamDomain]) -> InterpretResult<RamDomain> {
        let arity_error = || InterpretError::Unsupported(format!("{} with {} args", op.symbol(), args.len()));
        let arg = |i: usize| args.get(i).copied().ok_or_else(arity_error);
        Ok(match op {
            IntrinsicOp::Add => arg(0)?.wrapping_add(arg(1)?),
            IntrinsicOp::Sub => arg(0)?.wrapping_sub(arg(1)?),
            IntrinsicOp::Mul => arg(0)?.wrapping_mul(arg(1)?),
            IntrinsicOp::Div => arg(0)?
                .checked_div(arg(1)?)
                .ok_or(InterpretError::DivisionByZero)?,
            IntrinsicOp::Mod => arg(0)?
                .checked_rem(arg(1)?)
                .ok_or(InterpretError::DivisionByZero)?,
            IntrinsicOp::Neg => arg(0)?.wrapping_neg(),
            IntrinsicOp::Max => args.iter().copied().max().ok_or_else(arity_error)?,
            IntrinsicOp::Min => args.iter().copied().min().ok_or_else(arity_error)?,
            IntrinsicOp::Cat => {
                let mut joined = String::new();
                for ordinal in args {
                    let symbol = self
                        .symbols
                        .decode(*ordinal)
                        .ok_or(InterpretError::UnknownSymbol(*ordinal))?;
                    joined.push_str(symbol);
                }
                self.symbols.encode(&joined)
            }
            IntrinsicOp::StrLen => {
                let ordinal = arg(0)?;
                let symbol = self
                    .symbols
                    .decode(ordinal)
                    .ok_or(InterpretError::UnknownSymbol(ordinal))?;
                symbol.chars().count() as RamDomain
            }
        })
    }
}

/// Fold an aggregate; `None` when the function has no value over no rows
fn aggregate(function: AggregateFunction, values: &[RamDomain]) -> Option<RamDomain> {
    match function {
        AggregateFunction::Count => Some(values.len() as RamDomain),
        AggregateFunction::Sum => Some(values.iter().fold(0, |acc: RamDomain, v| acc.wrapping_add(*v))),
        AggregateFunction::Min => values.iter().copied().min(),
        AggregateFunction::Max => values.iter().copied().max(),
        AggregateFunction::Mean => {
            if values.is_empty() {
                None
            } else {
                let sum = values.iter().fold(0, |acc: RamDomain, v| acc.wrapping_add(*v));
                Some(sum / values.len() as RamDomain)
            }
        }
    }
}
