//! Text rendering of programs
//!
//! The layout is line oriented with one space of indentation per nesting
//! level, e.g.
//!
//! ```text
//! QUERY
//!  FOR t0 IN edge
//!   IF (NOT (t0.0,t0.1,_,_) IN path)
//!    INSERT (t0.0, t0.1, 1, 0) INTO path
//! END QUERY
//! ```

use crate::arena::Arena;
use crate::ir::{CondId, Condition, ExprId, Expression, OpId, Operation, StmtId, Statement};
use crate::program::{Program, Relation};
use std::fmt::{self, Write};

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer {
            arena: &self.arena,
            out: f,
        };
        printer.line(0, "PROGRAM")?;
        printer.line(1, "DECLARATION")?;
        for relation in &self.relations {
            printer.line(2, &declaration(relation))?;
        }
        printer.line(1, "END DECLARATION")?;
        for (name, subroutine) in &self.subroutines {
            printer.line(1, &format!("SUBROUTINE {}", name))?;
            printer.stmt(2, subroutine.body)?;
            printer.line(1, "END SUBROUTINE")?;
        }
        printer.line(1, "BEGIN MAIN")?;
        printer.stmt(2, self.main)?;
        printer.line(1, "END MAIN")?;
        printer.line(0, "END PROGRAM")
    }
}

impl Arena {
    /// Render a statement subtree
    pub fn display_stmt(&self, id: StmtId) -> String {
        let mut out = String::new();
        let mut printer = Printer {
            arena: self,
            out: &mut out,
        };
        // Writing into a String cannot fail
        let _ = printer.stmt(0, id);
        out
    }

    /// Render a condition on a single line
    pub fn display_cond(&self, id: CondId) -> String {
        let mut out = String::new();
        let mut printer = Printer {
            arena: self,
            out: &mut out,
        };
        let _ = printer.cond(id);
        out
    }

    /// Render an expression on a single line
    pub fn display_expr(&self, id: ExprId) -> String {
        let mut out = String::new();
        let mut printer = Printer {
            arena: self,
            out: &mut out,
        };
        let _ = printer.expr(id);
        out
    }
}

fn declaration(relation: &Relation) -> String {
    let attributes: Vec<String> = relation
        .attribute_names
        .iter()
        .zip(&relation.attribute_types)
        .map(|(name, ty)| format!("{}:{}", name, ty))
        .collect();
    format!(
        "{}({}) {:?}",
        relation.name,
        attributes.join(","),
        relation.representation
    )
}

struct Printer<'a, W> {
    arena: &'a Arena,
    out: W,
}

impl<W: Write> Printer<'_, W> {
    fn line(&mut self, indent: usize, text: &str) -> fmt::Result {
        writeln!(self.out, "{:indent$}{}", "", text, indent = indent)
    }

    fn indent(&mut self, indent: usize) -> fmt::Result {
        write!(self.out, "{:indent$}", "", indent = indent)
    }

    fn stmt(&mut self, indent: usize, id: StmtId) -> fmt::Result {
        match &self.arena[id] {
            Statement::Sequence(stmts) => {
                for stmt in stmts {
                    self.stmt(indent, *stmt)?;
                }
                Ok(())
            }
            Statement::Query(op) => {
                self.line(indent, "QUERY")?;
                self.op(indent + 1, *op)?;
                self.line(indent, "END QUERY")
            }
            Statement::Loop(body) => {
                self.line(indent, "LOOP")?;
                self.stmt(indent + 1, *body)?;
                self.line(indent, "END LOOP")
            }
            Statement::Exit(cond) => {
                self.indent(indent)?;
                self.out.write_str("EXIT ")?;
                self.cond(*cond)?;
                self.out.write_char('\n')
            }
            Statement::Clear(relation) => self.line(indent, &format!("CLEAR {}", relation)),
            Statement::Swap(a, b) => self.line(indent, &format!("SWAP ({}, {})", a, b)),
            Statement::MergeExtend { source, target } => {
                self.line(indent, &format!("MERGE EXTEND {} WITH {}", target, source))
            }
            Statement::DebugInfo { message, statement } => {
                self.line(indent, &format!("DEBUG \"{}\"", message.replace('"', "\\\"")))?;
                self.stmt(indent + 1, *statement)?;
                self.line(indent, "END DEBUG")
            }
        }
    }

    fn op(&mut self, indent: usize, id: OpId) -> fmt::Result {
        match &self.arena[id] {
            Operation::Scan {
                relation,
                tuple,
                nested,
            } => {
                self.line(indent, &format!("FOR t{} IN {}", tuple, relation))?;
                self.op(indent + 1, *nested)
            }
            Operation::Filter { condition, nested } => {
                self.indent(indent)?;
                self.out.write_str("IF ")?;
                self.cond(*condition)?;
                self.out.write_char('\n')?;
                self.op(indent + 1, *nested)
            }
            Operation::Aggregate {
                relation,
                tuple,
                function,
                expression,
                condition,
                nested,
            } => {
                self.indent(indent)?;
                write!(self.out, "t{}.0 = {} ", tuple, function.name())?;
                if let Some(expr) = expression {
                    self.expr(*expr)?;
                    self.out.write_char(' ')?;
                }
                write!(self.out, "FOR ALL t{} IN {} WHERE ", tuple, relation)?;
                self.cond(*condition)?;
                self.out.write_char('\n')?;
                self.op(indent + 1, *nested)
            }
            Operation::Project { relation, values } => {
                self.indent(indent)?;
                self.out.write_str("INSERT (")?;
                self.expr_list(values, ", ")?;
                writeln!(self.out, ") INTO {}", relation)
            }
            Operation::SubroutineReturn { values } => {
                self.indent(indent)?;
                self.out.write_str("RETURN (")?;
                self.expr_list(values, ", ")?;
                self.out.write_str(")\n")
            }
        }
    }

    fn cond(&mut self, id: CondId) -> fmt::Result {
        match &self.arena[id] {
            Condition::True => self.out.write_str("true"),
            Condition::False => self.out.write_str("false"),
            Condition::Conjunction(lhs, rhs) => {
                self.cond(*lhs)?;
                self.out.write_str(" AND ")?;
                self.cond(*rhs)
            }
            Condition::Negation(inner) => {
                self.out.write_str("(NOT ")?;
                self.cond(*inner)?;
                self.out.write_char(')')
            }
            Condition::Constraint { op, lhs, rhs } => {
                self.out.write_char('(')?;
                self.expr(*lhs)?;
                write!(self.out, " {} ", op.symbol())?;
                self.expr(*rhs)?;
                self.out.write_char(')')
            }
            Condition::ExistenceCheck { relation, values } => {
                self.out.write_char('(')?;
                self.expr_list(values, ",")?;
                write!(self.out, ") IN {}", relation)
            }
            Condition::EmptinessCheck { relation } => write!(self.out, "ISEMPTY({})", relation),
        }
    }

    fn expr(&mut self, id: ExprId) -> fmt::Result {
        match &self.arena[id] {
            Expression::SignedConstant(v) => write!(self.out, "{}", v),
            Expression::UnsignedConstant(v) => write!(self.out, "{}u", v),
            Expression::FloatConstant(v) => write!(self.out, "{:?}", v),
            Expression::TupleElement { tuple, element } => {
                write!(self.out, "t{}.{}", tuple, element)
            }
            Expression::SubroutineArgument(i) => write!(self.out, "argument({})", i),
            Expression::UndefValue => self.out.write_char('_'),
            Expression::IntrinsicOperator { op, args } => {
                if op.is_infix() && args.len() == 2 {
                    self.out.write_char('(')?;
                    self.expr(args[0])?;
                    write!(self.out, "{}", op.symbol())?;
                    self.expr(args[1])?;
                    self.out.write_char(')')
                } else {
                    write!(self.out, "{}(", op.symbol())?;
                    self.expr_list(args, ",")?;
                    self.out.write_char(')')
                }
            }
            Expression::UserDefinedOperator { name, args } => {
                write!(self.out, "@{}(", name)?;
                self.expr_list(args, ",")?;
                self.out.write_char(')')
            }
            Expression::PackRecord(args) => {
                self.out.write_char('[')?;
                self.expr_list(args, ",")?;
                self.out.write_char(']')
            }
            Expression::AutoIncrement => self.out.write_str("autoinc()"),
        }
    }

    fn expr_list(&mut self, ids: &[ExprId], separator: &str) -> fmt::Result {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                self.out.write_str(separator)?;
            }
            self.expr(*id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ConstraintOp;

    #[test]
    fn test_render_guarded_insert() {
        let mut arena = Arena::new();
        let x = arena.expr(Expression::TupleElement { tuple: 0, element: 0 });
        let y = arena.expr(Expression::TupleElement { tuple: 0, element: 1 });
        let (u1, u2) = (arena.undef(), arena.undef());
        let exists = arena.cond(Condition::ExistenceCheck {
            relation: "path".to_string(),
            values: vec![x, y, u1, u2],
        });
        let guard = arena.negation(exists);

        let vx = arena.clone_expr(x);
        let vy = arena.clone_expr(y);
        let rule = arena.signed(1);
        let level = arena.signed(0);
        let project = arena.op(Operation::Project {
            relation: "path".to_string(),
            values: vec![vx, vy, rule, level],
        });
        let filter = arena.filter(guard, project);
        let scan = arena.op(Operation::Scan {
            relation: "edge".to_string(),
            tuple: 0,
            nested: filter,
        });
        let query = arena.query(scan);

        assert_eq!(
            arena.display_stmt(query),
            "QUERY\n FOR t0 IN edge\n  IF (NOT (t0.0,t0.1,_,_) IN path)\n   INSERT (t0.0, t0.1, 1, 0) INTO path\nEND QUERY\n"
        );
    }

    #[test]
    fn test_render_constraint() {
        let mut arena = Arena::new();
        let arg = arena.expr(Expression::SubroutineArgument(2));
        let lvl = arena.expr(Expression::TupleElement { tuple: 1, element: 3 });
        let cond = arena.cond(Condition::Constraint {
            op: ConstraintOp::Lt,
            lhs: lvl,
            rhs: arg,
        });
        assert_eq!(arena.display_cond(cond), "(t1.3 < argument(2))");
    }
}
