use std::io::Write;
use std::rc::Rc;

use super::environment::Environment;
use super::error::RuntimeError;
use crate::ast::{BinaryOp, Expr, ExprKind, LogicalOp, Stmt, UnaryOp};
use crate::diagnostic::Diagnostics;
use crate::value::Value;

/// Walks statement and expression trees against a chain of scopes.
///
/// `print` output goes to the injected writer `W`; runtime errors go to the `Diagnostics`
/// passed to [`Interpreter::interpret`]. Global bindings persist across calls, so a prompt can
/// feed one line at a time into the same interpreter.
pub struct Interpreter<W: Write> {
    env: Environment,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Self {
            env: Environment::new(),
            out,
        }
    }

    /// Execute `statements` in order, skipping holes. The first runtime error is reported and
    /// abandons the rest of this call; output already written stays written.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = statements.len()))]
    pub fn interpret(&mut self, statements: &[Option<Stmt>], diagnostics: &mut Diagnostics) {
        for stmt in statements.iter().flatten() {
            if let Err(error) = self.execute(stmt) {
                tracing::debug!(%error, "runtime error aborted interpretation");
                self.env.reset_to_globals();
                diagnostics.report(error.to_diagnostic());
                return;
            }
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn execute(&mut self, statement: &Stmt) -> Result<(), RuntimeError> {
        match statement {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Nil,
                };
                self.env.define(name, value)
            }
            Stmt::Block(statements) => self.execute_block(statements),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
        }
    }

    /// Run `statements` in a fresh child scope. The scope is popped on every exit path,
    /// including when a runtime error propagates out.
    fn execute_block(&mut self, statements: &[Option<Stmt>]) -> Result<(), RuntimeError> {
        self.env.push_scope();
        tracing::trace!(depth = self.env.depth(), "entered block");

        let result = statements
            .iter()
            .flatten()
            .try_for_each(|stmt| self.execute(stmt));

        self.env.pop_scope();
        tracing::trace!(depth = self.env.depth(), "left block");
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),
            ExprKind::Grouping(inner) => self.evaluate(inner),
            ExprKind::Unary { op, right } => {
                let operand = self.evaluate(right)?;
                eval_unary_op(*op, &operand, expr.line)
            }
            ExprKind::Binary { left, op, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                eval_binary_op(&left_val, *op, &right_val, expr.line)
            }
            ExprKind::Logical { left, op, right } => {
                let left_val = self.evaluate(left)?;
                let short_circuits = match op {
                    LogicalOp::Or => left_val.is_truthy(),
                    LogicalOp::And => !left_val.is_truthy(),
                };
                if short_circuits {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }
            ExprKind::Variable(name) => self.env.get(name),
            ExprKind::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.env.assign(name, value.clone())?;
                Ok(value)
            }
        }
    }
}

fn eval_unary_op(op: UnaryOp, operand: &Value, line: usize) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Neg, _) => Err(RuntimeError::number_operand(op, line)),
    }
}

fn eval_binary_op(left: &Value, op: BinaryOp, right: &Value, line: usize) -> Result<Value, RuntimeError> {
    match (left, op, right) {
        (left_val, BinaryOp::Eq, right_val) => Ok(Value::Bool(left_val == right_val)),
        (left_val, BinaryOp::NotEq, right_val) => Ok(Value::Bool(left_val != right_val)),
        (Value::Number(left_num), BinaryOp::Add, Value::Number(right_num)) => Ok(Value::Number(left_num + right_num)),
        (Value::String(left_str), BinaryOp::Add, Value::String(right_str)) => {
            let mut combined = String::with_capacity(left_str.len() + right_str.len());
            combined.push_str(left_str);
            combined.push_str(right_str);
            Ok(Value::String(Rc::<str>::from(combined)))
        }
        (_, BinaryOp::Add, _) => Err(RuntimeError::add_operands(op, line)),
        (Value::Number(left_num), BinaryOp::Sub, Value::Number(right_num)) => Ok(Value::Number(left_num - right_num)),
        (Value::Number(left_num), BinaryOp::Mul, Value::Number(right_num)) => Ok(Value::Number(left_num * right_num)),
        (Value::Number(left_num), BinaryOp::Div, Value::Number(right_num)) => Ok(Value::Number(left_num / right_num)),
        (Value::Number(left_num), BinaryOp::Greater, Value::Number(right_num)) => Ok(Value::Bool(left_num > right_num)),
        (Value::Number(left_num), BinaryOp::GreaterEq, Value::Number(right_num)) => Ok(Value::Bool(left_num >= right_num)),
        (Value::Number(left_num), BinaryOp::Less, Value::Number(right_num)) => Ok(Value::Bool(left_num < right_num)),
        (Value::Number(left_num), BinaryOp::LessEq, Value::Number(right_num)) => Ok(Value::Bool(left_num <= right_num)),
        _ => Err(RuntimeError::number_operands(op, line)),
    }
}
