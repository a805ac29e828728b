use serde_json::json;

use crate::ast::{Expr, ExprKind, Stmt};
use crate::token::{Literal, Token};
use crate::value::Value;

/// Render an expression as a parenthesised prefix form, e.g. `(+ 1 (group 2))`.
pub fn print_expr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Literal(Value::String(s)) => format!("\"{}\"", s),
        ExprKind::Literal(value) => value.to_string(),
        ExprKind::Grouping(inner) => parenthesize("group", &[print_expr(inner)]),
        ExprKind::Unary { op, right } => parenthesize(op.symbol(), &[print_expr(right)]),
        ExprKind::Binary { left, op, right } => {
            parenthesize(op.symbol(), &[print_expr(left), print_expr(right)])
        }
        ExprKind::Logical { left, op, right } => {
            parenthesize(op.symbol(), &[print_expr(left), print_expr(right)])
        }
        ExprKind::Variable(name) => name.lexeme.to_string(),
        ExprKind::Assign { name, value } => {
            parenthesize("=", &[name.lexeme.to_string(), print_expr(value)])
        }
    }
}

/// Render a statement the same way; discarded declarations show up as `<error>`.
pub fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Expression(expr) => parenthesize(";", &[print_expr(expr)]),
        Stmt::Print(expr) => parenthesize("print", &[print_expr(expr)]),
        Stmt::Var { name, initializer } => {
            let mut parts = vec![name.lexeme.to_string()];
            if let Some(init) = initializer {
                parts.push(print_expr(init));
            }
            parenthesize("var", &parts)
        }
        Stmt::Block(statements) => {
            let parts: Vec<String> = statements.iter().map(print_slot).collect();
            parenthesize("block", &parts)
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let mut parts = vec![print_expr(condition), print_stmt(then_branch)];
            if let Some(else_branch) = else_branch {
                parts.push(print_stmt(else_branch));
            }
            parenthesize("if", &parts)
        }
        Stmt::While { condition, body } => {
            parenthesize("while", &[print_expr(condition), print_stmt(body)])
        }
    }
}

pub fn print_slot(slot: &Option<Stmt>) -> String {
    match slot {
        Some(stmt) => print_stmt(stmt),
        None => "<error>".to_string(),
    }
}

fn parenthesize(name: &str, parts: &[String]) -> String {
    let mut output = String::with_capacity(name.len() + 2);
    output.push('(');
    output.push_str(name);
    for part in parts {
        output.push(' ');
        output.push_str(part);
    }
    output.push(')');
    output
}

/// The token stream as a JSON array of `{kind, lexeme, literal, line}` objects.
pub fn tokens_to_json(tokens: &[Token]) -> serde_json::Value {
    let items = tokens
        .iter()
        .map(|token| {
            let literal = match &token.literal {
                Some(Literal::Number(n)) => json!(n),
                Some(Literal::String(s)) => json!(s.as_ref()),
                None => serde_json::Value::Null,
            };
            json!({
                "kind": format!("{:?}", token.kind),
                "lexeme": token.lexeme.as_ref(),
                "literal": literal,
                "line": token.line,
            })
        })
        .collect();
    serde_json::Value::Array(items)
}
