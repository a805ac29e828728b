pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod format;
pub mod interpreter;
pub mod lexer;
pub mod token;
pub mod value;

pub use ast::{Expr, ExprKind, Stmt};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use interpreter::{parse, run, Interpreter};
pub use lexer::tokenize;
pub use token::{Token, TokenKind};
pub use value::Value;
