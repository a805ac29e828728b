pub mod environment;
pub mod error;
pub mod evaluator;
pub mod parser;

pub use environment::Environment;
pub use error::RuntimeError;
pub use evaluator::Interpreter;
pub use parser::{parse, ParseError, ParseResult, TokenParser};

use std::io::Write;

use crate::diagnostic::Diagnostics;
use crate::lexer::tokenize;

/// Tokenize, parse and, when neither stage reported an error, interpret `source`.
///
/// Diagnostics from this submission are appended to `diagnostics`; the caller decides when to
/// reset it.
pub fn run<W: Write>(source: &str, interpreter: &mut Interpreter<W>, diagnostics: &mut Diagnostics) {
    let tokens = tokenize(source, diagnostics);
    let statements = parse(tokens, diagnostics);

    if diagnostics.had_error() {
        tracing::debug!("skipping evaluation after lexical or syntax errors");
        return;
    }

    interpreter.interpret(&statements, diagnostics);
}
