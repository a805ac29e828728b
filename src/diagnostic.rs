use owo_colors::OwoColorize;
use std::fmt;

use crate::token::Token;

/// Which pipeline stage raised a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Runtime,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Lexical => write!(f, "lexical"),
            DiagnosticKind::Syntax => write!(f, "syntax"),
            DiagnosticKind::Runtime => write!(f, "runtime"),
        }
    }
}

/// Where on its line a lexical or syntax error points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    None,
    AtEnd,
    At(String),
}

impl Location {
    pub fn of_token(token: &Token) -> Self {
        if token.is_eof() {
            Location::AtEnd
        } else {
            Location::At(token.lexeme.to_string())
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::None => Ok(()),
            Location::AtEnd => write!(f, " at end"),
            Location::At(lexeme) => write!(f, " at '{}'", lexeme),
        }
    }
}

/// A single reported error.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: Option<usize>,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn lexical(line: usize, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Lexical,
            line: Some(line),
            location: Location::None,
            message: message.into(),
        }
    }

    pub fn syntax(token: &Token, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Syntax,
            line: Some(token.line),
            location: Location::of_token(token),
            message: message.into(),
        }
    }

    pub fn runtime(line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Runtime,
            line,
            location: Location::None,
            message: message.into(),
        }
    }

    pub fn is_runtime(&self) -> bool {
        self.kind == DiagnosticKind::Runtime
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.line) {
            (DiagnosticKind::Runtime, Some(line)) => write!(f, "{}\n[line {}]", self.message, line),
            (DiagnosticKind::Runtime, None) => write!(f, "{}", self.message),
            (_, Some(line)) => write!(f, "[line {}] Error{}: {}", line, self.location, self.message),
            (_, None) => write!(f, "Error{}: {}", self.location, self.message),
        }
    }
}

type Reporter = Box<dyn FnMut(&Diagnostic)>;

/// Collects every diagnostic raised while tokenizing, parsing and interpreting.
///
/// The driver owns one context per session, inspects `had_error` / `had_runtime_error`
/// after each submission, and calls `reset` before the next independent one. An optional
/// reporter sees each diagnostic the moment it is raised.
#[derive(Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
    reporter: Option<Reporter>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reporter(reporter: impl FnMut(&Diagnostic) + 'static) -> Self {
        Self {
            records: Vec::new(),
            reporter: Some(Box::new(reporter)),
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(kind = %diagnostic.kind, line = ?diagnostic.line, "diagnostic reported");
        if let Some(reporter) = self.reporter.as_mut() {
            reporter(&diagnostic);
        }
        self.records.push(diagnostic);
    }

    /// A lexical or syntax error occurred since the last reset.
    pub fn had_error(&self) -> bool {
        self.records.iter().any(|d| !d.is_runtime())
    }

    pub fn had_runtime_error(&self) -> bool {
        self.records.iter().any(Diagnostic::is_runtime)
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn reset(&mut self) {
        self.records.clear();
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("records", &self.records)
            .field("reporter", &self.reporter.is_some())
            .finish()
    }
}

/// Terminal rendering of diagnostics. Without colour the text is exactly the `Display` form.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticRenderer {
    use_color: bool,
}

impl DiagnosticRenderer {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        if !self.use_color {
            return diagnostic.to_string();
        }

        match (diagnostic.kind, diagnostic.line) {
            (DiagnosticKind::Runtime, Some(line)) => format!(
                "{}\n{}",
                diagnostic.message.red().bold(),
                format!("[line {}]", line).blue()
            ),
            (DiagnosticKind::Runtime, None) => diagnostic.message.red().bold().to_string(),
            (_, line) => {
                let prefix = match line {
                    Some(line) => format!("[line {}] ", line),
                    None => String::new(),
                };
                format!(
                    "{}{}: {}",
                    prefix.blue(),
                    format!("Error{}", diagnostic.location).red().bold(),
                    diagnostic.message.bold()
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_lexical_format() {
        let diagnostic = Diagnostic::lexical(3, "Unexpected character.");
        assert_eq!(diagnostic.to_string(), "[line 3] Error: Unexpected character.");
    }

    #[test]
    fn test_syntax_format_at_lexeme() {
        let token = Token::new(TokenKind::RightParen, ")", None, 2);
        let diagnostic = Diagnostic::syntax(&token, "Expect expression.");
        assert_eq!(diagnostic.to_string(), "[line 2] Error at ')': Expect expression.");
    }

    #[test]
    fn test_syntax_format_at_end() {
        let diagnostic = Diagnostic::syntax(&Token::eof(7), "Expect ';' after value.");
        assert_eq!(diagnostic.to_string(), "[line 7] Error at end: Expect ';' after value.");
    }

    #[test]
    fn test_runtime_format() {
        let diagnostic = Diagnostic::runtime(Some(4), "Undefined variable 'x'.");
        assert_eq!(diagnostic.to_string(), "Undefined variable 'x'.\n[line 4]");

        let lineless = Diagnostic::runtime(None, "Failed to write output: broken pipe");
        assert_eq!(lineless.to_string(), "Failed to write output: broken pipe");
    }

    #[test]
    fn test_flags_track_kinds() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.had_error());
        assert!(!diagnostics.had_runtime_error());

        diagnostics.report(Diagnostic::runtime(Some(1), "boom"));
        assert!(!diagnostics.had_error());
        assert!(diagnostics.had_runtime_error());

        diagnostics.report(Diagnostic::lexical(1, "Unexpected character."));
        assert!(diagnostics.had_error());

        diagnostics.reset();
        assert!(diagnostics.is_empty());
        assert!(!diagnostics.had_error());
        assert!(!diagnostics.had_runtime_error());
    }

    #[test]
    fn test_reporter_sees_each_diagnostic_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut diagnostics = Diagnostics::with_reporter(move |d| sink.borrow_mut().push(d.to_string()));

        diagnostics.report(Diagnostic::lexical(1, "Unexpected character."));
        diagnostics.report(Diagnostic::lexical(2, "Unterminated string."));

        assert_eq!(
            *seen.borrow(),
            vec![
                "[line 1] Error: Unexpected character.".to_string(),
                "[line 2] Error: Unterminated string.".to_string(),
            ]
        );
        assert_eq!(diagnostics.records().len(), 2);
    }

    #[test]
    fn test_plain_rendering_matches_display() {
        let renderer = DiagnosticRenderer::new(false);
        let lexical = Diagnostic::lexical(1, "Unexpected character.");
        let runtime = Diagnostic::runtime(Some(2), "Operand of '-' must be a number.");
        assert_eq!(renderer.render(&lexical), lexical.to_string());
        assert_eq!(renderer.render(&runtime), "Operand of '-' must be a number.\n[line 2]");
    }

    #[test]
    fn test_colored_rendering_keeps_text() {
        let diagnostic = Diagnostic::syntax(&Token::eof(1), "Expect expression.");
        let rendered = DiagnosticRenderer::new(true).render(&diagnostic);
        assert!(rendered.contains("\x1b["));
        assert!(rendered.contains("Error at end"));
        assert!(rendered.contains("Expect expression."));
    }
}
