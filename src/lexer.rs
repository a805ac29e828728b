use logos::Logos;
use std::rc::Rc;
use thiserror::Error;

use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::token::{keyword, Literal, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unexpected character.")]
    UnexpectedCharacter { character: char, line: usize },
    #[error("Unterminated string.")]
    UnterminatedString { line: usize },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { line, .. } => *line,
            LexError::UnterminatedString { line } => *line,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::lexical(self.line(), self.to_string())
    }
}

/// Output of a scan: the token stream (always `Eof`-terminated) and every lexical error.
pub struct ScanResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

/// Lexemes as logos recognises them, before lines and keywords are attached.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r]+")]
enum RawToken {
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("\n")]
    Newline,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[token(";")]
    Semicolon,
    #[token("/")]
    Slash,
    #[token("*")]
    Star,

    #[token("!=")]
    BangEqual,
    #[token("!")]
    Bang,
    #[token("==")]
    EqualEqual,
    #[token("=")]
    Equal,
    #[token(">=")]
    GreaterEqual,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEqual,
    #[token("<")]
    Less,

    // A trailing dot without digits is left for the next token.
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // Strings may span lines; there are no escapes.
    #[regex(r#""[^"]*""#)]
    String,

    // An opening quote that runs to the end of input.
    #[regex(r#""[^"]*"#)]
    UnterminatedString,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,
}

impl RawToken {
    /// Token kind for lexemes that carry no literal and need no further lookup.
    fn simple_kind(self) -> Option<TokenKind> {
        let kind = match self {
            RawToken::LeftParen => TokenKind::LeftParen,
            RawToken::RightParen => TokenKind::RightParen,
            RawToken::LeftBrace => TokenKind::LeftBrace,
            RawToken::RightBrace => TokenKind::RightBrace,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Star => TokenKind::Star,
            RawToken::BangEqual => TokenKind::BangEqual,
            RawToken::Bang => TokenKind::Bang,
            RawToken::EqualEqual => TokenKind::EqualEqual,
            RawToken::Equal => TokenKind::Equal,
            RawToken::GreaterEqual => TokenKind::GreaterEqual,
            RawToken::Greater => TokenKind::Greater,
            RawToken::LessEqual => TokenKind::LessEqual,
            RawToken::Less => TokenKind::Less,
            _ => return None,
        };
        Some(kind)
    }
}

/// Drives the logos lexer over one source text, tracking the current line.
pub struct Scanner<'source> {
    source: &'source str,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
    line: usize,
}

impl<'source> Scanner<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
            line: 1,
        }
    }

    pub fn scan_tokens(mut self) -> ScanResult {
        let mut lexer = RawToken::lexer(self.source);

        while let Some(result) = lexer.next() {
            let slice = lexer.slice();
            match result {
                Ok(raw) => self.accept(raw, slice),
                Err(()) => {
                    for character in slice.chars() {
                        self.errors.push(LexError::UnexpectedCharacter {
                            character,
                            line: self.line,
                        });
                    }
                }
            }
        }

        self.tokens.push(Token::eof(self.line));
        ScanResult {
            tokens: self.tokens,
            errors: self.errors,
        }
    }

    fn accept(&mut self, raw: RawToken, slice: &str) {
        match raw {
            RawToken::LineComment => {}
            RawToken::Newline => self.line += 1,
            RawToken::Number(value) => {
                self.push(TokenKind::Number, slice, Some(Literal::Number(value)));
            }
            RawToken::String => {
                // Reported on the line of the closing quote.
                self.line += count_newlines(slice);
                let contents = &slice[1..slice.len() - 1];
                self.push(TokenKind::String, slice, Some(Literal::String(Rc::from(contents))));
            }
            RawToken::UnterminatedString => {
                self.line += count_newlines(slice);
                self.errors.push(LexError::UnterminatedString { line: self.line });
            }
            RawToken::Identifier => {
                let kind = keyword(slice).unwrap_or(TokenKind::Identifier);
                self.push(kind, slice, None);
            }
            other => {
                if let Some(kind) = other.simple_kind() {
                    self.push(kind, slice, None);
                }
            }
        }
    }

    fn push(&mut self, kind: TokenKind, lexeme: &str, literal: Option<Literal>) {
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

/// Scan `source` into tokens, reporting lexical errors without stopping.
pub fn tokenize(source: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let ScanResult { tokens, errors } = Scanner::new(source).scan_tokens();
    tracing::debug!(tokens = tokens.len(), errors = errors.len(), "scanned source");

    for error in &errors {
        diagnostics.report(error.to_diagnostic());
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source)
            .scan_tokens()
            .tokens
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_punctuation_and_operators() {
        assert_eq!(
            kinds("(){},.-+;*! != = == < <= > >= /"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Semicolon,
                TokenKind::Star,
                TokenKind::Bang,
                TokenKind::BangEqual,
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Slash,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("var _x1 = nil and orchid or while"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Nil,
                TokenKind::And,
                TokenKind::Identifier,
                TokenKind::Or,
                TokenKind::While,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_literals() {
        let result = Scanner::new("12 3.25 7.").scan_tokens();
        let tokens = result.tokens;
        assert_eq!(tokens[0].literal, Some(Literal::Number(12.0)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(3.25)));
        assert_eq!(&*tokens[2].lexeme, "7");
        assert_eq!(tokens[3].kind, TokenKind::Dot);
        assert_eq!(tokens[4].kind, TokenKind::Eof);
    }

    #[test]
    fn test_multiline_string_counts_lines() {
        let result = Scanner::new("\"one\ntwo\" x").scan_tokens();
        let tokens = result.tokens;
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, Some(Literal::String(Rc::from("one\ntwo"))));
        assert_eq!(&*tokens[0].lexeme, "\"one\ntwo\"");
        assert_eq!(tokens[1].line, 2);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_comments_and_newlines() {
        let result = Scanner::new("// nothing here\nprint 1; // trailing\n").scan_tokens();
        let tokens = result.tokens;
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].kind, TokenKind::Print);
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[3].kind, TokenKind::Eof);
        assert_eq!(tokens[3].line, 3);
    }

    #[test]
    fn test_unexpected_character_continues() {
        let result = Scanner::new("1 @ 2 # 3").scan_tokens();
        assert_eq!(result.tokens.len(), 4);
        assert_eq!(
            result.errors,
            vec![
                LexError::UnexpectedCharacter { character: '@', line: 1 },
                LexError::UnexpectedCharacter { character: '#', line: 1 },
            ]
        );
    }

    #[test]
    fn test_unterminated_string_stops_cleanly() {
        let result = Scanner::new("print \"oops\nstill going").scan_tokens();
        assert_eq!(result.errors, vec![LexError::UnterminatedString { line: 2 }]);
        assert_eq!(result.tokens.len(), 2);
        assert_eq!(result.tokens[1], Token::eof(2));
    }

    #[test]
    fn test_tokenize_reports_to_diagnostics() {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize("var a = 1;\n$", &mut diagnostics);
        assert_eq!(tokens.len(), 6);
        assert!(diagnostics.had_error());
        assert_eq!(
            diagnostics.records()[0].to_string(),
            "[line 2] Error: Unexpected character."
        );
    }

    #[test]
    fn test_comment_marker_inside_string() {
        let result = Scanner::new("\"a // b\" / 2").scan_tokens();
        assert_eq!(result.tokens[0].literal, Some(Literal::String(Rc::from("a // b"))));
        assert_eq!(result.tokens[1].kind, TokenKind::Slash);
        assert_eq!(result.tokens[2].kind, TokenKind::Number);
    }

    #[test]
    fn test_lines_continue_after_errors() {
        let result = Scanner::new("@\n\"two\nlines\"\n~ x").scan_tokens();
        assert_eq!(
            result.errors,
            vec![
                LexError::UnexpectedCharacter { character: '@', line: 1 },
                LexError::UnexpectedCharacter { character: '~', line: 4 },
            ]
        );
        assert_eq!(result.tokens[0].line, 3);
        assert_eq!(result.tokens[1].kind, TokenKind::Identifier);
        assert_eq!(result.tokens[1].line, 4);
    }

    #[test]
    fn test_token_display() {
        let result = Scanner::new("\"hi\" 2.5 x").scan_tokens();
        let tokens = result.tokens;
        assert_eq!(tokens[0].to_string(), "String \"hi\" hi");
        assert_eq!(tokens[1].to_string(), "Number 2.5 2.5");
        assert_eq!(tokens[2].to_string(), "Identifier x null");
    }
}
