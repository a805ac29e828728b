use thiserror::Error;

use crate::ast::{BinaryOp, Expr, ExprKind, LogicalOp, Stmt, UnaryOp};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::token::{Token, TokenKind};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl ParseError {
    pub fn new(token: &Token, message: impl Into<String>) -> Self {
        Self {
            token: token.clone(),
            message: message.into(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::syntax(&self.token, self.message.clone())
    }
}

/// Statements with a hole (`None`) wherever a declaration failed and was skipped, plus every
/// syntax error in the order it was found.
pub struct ParseResult {
    pub statements: Vec<Option<Stmt>>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

type ParseOutcome<T> = Result<T, ParseError>;

/// Deepest nesting of statements and expressions accepted before parsing gives up. Keeps
/// the parser and the evaluator well inside the native stack.
pub const MAX_NESTING: usize = 128;

/// Recursive-descent parser, one method per precedence level.
pub struct TokenParser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    errors: Vec<ParseError>,
}

impl TokenParser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::eof(line));
        }
        Self {
            tokens,
            current: 0,
            depth: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse_with_errors(mut self) -> ParseResult {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.declaration());
        }
        ParseResult {
            statements,
            errors: self.errors,
        }
    }

    /// A declaration that fails is recorded, the parser resynchronizes, and the
    /// slot becomes a hole.
    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_kind(&[TokenKind::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(err) => {
                self.errors.push(err);
                self.synchronize();
                None
            }
        }
    }

    fn var_declaration(&mut self) -> ParseOutcome<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;

        let initializer = if self.match_kind(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> ParseOutcome<Stmt> {
        self.nested(Self::statement_kind)
    }

    fn statement_kind(&mut self) -> ParseOutcome<Stmt> {
        match self.peek().kind {
            TokenKind::For => {
                self.advance();
                self.for_statement()
            }
            TokenKind::If => {
                self.advance();
                self.if_statement()
            }
            TokenKind::Print => {
                self.advance();
                self.print_statement()
            }
            TokenKind::While => {
                self.advance();
                self.while_statement()
            }
            TokenKind::LeftBrace => {
                self.advance();
                Ok(Stmt::Block(self.block()?))
            }
            _ => self.expression_statement(),
        }
    }

    /// `for` is rewritten into `while` here; the evaluator never sees it.
    fn for_statement(&mut self) -> ParseOutcome<Stmt> {
        let keyword_line = self.previous().line;
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.match_kind(&[TokenKind::Semicolon]) {
            None
        } else if self.match_kind(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![Some(body), Some(Stmt::Expression(increment))]);
        }

        let condition = condition.unwrap_or_else(|| Expr::literal(Value::Bool(true), keyword_line));
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![Some(initializer), Some(body)]);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> ParseOutcome<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_kind(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn print_statement(&mut self) -> ParseOutcome<Stmt> {
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn while_statement(&mut self) -> ParseOutcome<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn expression_statement(&mut self) -> ParseOutcome<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn block(&mut self) -> ParseOutcome<Vec<Option<Stmt>>> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration());
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression(&mut self) -> ParseOutcome<Expr> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> ParseOutcome<Expr> {
        let expr = self.or()?;

        if !self.match_kind(&[TokenKind::Equal]) {
            return Ok(expr);
        }

        let equals = self.previous().clone();
        let value = self.expression()?;

        match expr.kind {
            ExprKind::Variable(name) => {
                let line = name.line;
                Ok(Expr::new(
                    ExprKind::Assign {
                        name,
                        value: Box::new(value),
                    },
                    line,
                ))
            }
            kind => {
                // Reported, but not worth unwinding for: keep the left-hand side.
                self.errors.push(ParseError::new(&equals, "Invalid assignment target."));
                Ok(Expr::new(kind, expr.line))
            }
        }
    }

    fn or(&mut self) -> ParseOutcome<Expr> {
        let mut expr = self.and()?;

        while self.match_kind(&[TokenKind::Or]) {
            let line = self.previous().line;
            let right = self.and()?;
            expr = Expr::new(
                ExprKind::Logical {
                    left: Box::new(expr),
                    op: LogicalOp::Or,
                    right: Box::new(right),
                },
                line,
            );
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseOutcome<Expr> {
        let mut expr = self.equality()?;

        while self.match_kind(&[TokenKind::And]) {
            let line = self.previous().line;
            let right = self.equality()?;
            expr = Expr::new(
                ExprKind::Logical {
                    left: Box::new(expr),
                    op: LogicalOp::And,
                    right: Box::new(right),
                },
                line,
            );
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseOutcome<Expr> {
        self.binary_level(
            &[
                (TokenKind::BangEqual, BinaryOp::NotEq),
                (TokenKind::EqualEqual, BinaryOp::Eq),
            ],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseOutcome<Expr> {
        self.binary_level(
            &[
                (TokenKind::Greater, BinaryOp::Greater),
                (TokenKind::GreaterEqual, BinaryOp::GreaterEq),
                (TokenKind::Less, BinaryOp::Less),
                (TokenKind::LessEqual, BinaryOp::LessEq),
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseOutcome<Expr> {
        self.binary_level(
            &[(TokenKind::Minus, BinaryOp::Sub), (TokenKind::Plus, BinaryOp::Add)],
            Self::factor,
        )
    }

    fn factor(&mut self) -> ParseOutcome<Expr> {
        self.binary_level(
            &[(TokenKind::Slash, BinaryOp::Div), (TokenKind::Star, BinaryOp::Mul)],
            Self::unary,
        )
    }

    /// One left-associative level: operands come from `operand`, folded into a left-deep tree.
    fn binary_level(
        &mut self,
        operators: &[(TokenKind, BinaryOp)],
        operand: fn(&mut Self) -> ParseOutcome<Expr>,
    ) -> ParseOutcome<Expr> {
        let mut expr = operand(self)?;

        while let Some(op) = self.match_operator(operators) {
            let line = self.previous().line;
            let right = operand(self)?;
            expr = Expr::new(
                ExprKind::Binary {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                },
                line,
            );
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseOutcome<Expr> {
        if self.match_kind(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let op = if operator.kind == TokenKind::Bang {
                UnaryOp::Not
            } else {
                UnaryOp::Neg
            };
            let right = self.nested(Self::unary)?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    right: Box::new(right),
                },
                operator.line,
            ));
        }

        self.primary()
    }

    fn primary(&mut self) -> ParseOutcome<Expr> {
        let token = self.peek().clone();
        let kind = match token.kind {
            TokenKind::False => ExprKind::Literal(Value::Bool(false)),
            TokenKind::True => ExprKind::Literal(Value::Bool(true)),
            TokenKind::Nil => ExprKind::Literal(Value::Nil),
            TokenKind::Number | TokenKind::String => match &token.literal {
                Some(literal) => ExprKind::Literal(Value::from(literal)),
                None => return Err(ParseError::new(&token, "Expect expression.")),
            },
            TokenKind::Identifier => ExprKind::Variable(token.clone()),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
                return Ok(Expr::new(ExprKind::Grouping(Box::new(inner)), token.line));
            }
            _ => return Err(ParseError::new(&token, "Expect expression.")),
        };

        self.advance();
        Ok(Expr::new(kind, token.line))
    }

    /// Run one level of recursive descent, failing once `MAX_NESTING` levels are open.
    fn nested<T>(&mut self, rule: fn(&mut Self) -> ParseOutcome<T>) -> ParseOutcome<T> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::new(self.peek(), "Too much nesting."));
        }

        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn match_operator(&mut self, operators: &[(TokenKind, BinaryOp)]) -> Option<BinaryOp> {
        let op = operators
            .iter()
            .find(|(kind, _)| self.check(*kind))
            .map(|&(_, op)| op)?;
        self.advance();
        Some(op)
    }

    fn match_kind(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|&kind| self.check(kind)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseOutcome<Token> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            Err(ParseError::new(self.peek(), message))
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Skip tokens until just past a `;` or up to a keyword that starts a statement.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            if self.peek().kind.starts_statement() {
                return;
            }
            self.advance();
        }
    }
}

/// Parse a token stream, reporting every syntax error to `diagnostics`.
pub fn parse(tokens: Vec<Token>, diagnostics: &mut Diagnostics) -> Vec<Option<Stmt>> {
    let ParseResult { statements, errors } = TokenParser::new(tokens).parse_with_errors();
    tracing::debug!(statements = statements.len(), errors = errors.len(), "parsed tokens");

    for error in &errors {
        diagnostics.report(error.to_diagnostic());
    }
    statements
}
