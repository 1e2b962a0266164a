use crate::ast::{Expr, FnDecl, Stmt};
use crate::lexer::TokenKind;
use crate::token::{Lit, Token};
use miro_source::{Source, SyntaxError, SyntaxErrorKind};
use std::rc::Rc;

mod expr;
mod stmt;

/// Raised internally when a rule cannot make progress. The diagnostic has
/// already been reported by the time this value exists; it only unwinds
/// parsing to the nearest declaration boundary.
#[derive(Debug)]
pub(crate) struct ParseError;

pub(crate) type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    /// Index of the token currently being considered.
    current: usize,
    /// Source code
    source: &'a Source<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a Source<'a>, tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            source,
        }
    }

    /// Parses a whole program: declarations until end of input.
    ///
    /// Never fails out of this entry point. A malformed declaration is
    /// reported to the source's error sink, answered with a [`Stmt::Error`]
    /// placeholder and skipped past, and parsing keeps collecting the
    /// remaining declarations. Callers must check the source for
    /// accumulated errors before interpreting the result.
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.parse_declaration());
        }
        statements
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Predicate that tests whether the current token has the given kind
    /// and eats it if yes as a side effect.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Eats the current token if it has the given kind, otherwise reports
    /// an unexpected token error.
    fn expect(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.error_at(SyntaxErrorKind::UnexpectedToken, message))
        }
    }

    /// Reports an error at the current token without unwinding.
    fn report(&self, kind: SyntaxErrorKind, message: &str) {
        let token = self.peek();
        self.source
            .errors
            .add_error(SyntaxError::new(kind, token.line, message).with_location(token.location()));
    }

    fn error_at(&self, kind: SyntaxErrorKind, message: &str) -> ParseError {
        self.report(kind, message);
        ParseError
    }

    /// Discards tokens until a statement boundary: just past a `;`, or in
    /// front of a token that begins a statement.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Class
                | TokenKind::For
                | TokenKind::Fun
                | TokenKind::If
                | TokenKind::Print
                | TokenKind::Return
                | TokenKind::Var
                | TokenKind::While => return,
                _ => {}
            }

            self.advance();
        }
    }
}
