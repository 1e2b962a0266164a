//! The token model produced by the scanner.

use crate::lexer::TokenKind;

/// Decoded payload of a literal token.
///
/// Only number and string tokens carry one; every other token's `literal`
/// is `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Number(f64),
    Str(String),
}

/// A single lexeme of source code.
///
/// Immutable once created. Only the scanner creates tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text of the lexeme.
    pub lexeme: String,
    pub literal: Option<Lit>,
    /// 1-based source line the lexeme starts on.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, literal: Option<Lit>, line: usize) -> Self {
        Self {
            kind,
            lexeme,
            literal,
            line,
        }
    }

    /// Location hint for diagnostics: `end` at end of input, the quoted
    /// lexeme otherwise.
    pub fn location(&self) -> String {
        if self.kind == TokenKind::Eof {
            "end".to_string()
        } else {
            format!("'{}'", self.lexeme)
        }
    }
}
