use crate::token::{Lit, Token};
use logos::{Lexer, Logos};
use miro_source::{Source, SyntaxError, SyntaxErrorKind};

#[derive(Debug, Logos, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // literals
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,
    #[regex(r#""[^"]*""#)]
    Str,
    /// A string opened but never closed before end of input. Reported by
    /// the scanner, never emitted as a token.
    #[regex(r#""[^"]*"#)]
    UnterminatedStr,

    // identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    // one or two character operators
    #[token("!")]
    Bang,
    #[token("!=")]
    BangEqual,
    #[token("=")]
    Equal,
    #[token("==")]
    EqualEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token("-")]
    Minus, // NOTE: can also be unary
    #[token("+")]
    Plus,
    #[token("/")]
    Slash,
    #[token("*")]
    Star,

    // punctuation
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
    #[token(";")]
    Semicolon,

    // keywords
    #[token("and")]
    And,
    #[token("class")]
    Class,
    #[token("else")]
    Else,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("fun")]
    Fun,
    #[token("if")]
    If,
    #[token("nil")]
    Nil,
    #[token("or")]
    Or,
    #[token("print")]
    Print,
    #[token("return")]
    Return,
    #[token("super")]
    Super,
    #[token("this")]
    This,
    #[token("true")]
    True,
    #[token("var")]
    Var,
    #[token("while")]
    While,

    // misc
    #[regex(r"[ \t\n\r\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)] // single line comments
    #[error]
    Error,

    /// Appended by the scanner at the true end of input.
    Eof,
}

impl TokenKind {
    /// Returns the binary binding power or `None` if invalid binop token.
    /// Binding power `0` and `1` is reserved for accepting any expression.
    /// Assignment (`TokenKind::Equal`) has the lowest precedence with `(2, 1)`.
    pub fn binop_bp(&self) -> Option<(u8, u8)> {
        match self {
            /* Assignment */
            TokenKind::Equal => Some((2, 1)),
            /* Logical */
            TokenKind::Or => Some((3, 4)),
            TokenKind::And => Some((5, 6)),
            /* Equality */
            TokenKind::EqualEqual | TokenKind::BangEqual => Some((7, 8)),
            /* Comparison */
            TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::Less
            | TokenKind::LessEqual => Some((9, 10)),
            /* Additive */
            TokenKind::Plus | TokenKind::Minus => Some((11, 12)),
            /* Multiplicative */
            TokenKind::Star | TokenKind::Slash => Some((13, 14)),
            _ => None,
        }
    }
}

/// Converts source text into a flat token sequence.
///
/// Character recognition is the derived [`TokenKind`] automaton; this
/// wrapper keeps the line cursor, decodes literal payloads and reports
/// scan errors. Scanning always runs to the end of input: unrecognized
/// characters and unterminated strings are reported to the source's error
/// sink and skipped, and an [`TokenKind::Eof`] token is always appended.
pub struct Scanner<'a> {
    lexer: Lexer<'a, TokenKind>,
    /// Source code
    source: &'a Source<'a>,
    /// 1-based line of the scan position.
    line: usize,
    /// End offset of the last lexeme considered, for line counting over
    /// skipped whitespace and comments.
    last_end: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a Source<'a>) -> Self {
        Self {
            lexer: TokenKind::lexer(source.content),
            source,
            line: 1,
            last_end: 0,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(kind) = self.lexer.next() {
            let span = self.lexer.span();
            let lexeme = self.lexer.slice().to_string();

            // A token's line is the line its lexeme starts on; the cursor
            // still advances past newlines inside multi-line strings.
            self.advance_line_to(span.start);
            let line = self.line;
            self.advance_line_to(span.end);

            match kind {
                TokenKind::Error => {
                    self.source.errors.add_error(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedCharacter,
                        line,
                        "Unexpected character.",
                    ));
                }
                TokenKind::UnterminatedStr => {
                    self.source.errors.add_error(SyntaxError::new(
                        SyntaxErrorKind::UnterminatedString,
                        line,
                        "Unterminated string.",
                    ));
                }
                kind => {
                    let literal = decode_literal(kind, &lexeme);
                    tokens.push(Token::new(kind, lexeme, literal, line));
                }
            }
        }

        self.advance_line_to(self.source.content.len());
        tokens.push(Token::new(TokenKind::Eof, String::new(), None, self.line));
        tokens
    }

    fn advance_line_to(&mut self, offset: usize) {
        let gap = &self.source.content[self.last_end..offset];
        self.line += gap.matches('\n').count();
        self.last_end = offset;
    }
}

fn decode_literal(kind: TokenKind, lexeme: &str) -> Option<Lit> {
    match kind {
        TokenKind::Number => lexeme.parse().ok().map(Lit::Number),
        TokenKind::Str => Some(Lit::Str(lexeme[1..lexeme.len() - 1].to_string())),
        _ => None,
    }
}
