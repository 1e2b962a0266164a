//! Source code representation and diagnostic management.

use std::{cell::RefCell, fmt};

/// Represents source code.
pub struct Source<'a> {
    /// Original source code.
    pub content: &'a str,
    /// Accumulated diagnostics.
    pub errors: ErrorReporter,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            errors: ErrorReporter::new(),
        }
    }

    /// Returns `true` if `Source` has no accumulated errors. Returns `false` otherwise.
    pub fn has_no_errors(&self) -> bool {
        self.errors.errors.borrow().is_empty()
    }
}

impl<'a> Into<Source<'a>> for &'a str {
    fn into(self) -> Source<'a> {
        Source::new(self)
    }
}

/// Classification of a static (scan or parse time) error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    UnexpectedCharacter,
    UnterminatedString,
    UnexpectedToken,
    InvalidAssignmentTarget,
    TooManyParameters,
    TooManyArguments,
}

/// Represents a syntax error (compile time error).
///
/// Carries everything a host needs to format the diagnostic itself: the
/// error `kind`, the 1-based source `line`, an optional `location` hint
/// (the offending lexeme, or `"end"` at end of input) and a message.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub line: usize,
    pub location: Option<String>,
    pub message: String,
}

impl SyntaxError {
    /// Create a new syntax error with the specified `kind`, `line` and `message`.
    pub fn new(kind: SyntaxErrorKind, line: usize, message: impl ToString) -> Self {
        Self {
            kind,
            line,
            location: None,
            message: message.to_string(),
        }
    }

    /// Attach a location hint (usually the offending lexeme).
    pub fn with_location(mut self, location: impl ToString) -> Self {
        self.location = Some(location.to_string());
        self
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(
                f,
                "[line {line}] Error at {location}: {message}",
                line = self.line,
                location = location,
                message = self.message
            ),
            None => write!(
                f,
                "[line {line}] Error: {message}",
                line = self.line,
                message = self.message
            ),
        }
    }
}

/// Manages all the errors.
pub struct ErrorReporter {
    errors: RefCell<Vec<SyntaxError>>,
}

impl ErrorReporter {
    /// Create an empty `ErrorReporter`.
    pub fn new() -> Self {
        Self {
            errors: RefCell::new(Vec::new()),
        }
    }

    /// Adds an error to the `ErrorReporter`.
    /// This method uses the interior mutability pattern. This does not require mutability for ergonomics.
    pub fn add_error(&self, error: SyntaxError) {
        // This should be the only place where self.errors is borrowed mutably.
        self.errors.borrow_mut().push(error);
    }

    /// Returns a copy of every diagnostic collected so far.
    pub fn collected(&self) -> Vec<SyntaxError> {
        self.errors.borrow().clone()
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors.borrow();
        for error in errors.iter() {
            writeln!(f, "{}", error)?;
        }

        Ok(())
    }
}
