//! Parse Errors
//!
//! Every failure is fatal to the parser instance that raised it. Errors carry
//! the byte position where the failing production started, plus the line and
//! column derived from it for human-readable diagnostics.

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the parser
pub type Result<T> = std::result::Result<T, ParseError>;

/// Category of a fatal parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed tag, attribute, or declaration syntax; mismatched end tags,
    /// extra top-level content, duplicate attributes
    Structural,
    /// Undefined prefix, illegal `xml`/`xmlns` binding, colliding expanded names
    Namespace,
    /// Entity expansion count or expanded text size exceeded
    SecurityLimit,
    /// Input ran out while a closing token or declaration was still expected
    EndOfInput,
}

impl ErrorKind {
    /// Short name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Structural => "structural error",
            ErrorKind::Namespace => "namespace error",
            ErrorKind::SecurityLimit => "security limit exceeded",
            ErrorKind::EndOfInput => "unexpected end of input",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal parse error anchored to a position in the input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message} (line {line}, column {column})")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    /// Byte offset into the decoded input
    pub position: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, position: usize) -> Self {
        ParseError {
            kind,
            message: message.into(),
            position,
            line: 1,
            column: position + 1,
        }
    }

    /// Attach line/column information
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn structural(message: impl Into<String>, position: usize) -> Self {
        Self::new(ErrorKind::Structural, message, position)
    }

    pub fn namespace(message: impl Into<String>, position: usize) -> Self {
        Self::new(ErrorKind::Namespace, message, position)
    }

    pub fn security_limit(message: impl Into<String>, position: usize) -> Self {
        Self::new(ErrorKind::SecurityLimit, message, position)
    }

    pub fn end_of_input(message: impl Into<String>, position: usize) -> Self {
        Self::new(ErrorKind::EndOfInput, message, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_location() {
        let err = ParseError::structural("Duplicate attribute \"x\"", 12).at(2, 5);
        assert_eq!(
            err.to_string(),
            "structural error: Duplicate attribute \"x\" (line 2, column 5)"
        );
    }

    #[test]
    fn test_kind_constructors() {
        assert_eq!(ParseError::namespace("m", 0).kind, ErrorKind::Namespace);
        assert_eq!(ParseError::security_limit("m", 0).kind, ErrorKind::SecurityLimit);
        assert_eq!(ParseError::end_of_input("m", 0).kind, ErrorKind::EndOfInput);
    }
}
