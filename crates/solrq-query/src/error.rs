//! Error types for query lexing and parsing.
//!
//! Every failure carries an [`ErrorKind`] and a byte position into the original query so the
//! owning service can point the query's author at the offending input.

use std::{error::Error, fmt};

use serde::Serialize;
use thiserror::Error;

/// The class of a rejected query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// An opening quote with no matching close.
    UnterminatedPhrase,
    /// A quoted string whose content is empty or malformed.
    EmptyOrInvalidPhrase,
    /// A reserved word or a lone `:` used where a clause was expected.
    ReservedWordAsTerm,
    /// A binary or prefix operator with no clause after it.
    DanglingOperator,
    /// Unbalanced parentheses, or a range whose brackets disagree.
    MismatchedBrackets,
    /// A `^` with no boost factor.
    MissingBoostFactor,
    /// A range missing its `TO` keyword or one of its bounds.
    MalformedRange,
    /// A backslash that does not escape a reserved character.
    InvalidEscape,
    /// A proximity distance or boost factor that is not an unsigned decimal.
    InvalidNumber,
    /// A token that cannot appear at this point.
    UnexpectedToken,
    /// A group with nothing inside.
    EmptyGroup,
    /// An empty or whitespace-only query.
    EmptyQuery,
    /// Nesting deeper than the configured limit.
    DepthExceeded,
    /// A query longer than the configured limit.
    QueryTooLong,
}

impl ErrorKind {
    /// Returns a short human-readable label for the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnterminatedPhrase => "unterminated phrase",
            Self::EmptyOrInvalidPhrase => "empty or invalid phrase",
            Self::ReservedWordAsTerm => "reserved word used as a term",
            Self::DanglingOperator => "dangling operator",
            Self::MismatchedBrackets => "mismatched brackets",
            Self::MissingBoostFactor => "missing boost factor",
            Self::MalformedRange => "malformed range",
            Self::InvalidEscape => "invalid escape",
            Self::InvalidNumber => "invalid number",
            Self::UnexpectedToken => "unexpected token",
            Self::EmptyGroup => "empty group",
            Self::EmptyQuery => "empty query",
            Self::DepthExceeded => "nesting depth exceeded",
            Self::QueryTooLong => "query too long",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at byte {position})")]
pub struct LexError {
    /// The class of the failure.
    pub kind: ErrorKind,
    /// Error message.
    pub message: String,
    /// Byte position in input where error occurred.
    pub position: usize,
    /// The original input string.
    pub input: String,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(kind: ErrorKind, message: impl Into<String>, position: usize, input: &str) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
            input: input.to_string(),
        }
    }
}

/// Parse error with position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at byte {position}: {message}")]
pub struct ParseError {
    /// The class of the failure.
    pub kind: ErrorKind,
    /// Error message.
    pub message: String,
    /// Byte position in the input of the offending token.
    pub position: usize,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ErrorKind, message: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
        }
    }
}

/// A unified error type for query transformation.
///
/// This type provides detailed error messages with context, including
/// the original query string and a position indicator where available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// The class of the failure.
    pub kind: ErrorKind,
    /// Error message.
    pub message: String,
    /// Byte position in the query, if the failure has one.
    pub position: Option<usize>,
    /// The original query string (if available).
    pub query: Option<String>,
}

impl QueryError {
    /// Creates an error without query context.
    pub fn new(kind: ErrorKind, message: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
            query: None,
        }
    }

    /// Sets the query string for this error.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Returns the class of the failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message without context.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self.kind {
            ErrorKind::UnterminatedPhrase => Some("Add a closing quote (\") to complete the phrase"),
            ErrorKind::DanglingOperator => {
                Some("Operators need a clause after them, e.g. 'a AND b' or 'NOT a'")
            }
            ErrorKind::ReservedWordAsTerm => {
                Some("Escape reserved characters with a backslash, e.g. 'a\\:b'")
            }
            ErrorKind::MismatchedBrackets => {
                Some("Close every '(' with ')' and pair range brackets as [..] or {..}")
            }
            ErrorKind::MissingBoostFactor => Some("Boosts need a number, e.g. 'word^2'"),
            ErrorKind::MalformedRange => {
                Some("Ranges look like field:[low TO high] or field:{low TO high}")
            }
            ErrorKind::InvalidEscape => {
                Some("Only reserved characters such as \\( \\: \\\" \\\\ can be escaped")
            }
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "query syntax error: {}", self.message)?;

        if let Some(query) = &self.query {
            writeln!(f, "  {query}")?;
            if let Some(pos) = self.position {
                let clamped = pos.min(query.len());
                // Caret column counts characters, not bytes.
                let column = query.get(..clamped).map_or(clamped, |p| p.chars().count());
                writeln!(f, "  {}^", " ".repeat(column))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "hint: {suggestion}")?;
        }

        Ok(())
    }
}

impl Error for QueryError {}

impl From<LexError> for QueryError {
    fn from(err: LexError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
            position: Some(err.position),
            query: Some(err.input),
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
            position: Some(err.position),
            query: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = QueryError::from(LexError::new(
            ErrorKind::UnterminatedPhrase,
            "unterminated phrase",
            0,
            "\"hello world",
        ));
        let display = err.to_string();
        assert!(display.contains("unterminated phrase"));
        assert!(display.contains("\"hello world"));
        assert!(display.contains("^"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn parse_error_display_points_at_position() {
        let err = QueryError::from(ParseError::new(
            ErrorKind::DanglingOperator,
            "expected a clause after 'AND'",
            2,
        ))
        .with_query("a AND");
        let display = err.to_string();
        assert!(display.contains("expected a clause after 'AND'"));
        assert!(display.contains("  a AND\n    ^\n"));
        assert!(display.contains("hint: Operators need"));
    }

    #[test]
    fn caret_counts_characters() {
        let err = QueryError::new(ErrorKind::UnexpectedToken, "unexpected '^'", Some(3))
            .with_query("é ^");
        assert!(err.to_string().contains("  é ^\n    ^\n"));
    }

    #[test]
    fn position_is_clamped() {
        let err = QueryError::new(ErrorKind::UnexpectedToken, "oops", Some(99)).with_query("ab");
        assert!(err.to_string().contains("  ab\n    ^\n"));
    }

    #[test]
    fn error_with_query() {
        let err = QueryError::new(ErrorKind::EmptyQuery, "test error", None).with_query("xyz");
        assert_eq!(err.query.as_deref(), Some("xyz"));
        assert!(!err.to_string().contains('^'));
    }

    #[test]
    fn kinds_without_hint() {
        let err = QueryError::new(ErrorKind::EmptyQuery, "empty query", None);
        assert!(err.suggestion().is_none());
        assert_eq!(err.kind(), ErrorKind::EmptyQuery);
        assert_eq!(err.message(), "empty query");
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::MissingBoostFactor).unwrap();
        assert_eq!(json, "\"missing_boost_factor\"");
    }
}
