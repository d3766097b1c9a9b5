//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use solrq_query::{ErrorKind, QueryError, Token};

/// JSON output for one transformed query.
#[derive(Serialize)]
pub struct JsonTransformResult<'a> {
    /// The original query string.
    pub query: &'a str,
    /// Canonical form, when the query was accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    /// Rejection details, when the query failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

/// JSON form of a rejected query.
#[derive(Serialize)]
pub struct JsonError {
    /// Error class.
    pub kind: ErrorKind,
    /// Error message without context.
    pub message: String,
    /// Byte offset of the problem, if known.
    pub position: Option<usize>,
}

impl From<&QueryError> for JsonError {
    fn from(err: &QueryError) -> Self {
        Self {
            kind: err.kind(),
            message: err.message().to_string(),
            position: err.position,
        }
    }
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json_str) => {
            println!("{json_str}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints a rejected query with its caret diagnostic on stderr.
pub fn print_query_error(err: &QueryError) {
    eprintln!("{}", err.to_string().trim_end());
}

/// Builds the token table printed by `solrq tokens`.
pub fn token_table(tokens: &[Token]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Kind", "Text", "Span"]);
    for token in tokens {
        table.add_row(vec![
            Cell::new(token.kind.name()),
            Cell::new(&token.text),
            Cell::new(format!("{}..{}", token.span.start, token.span.end)),
        ]);
    }
    table
}
