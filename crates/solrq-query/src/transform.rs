//! The tokenize → parse → render pipeline.

use tracing::debug;

use crate::{
    ast::ClauseList,
    error::QueryError,
    lexer::tokenize,
    limits::Limits,
    parser::parse_with_limits,
    render::render,
};

/// Parses a query string into an AST with the default limits.
pub fn parse_query(input: &str) -> Result<ClauseList, QueryError> {
    parse_query_with_limits(input, &Limits::default())
}

/// Parses a query string into an AST.
pub fn parse_query_with_limits(input: &str, limits: &Limits) -> Result<ClauseList, QueryError> {
    let result = tokenize_and_parse(input, limits);
    if let Err(err) = &result {
        debug!(kind = %err.kind, position = ?err.position, "query rejected");
    }
    result
}

/// Transforms a query string into its canonical form with the default limits.
pub fn transform(input: &str) -> Result<String, QueryError> {
    transform_with_limits(input, &Limits::default())
}

/// Transforms a query string into its canonical form.
///
/// The whole query is rejected on the first error; no partial output is produced.
pub fn transform_with_limits(input: &str, limits: &Limits) -> Result<String, QueryError> {
    let list = parse_query_with_limits(input, limits)?;
    let canonical = render(&list);
    debug!(canonical_len = canonical.len(), "rendered canonical query");
    Ok(canonical)
}

/// Runs the lexer and parser, attaching the query to any error.
fn tokenize_and_parse(input: &str, limits: &Limits) -> Result<ClauseList, QueryError> {
    limits
        .check_query_len(input)
        .map_err(|err| err.with_query(input))?;

    let tokens = tokenize(input)?;
    debug!(tokens = tokens.len(), "tokenized query");

    let list = parse_with_limits(&tokens, limits)
        .map_err(|err| QueryError::from(err).with_query(input))?;
    debug!(
        leading = list.leading.len(),
        chain_len = list.chain_len(),
        "parsed query"
    );

    Ok(list)
}
