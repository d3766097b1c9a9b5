//! Implementation of `solrq tokens`.

use std::process::ExitCode;

use solrq_query::{QueryError, Token, tokenize};

use crate::cli::{
    args::TokensCommand,
    context::CommandContext,
    output::{print_json, print_query_error, token_table},
};

/// Prints the token stream of a query.
pub fn run(ctx: &CommandContext, cmd: &TokensCommand) -> ExitCode {
    let tokens = match checked_tokens(ctx, &cmd.query) {
        Ok(tokens) => tokens,
        Err(err) => {
            print_query_error(&err);
            return ExitCode::FAILURE;
        }
    };

    if cmd.output.json {
        return print_json(&tokens);
    }

    println!("{}", token_table(&tokens));
    ExitCode::SUCCESS
}

/// Tokenizes `query` after applying the length limit.
fn checked_tokens(ctx: &CommandContext, query: &str) -> Result<Vec<Token>, QueryError> {
    ctx.limits.check_query_len(query)?;
    tokenize(query).map_err(|err| QueryError::from(err).with_query(query))
}
