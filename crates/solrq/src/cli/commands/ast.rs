//! Implementation of `solrq ast`.

use std::process::ExitCode;

use solrq_query::parse_query_with_limits;

use crate::cli::{
    args::AstCommand,
    context::CommandContext,
    output::{print_json, print_query_error},
};

/// Prints the parsed tree of a query.
pub fn run(ctx: &CommandContext, cmd: &AstCommand) -> ExitCode {
    let list = match parse_query_with_limits(&cmd.query, &ctx.limits) {
        Ok(list) => list,
        Err(err) => {
            print_query_error(&err);
            return ExitCode::FAILURE;
        }
    };

    if cmd.output.json {
        return print_json(&list);
    }

    print!("{list}");
    ExitCode::SUCCESS
}
