//! Implementation of `solrq transform`.

use std::process::ExitCode;

use solrq_query::transform_with_limits;
use tracing::info;

use crate::cli::{
    args::TransformCommand,
    context::CommandContext,
    output::{JsonError, JsonTransformResult, print_json, print_query_error},
};

/// Transforms each query, continuing past failures.
///
/// Exits with failure if any query was rejected.
pub fn run(ctx: &CommandContext, cmd: &TransformCommand) -> ExitCode {
    let mut failed = 0;
    let mut results = Vec::with_capacity(cmd.queries.len());

    for query in &cmd.queries {
        match transform_with_limits(query, &ctx.limits) {
            Ok(canonical) => {
                if !cmd.output.json {
                    println!("{canonical}");
                }
                results.push(JsonTransformResult {
                    query,
                    canonical: Some(canonical),
                    error: None,
                });
            }
            Err(err) => {
                failed += 1;
                if !cmd.output.json {
                    print_query_error(&err);
                }
                results.push(JsonTransformResult {
                    query,
                    canonical: None,
                    error: Some(JsonError::from(&err)),
                });
            }
        }
    }

    info!(queries = cmd.queries.len(), failed, "transform finished");

    let output_code = if cmd.output.json {
        print_json(&results)
    } else {
        ExitCode::SUCCESS
    };

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        output_code
    }
}
