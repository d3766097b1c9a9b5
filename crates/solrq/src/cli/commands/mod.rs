//! Command implementations and dispatch.

pub mod ast;
pub mod config;
pub mod tokens;
pub mod transform;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Transform(cmd) => transform::run(ctx, &cmd),
        Commands::Tokens(cmd) => tokens::run(ctx, &cmd),
        Commands::Ast(cmd) => ast::run(ctx, &cmd),
        Commands::Config => config::run(ctx),
    }
}
