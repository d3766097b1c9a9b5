//! Clap argument definitions for the `solrq` CLI.

use std::num::NonZeroUsize;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "solrq")]
#[command(about = "Transform search queries into their canonical index form")]
pub struct Cli {
    #[command(flatten)]
    /// Flags shared by every subcommand.
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Maximum nesting depth of groups, fields and prefixes [default: 64]
    #[arg(long, global = true)]
    pub max_depth: Option<NonZeroUsize>,

    /// Maximum query length in bytes [default: 8192]
    #[arg(long, global = true)]
    pub max_query_len: Option<NonZeroUsize>,
}

/// Shared output mode flags.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `solrq transform`.
#[derive(Args, Debug, Clone)]
pub struct TransformCommand {
    /// Queries to transform
    #[arg(required = true)]
    pub queries: Vec<String>,

    #[command(flatten)]
    /// Output formatting flags.
    pub output: OutputArgs,
}

/// Arguments for `solrq tokens`.
#[derive(Args, Debug, Clone)]
pub struct TokensCommand {
    /// Query to tokenize
    pub query: String,

    #[command(flatten)]
    /// Output formatting flags.
    pub output: OutputArgs,
}

/// Arguments for `solrq ast`.
#[derive(Args, Debug, Clone)]
pub struct AstCommand {
    /// Query to parse
    pub query: String,

    #[command(flatten)]
    /// Output formatting flags.
    pub output: OutputArgs,
}

/// Supported `solrq` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the canonical form of each query
    Transform(TransformCommand),

    /// Show the tokens a query is split into
    Tokens(TokensCommand),

    /// Show the parsed query tree
    Ast(AstCommand),

    /// Show effective configuration settings
    Config,
}
