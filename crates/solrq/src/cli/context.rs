//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use solrq_config::Config;
use solrq_query::Limits;
use tracing::debug;

use crate::cli::args::GlobalArgs;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
    /// Limits handed to the query engine, after command-line overrides.
    pub limits: Limits,
}

impl CommandContext {
    /// Loads the current directory and configuration, then applies flag overrides.
    pub fn load(args: &GlobalArgs) -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        let limits = apply_overrides(config.limits, args);
        debug!(
            max_query_len = limits.max_query_len,
            max_depth = limits.max_depth,
            "effective query limits"
        );
        Ok(Self {
            cwd,
            config,
            limits,
        })
    }
}

/// Applies `--max-depth` and `--max-query-len` over the configured limits.
fn apply_overrides(mut limits: Limits, args: &GlobalArgs) -> Limits {
    if let Some(depth) = args.max_depth {
        limits.max_depth = depth.get();
    }
    if let Some(len) = args.max_query_len {
        limits.max_query_len = len.get();
    }
    limits
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
