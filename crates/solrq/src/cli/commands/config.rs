//! Implementation of `solrq config`.

use std::process::ExitCode;

use solrq_config::{Config, is_global_config};

use crate::cli::context::CommandContext;

/// Shows the config files in effect and the merged settings, flag overrides included.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let effective = Config {
        limits: ctx.limits,
        sources: ctx.config.sources.clone(),
    };

    let toml = match effective.settings_to_toml() {
        Ok(toml) => toml,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if effective.sources.is_empty() {
        println!("# no config files found, using defaults");
    } else {
        println!("# config files (highest precedence first):");
        for path in &effective.sources {
            let scope = if is_global_config(path) { " (global)" } else { "" };
            println!("#   {}{scope}", path.display());
        }
    }
    println!();
    print!("{toml}");
    ExitCode::SUCCESS
}
