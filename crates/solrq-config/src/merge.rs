//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`, applying precedence
//! rules and validating the result.

use std::path::{Path, PathBuf};

use tracing::debug;

use solrq_query::Limits;

use crate::{
    Config, ConfigError,
    parse::{RawConfig, RawLimits},
};

/// A parsed config file with its source path.
#[derive(Debug)]
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config). For every setting the first defined value wins.
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    if configs.is_empty() {
        return Ok(Config::default());
    }

    let limits = merge_limits(configs)?;
    let sources = configs.iter().map(|c| c.path.clone()).collect();

    debug!(
        files = configs.len(),
        max_query_len = limits.max_query_len,
        max_depth = limits.max_depth,
        "merged configuration"
    );

    Ok(Config { limits, sources })
}

/// Merges limit settings, taking the first defined value for each field.
fn merge_limits(configs: &[ParsedConfig]) -> Result<Limits, ConfigError> {
    let mut result = Limits::default();

    // Iterate in reverse (lowest precedence first) so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(ref limits) = parsed.config.limits {
            apply_raw_limits(&mut result, limits, &parsed.path)?;
        }
    }

    Ok(result)
}

/// Applies raw limits to result, overwriting any present values.
fn apply_raw_limits(
    result: &mut Limits,
    raw: &RawLimits,
    path: &Path,
) -> Result<(), ConfigError> {
    if let Some(v) = raw.max_query_len {
        result.max_query_len = nonzero(v, "max_query_len", path)?;
    }
    if let Some(v) = raw.max_depth {
        result.max_depth = nonzero(v, "max_depth", path)?;
    }
    Ok(())
}

/// Rejects a zero limit.
fn nonzero(value: usize, key: &'static str, path: &Path) -> Result<usize, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidLimit {
            path: path.to_path_buf(),
            key,
        });
    }
    Ok(value)
}
