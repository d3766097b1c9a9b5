//! Configuration system for solrq.
//!
//! solrq uses TOML configuration files named `.solrq.toml`. Configuration is resolved by walking
//! up the directory tree from the current working directory, collecting any `.solrq.toml` files
//! found, then loading `~/.solrq.toml` as the global config with lowest precedence.
//!
//! ```toml
//! root = true
//!
//! [limits]
//! max_query_len = 4096
//! max_depth = 32
//! ```

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
#[cfg(test)]
mod test_support;

use std::path::{Path, PathBuf};

pub use discovery::{CONFIG_FILENAME, discover_configs, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{RawConfig, RawLimits, parse_config_file, parse_config_str};
use serde::Serialize;
use solrq_query::Limits;

/// Top-level merged configuration for solrq.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.solrq.toml` files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Query limits handed to the engine.
    pub limits: Limits,
    /// Files the limits were merged from, highest precedence first.
    pub sources: Vec<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.solrq.toml` files.
    ///
    /// Layers are read from `cwd` upwards until a `root = true` file, then `~/.solrq.toml`
    /// unless a root was found. The closest layer wins for every setting.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        merge_configs(&discover_configs(cwd)?)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    ///
    /// Returns `Ok(Config::default())` if the list is empty.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// The output has the same shape as a `.solrq.toml` file.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            limits: &self.limits,
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Query limits.
    limits: &'a Limits,
}
