//! Error types for solrq configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use toml::{de, ser};

/// Errors that can occur when loading or processing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// A limit was set to a value the query engine cannot work with.
    #[error("invalid value for limits.{key} in {path}: must be at least 1")]
    InvalidLimit {
        /// Config file that set the value.
        path: PathBuf,
        /// Name of the offending limit.
        key: &'static str,
    },

    /// Failed to serialize the effective settings.
    #[error("failed to serialize settings: {0}")]
    SerializeToml(#[from] ser::Error),
}
