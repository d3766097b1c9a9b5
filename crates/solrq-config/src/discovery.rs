//! Configuration file discovery.
//!
//! Every `.solrq.toml` between the working directory and the filesystem root is a layer of
//! limits. Each layer is parsed as it is found, so the `root = true` marker that ends the
//! search is read from the same parse that later feeds the merge.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::debug;

use crate::{ConfigError, ParsedConfig, parse::parse_config_file};

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".solrq.toml";

/// Finds and parses the configuration layers that apply to `cwd`.
///
/// Layers come back closest first. A layer with `root = true` is the last one read: its
/// parents and the global `~/.solrq.toml` are never opened. Without a root layer the global
/// file, if any, comes last.
pub fn discover_configs(cwd: &Path) -> Result<Vec<ParsedConfig>, ConfigError> {
    let mut layers = Vec::new();

    for dir in cwd.ancestors() {
        let path = dir.join(CONFIG_FILENAME);
        if !path.is_file() {
            continue;
        }
        let layer = read_layer(path)?;
        let is_root = layer.config.is_root();
        layers.push(layer);
        if is_root {
            return Ok(layers);
        }
    }

    if let Some(global) = global_config_path().filter(|path| path.is_file())
        && !layers.iter().any(|layer| layer.path == global)
    {
        layers.push(read_layer(global)?);
    }

    Ok(layers)
}

/// Parses one layer and logs the limits it sets.
fn read_layer(path: PathBuf) -> Result<ParsedConfig, ConfigError> {
    let config = parse_config_file(&path)?;
    let limits = config.limits.as_ref();
    debug!(
        path = %path.display(),
        root = config.is_root(),
        max_query_len = ?limits.and_then(|l| l.max_query_len),
        max_depth = ?limits.and_then(|l| l.max_depth),
        "read config layer"
    );
    Ok(ParsedConfig { path, config })
}

/// Returns the path to the global configuration file (`~/.solrq.toml`).
///
/// Returns `None` if the home directory cannot be determined.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// Checks if a path is the global configuration file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}
