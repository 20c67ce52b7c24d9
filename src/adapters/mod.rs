// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing configuration source implementations.
//!
//! This module contains concrete implementations of the `ConfigSource`
//! trait (environment, dotenv, YAML and in-memory maps) and of the
//! `ConfigWatcher` trait.

#[cfg(feature = "dotenv")]
pub mod dotenv;
#[cfg(feature = "env")]
pub mod env_var;
pub mod map;
#[cfg(feature = "yaml")]
pub mod yaml_file;

pub mod watchers;

// Re-export adapters based on feature flags
#[cfg(feature = "dotenv")]
pub use dotenv::{DotenvFileAdapter, DotenvParser};
#[cfg(feature = "env")]
pub use env_var::EnvVarAdapter;
pub use map::MapAdapter;
#[cfg(feature = "watch")]
pub use watchers::FileWatcher;
#[cfg(feature = "yaml")]
pub use yaml_file::{YamlFileAdapter, YamlParser};

#[cfg(any(feature = "yaml", feature = "dotenv"))]
use crate::domain::{ConfigError, Result};

/// Reads a configuration file as UTF-8, refusing files above `max_size` bytes.
#[cfg(any(feature = "yaml", feature = "dotenv"))]
pub(crate) fn read_limited(
    source_name: &str,
    path: &std::path::Path,
    max_size: u64,
) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>");

    // Check file size before reading to prevent DoS via large files
    let metadata = std::fs::metadata(path).map_err(|e| {
        ConfigError::source_error(
            source_name,
            format!("Failed to read file metadata: {}", file_name),
            e,
        )
    })?;
    if metadata.len() > max_size {
        return Err(ConfigError::SourceError {
            source_name: source_name.to_string(),
            message: format!(
                "Configuration file too large: {} bytes (max {} bytes)",
                metadata.len(),
                max_size
            ),
            source: None,
        });
    }

    std::fs::read_to_string(path).map_err(|e| {
        ConfigError::source_error(
            source_name,
            format!("Failed to read configuration file: {}", file_name),
            e,
        )
    })
}
