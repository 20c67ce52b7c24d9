// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML file configuration source adapter.
//!
//! This module provides an adapter that reads configuration trees from YAML files.

use crate::adapters::read_limited;
use crate::domain::{ConfigError, ConfigTree, ConfigValue, Result};
use crate::ports::{ConfigParser, ConfigSource};
use directories::ProjectDirs;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Maximum allowed file size for YAML configuration files (10MB)
/// This prevents denial of service attacks via extremely large files
const MAX_YAML_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default priority, matching the builder's file band.
pub const FILE_PRIORITY: i32 = 30;

/// YAML parser implementation.
///
/// Mappings become nested trees and sequences become lists. Scalars keep
/// their YAML type; `null` becomes the empty string.
///
/// # Examples
///
/// ```rust
/// use tierconf::adapters::YamlParser;
/// use tierconf::domain::ConfigValue;
/// use tierconf::ports::ConfigParser;
///
/// let parser = YamlParser::new();
/// let yaml_content = "database:\n  host: localhost\n  port: 5432";
/// let result = parser.parse(yaml_content).unwrap();
/// let database = result["database"].as_tree().unwrap();
/// assert_eq!(database["port"], ConfigValue::Int(5432));
/// ```
#[derive(Debug, Clone)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }

    fn convert(value: Value) -> Option<ConfigValue> {
        match value {
            Value::Null => Some(ConfigValue::String(String::new())),
            Value::Bool(b) => Some(ConfigValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(ConfigValue::Int(i))
                } else {
                    n.as_f64().map(ConfigValue::Float)
                }
            }
            Value::String(s) => Some(ConfigValue::String(s)),
            Value::Sequence(seq) => Some(ConfigValue::List(
                seq.into_iter().filter_map(Self::convert).collect(),
            )),
            Value::Mapping(map) => Some(ConfigValue::Tree(Self::convert_mapping(map))),
            Value::Tagged(tagged) => Self::convert(tagged.value),
        }
    }

    fn convert_mapping(map: serde_yaml::Mapping) -> ConfigTree {
        let mut tree = ConfigTree::new();
        for (key, value) in map {
            let key = match key {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    tracing::debug!(key = ?other, "Skipping non-scalar YAML mapping key");
                    continue;
                }
            };
            if let Some(value) = Self::convert(value) {
                tree.insert(key, value);
            }
        }
        tree
    }
}

impl Default for YamlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> Result<ConfigTree> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to parse YAML: {}", e),
            source: Some(Box::new(e)),
        })?;

        match value {
            Value::Null => Ok(ConfigTree::new()),
            Value::Mapping(map) => Ok(Self::convert_mapping(map)),
            other => Err(ConfigError::ParseError {
                message: format!(
                    "YAML document root must be a mapping, found {}",
                    yaml_kind(&other)
                ),
                source: None,
            }),
        }
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Configuration source adapter for YAML files.
///
/// The file is re-read on every load, so scheduled reloads observe edits. A
/// missing, oversized or malformed file fails the load.
///
/// # Examples
///
/// ```rust,no_run
/// use tierconf::adapters::YamlFileAdapter;
/// use tierconf::ports::ConfigSource;
///
/// // Load from a specific file
/// let adapter = YamlFileAdapter::from_file("/path/to/config.yaml").unwrap();
///
/// // Load from default OS location
/// let adapter = YamlFileAdapter::from_default_location("myapp", "com.example").unwrap();
/// let tree = adapter.load().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct YamlFileAdapter {
    /// Path to the YAML file
    file_path: PathBuf,
    name: String,
    priority: i32,
    parser: YamlParser,
}

impl YamlFileAdapter {
    /// Creates an adapter for `path` without touching the filesystem.
    ///
    /// A missing file surfaces on the first load.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let file_path = path.as_ref().to_path_buf();
        Self {
            name: format!("yaml:{}", file_path.display()),
            file_path,
            priority: FILE_PRIORITY,
            parser: YamlParser::new(),
        }
    }

    /// Creates a new YAML file adapter from an existing file.
    ///
    /// The path is canonicalized up front.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is inaccessible.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref();

        // Canonicalize path to prevent directory traversal attacks
        let canonical_path = file_path.canonicalize().map_err(|e| {
            ConfigError::source_error(
                "yaml-file",
                format!("Invalid or inaccessible path: {}", display_name(file_path)),
                e,
            )
        })?;

        Ok(Self::new(canonical_path))
    }

    /// Creates a new YAML file adapter from the default OS-appropriate location,
    /// `<config dir>/config.yaml`.
    ///
    /// This method uses the `directories` crate to determine the appropriate
    /// configuration directory for the current operating system.
    ///
    /// # Arguments
    ///
    /// * `app_name` - The application name (e.g., "myapp")
    /// * `qualifier` - The organization/qualifier (e.g., "com.example")
    pub fn from_default_location(app_name: &str, qualifier: &str) -> Result<Self> {
        Self::with_filename(app_name, qualifier, "config.yaml")
    }

    /// Creates a new YAML file adapter with a custom file name in the default location.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use tierconf::adapters::YamlFileAdapter;
    ///
    /// let adapter = YamlFileAdapter::with_filename("myapp", "com.example", "settings.yaml").unwrap();
    /// ```
    pub fn with_filename(app_name: &str, qualifier: &str, filename: &str) -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| ConfigError::SourceError {
                source_name: "yaml-file".to_string(),
                message: "Failed to determine project directories".to_string(),
                source: None,
            })?;

        Self::from_file(proj_dirs.config_dir().join(filename))
    }

    /// Sets the source priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the path to the configuration file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

fn display_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
}

impl ConfigSource for YamlFileAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn load(&self) -> Result<ConfigTree> {
        let content = read_limited(&self.name, &self.file_path, MAX_YAML_FILE_SIZE)?;
        let tree = self.parser.parse(&content)?;
        tracing::debug!(source = %self.name, top_level_keys = tree.len(), "Loaded YAML file");
        Ok(tree)
    }
}
