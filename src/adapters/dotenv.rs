// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dotenv file configuration source adapter.
//!
//! The grammar is line oriented:
//!
//! ```text
//! # comment
//! DATABASE_HOST=localhost
//! GREETING="hello world"
//! ```
//!
//! Keys are lower-cased and `_` becomes `.`, so the example yields the dotted
//! keys `database.host` and `greeting`. The merge engine expands the dots into
//! nesting when the tree is folded into the store.

use crate::adapters::read_limited;
use crate::domain::{ConfigError, ConfigTree, ConfigValue, Result};
use crate::ports::{ConfigParser, ConfigSource};
use std::path::{Path, PathBuf};

/// Maximum allowed dotenv file size (1MB)
const MAX_DOTENV_FILE_SIZE: u64 = 1024 * 1024;

/// Default priority, matching the builder's dotenv band.
pub const DOTENV_PRIORITY: i32 = 25;

/// Parser for `KEY=VALUE` dotenv content.
///
/// Blank lines and lines starting with `#` are ignored. Any other line
/// without an `=`, or with an empty key, fails the whole parse with
/// [`ConfigError::InvalidLine`].
///
/// # Examples
///
/// ```rust
/// use tierconf::adapters::DotenvParser;
/// use tierconf::domain::ConfigValue;
/// use tierconf::ports::ConfigParser;
///
/// let tree = DotenvParser::new().parse("DEBUG=true\nNAME=\"John Doe\"").unwrap();
/// assert_eq!(tree["debug"], ConfigValue::Bool(true));
/// assert_eq!(tree["name"], ConfigValue::from("John Doe"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DotenvParser;

impl DotenvParser {
    /// Creates a new dotenv parser.
    pub fn new() -> Self {
        DotenvParser
    }
}

impl ConfigParser for DotenvParser {
    fn parse(&self, content: &str) -> Result<ConfigTree> {
        let mut tree = ConfigTree::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let invalid = || ConfigError::InvalidLine {
                line: index + 1,
                content: line.to_string(),
            };
            let (key, value) = line.split_once('=').ok_or_else(invalid)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(invalid());
            }

            tree.insert(
                key.to_lowercase().replace('_', "."),
                infer_value(unquote(value.trim())),
            );
        }

        Ok(tree)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["env"]
    }
}

/// Strips one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn infer_value(raw: &str) -> ConfigValue {
    match raw {
        "true" => ConfigValue::Bool(true),
        "false" => ConfigValue::Bool(false),
        _ => ConfigValue::parse_number(raw).unwrap_or_else(|| ConfigValue::from(raw)),
    }
}

/// Configuration source adapter for dotenv files.
///
/// The file is re-read on every load.
///
/// # Examples
///
/// ```rust,no_run
/// use tierconf::adapters::DotenvFileAdapter;
/// use tierconf::ports::ConfigSource;
///
/// let adapter = DotenvFileAdapter::new(".env");
/// let tree = adapter.load().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DotenvFileAdapter {
    file_path: PathBuf,
    name: String,
    priority: i32,
    parser: DotenvParser,
}

impl DotenvFileAdapter {
    /// Creates an adapter for `path`. A missing file surfaces on load.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let file_path = path.as_ref().to_path_buf();
        Self {
            name: format!("dotenv:{}", file_path.display()),
            file_path,
            priority: DOTENV_PRIORITY,
            parser: DotenvParser::new(),
        }
    }

    /// Sets the source priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the path to the dotenv file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

impl ConfigSource for DotenvFileAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn load(&self) -> Result<ConfigTree> {
        let content = read_limited(&self.name, &self.file_path, MAX_DOTENV_FILE_SIZE)?;
        let tree = self.parser.parse(&content)?;
        tracing::debug!(source = %self.name, keys = tree.len(), "Loaded dotenv file");
        Ok(tree)
    }
}
