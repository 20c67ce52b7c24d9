// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable configuration source adapter.
//!
//! This module provides an adapter that turns the process environment into a
//! nested configuration tree.

use crate::domain::tree::descend;
use crate::domain::{ConfigTree, ConfigValue, Result};
use crate::ports::ConfigSource;
use std::collections::{BTreeMap, HashMap};
use std::env;

/// Maximum length for environment variable keys (prevents DoS)
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values (prevents DoS)
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// Default priority, matching the builder's environment band.
pub const ENV_PRIORITY: i32 = 20;

/// Configuration source adapter for environment variables.
///
/// Every load enumerates the environment afresh. With a prefix set, only
/// variables starting with it are kept and the prefix is stripped. Names are
/// lower-cased and each `_`-separated segment becomes one level of nesting,
/// so `APP_SERVER_PORT=9090` with prefix `APP_` yields
/// `{server: {port: 9090}}`.
///
/// A literal underscore inside a leaf name cannot be told apart from a
/// nesting separator: `APP_MAX_CONNS` becomes `{max: {conns: ..}}`.
///
/// Values are inferred in order: boolean literals (`true`, `TRUE`, `yes`,
/// `YES`, `1` and their false counterparts `false`, `FALSE`, `no`, `NO`,
/// `0`), then integer, then float, else string.
///
/// # Examples
///
/// ```rust
/// use tierconf::adapters::EnvVarAdapter;
/// use tierconf::ports::ConfigSource;
/// use std::collections::HashMap;
///
/// let mut vars = HashMap::new();
/// vars.insert("APP_SERVER_PORT".to_string(), "9090".to_string());
/// vars.insert("OTHER".to_string(), "ignored".to_string());
///
/// let adapter = EnvVarAdapter::with_prefix("APP_").with_values(vars);
/// let tree = adapter.load().unwrap();
/// assert_eq!(adapter.name(), "env:APP_");
/// assert!(tree["server"].as_tree().unwrap().contains_key("port"));
/// ```
#[derive(Debug, Clone)]
pub struct EnvVarAdapter {
    /// Optional prefix to filter environment variables
    prefix: Option<String>,
    /// Name used in diagnostics; includes the prefix
    name: String,
    priority: i32,
    /// Fixed variable table used instead of the process environment
    values: Option<HashMap<String, String>>,
}

impl EnvVarAdapter {
    /// Creates a new environment variable adapter without prefix filtering.
    ///
    /// This will read all environment variables available to the process.
    pub fn new() -> Self {
        Self {
            prefix: None,
            name: "env".to_string(),
            priority: ENV_PRIORITY,
            values: None,
        }
    }

    /// Creates a new environment variable adapter with prefix filtering.
    ///
    /// Only environment variables starting with the given prefix will be read.
    /// The prefix is stripped from the key before nesting.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tierconf::adapters::EnvVarAdapter;
    /// use tierconf::ports::ConfigSource;
    ///
    /// let adapter = EnvVarAdapter::with_prefix("MYAPP_");
    /// assert_eq!(adapter.name(), "env:MYAPP_");
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            name: format!("env:{}", prefix),
            prefix: Some(prefix),
            priority: ENV_PRIORITY,
            values: None,
        }
    }

    /// Sets the source priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Reads from a fixed variable table instead of the process environment.
    ///
    /// **Note**: This method is primarily intended for testing. Prefix
    /// filtering and key nesting still apply to the supplied names.
    pub fn with_values(mut self, values: HashMap<String, String>) -> Self {
        self.values = Some(values);
        self
    }

    /// Snapshot of the variable table, sorted so the resulting shape does not
    /// depend on enumeration order.
    fn variables(&self) -> BTreeMap<String, String> {
        match &self.values {
            Some(values) => values.clone().into_iter().collect(),
            None => env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    fn insert_var(&self, tree: &mut ConfigTree, key: &str, value: &str) {
        let key = match &self.prefix {
            Some(prefix) => match key.strip_prefix(prefix.as_str()) {
                Some(stripped) => stripped,
                None => return,
            },
            None => key,
        };

        let lowered = key.to_lowercase();
        let segments: Vec<&str> = lowered.split('_').filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut target = tree;
        for segment in parents {
            target = descend(target, segment);
        }
        target.insert((*last).to_string(), infer_value(value));
    }
}

impl Default for EnvVarAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Infers a typed value from an environment variable's text.
pub(crate) fn infer_value(raw: &str) -> ConfigValue {
    match raw {
        "true" | "TRUE" | "yes" | "YES" | "1" => ConfigValue::Bool(true),
        "false" | "FALSE" | "no" | "NO" | "0" => ConfigValue::Bool(false),
        _ => ConfigValue::parse_number(raw).unwrap_or_else(|| ConfigValue::from(raw)),
    }
}

impl ConfigSource for EnvVarAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn load(&self) -> Result<ConfigTree> {
        let mut tree = ConfigTree::new();
        let mut skipped = 0usize;

        for (key, value) in self.variables() {
            // Validate input sizes to prevent DoS
            if key.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                skipped += 1;
                continue;
            }
            self.insert_var(&mut tree, &key, &value);
        }

        tracing::debug!(
            source = %self.name,
            top_level_keys = tree.len(),
            skipped_oversized = skipped,
            "Loaded environment variables"
        );
        Ok(tree)
    }
}
