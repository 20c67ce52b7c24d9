// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities and mock implementations shared by the integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use tierconf::domain::{ConfigError, ConfigTree, ConfigValue, Result};
use tierconf::ports::ConfigSource;

#[derive(Debug, Default)]
struct MockState {
    values: ConfigTree,
    failing: bool,
    loads: usize,
}

/// A mock configuration source whose backing data can be edited after it has
/// been handed to a store.
///
/// Clones share their backing data, so a test keeps one clone and boxes
/// another into the store.
#[derive(Debug, Clone)]
pub struct MockConfigSource {
    name: String,
    priority: i32,
    state: Arc<Mutex<MockState>>,
}

impl MockConfigSource {
    /// Creates a new mock source with the given name and priority.
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Adds a value to the mock source.
    pub fn with_value(self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.set_value(key, value);
        self
    }

    /// Updates a value in the mock source.
    pub fn set_value(&self, key: &str, value: impl Into<ConfigValue>) {
        self.lock().values.insert(key.to_string(), value.into());
    }

    /// Removes a value from the mock source.
    pub fn remove_value(&self, key: &str) {
        self.lock().values.remove(key);
    }

    /// Sets whether loads should fail.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Number of load calls so far.
    pub fn load_count(&self) -> usize {
        self.lock().loads
    }

    /// Boxes a clone sharing this source's backing data.
    pub fn boxed(&self) -> Box<dyn ConfigSource> {
        Box::new(self.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConfigSource for MockConfigSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn load(&self) -> Result<ConfigTree> {
        let mut state = self.lock();
        state.loads += 1;
        if state.failing {
            return Err(ConfigError::SourceError {
                source_name: self.name.clone(),
                message: "Mock load failure".to_string(),
                source: None,
            });
        }
        Ok(state.values.clone())
    }
}

/// Creates a temporary file with the given content and suffix.
///
/// Returns a NamedTempFile that will be automatically deleted when dropped.
pub fn create_temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

/// Overwrites a fixture file in place.
pub fn rewrite(file: &tempfile::NamedTempFile, content: &str) {
    std::fs::write(file.path(), content).unwrap();
}

/// Builds a flat tree from `(dotted key, value)` pairs.
pub fn tree<V: Into<ConfigValue> + Clone>(pairs: &[(&str, V)]) -> ConfigTree {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone().into()))
        .collect()
}

/// Helper to set and clean up environment variables.
#[derive(Default)]
pub struct EnvGuard {
    keys: Vec<String>,
}

impl EnvGuard {
    /// Creates an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable that is removed when the guard drops.
    pub fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
        self.keys.push(key.to_string());
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.keys {
            std::env::remove_var(key);
        }
    }
}
