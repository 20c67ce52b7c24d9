// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory map configuration source adapter.

use crate::domain::{ConfigTree, Result};
use crate::ports::ConfigSource;

/// Default priority, matching the builder's explicit-map band.
pub const MAP_PRIORITY: i32 = 40;

/// Priority the builder gives to defaults.
pub const DEFAULTS_PRIORITY: i32 = 10;

/// Configuration source wrapping a caller-supplied tree.
///
/// The tree is owned by the adapter and cloned on every load, so neither the
/// caller's original map nor a previously returned tree can affect later
/// loads.
///
/// # Examples
///
/// ```rust
/// use tierconf::adapters::MapAdapter;
/// use tierconf::domain::{ConfigTree, ConfigValue};
/// use tierconf::ports::ConfigSource;
///
/// let mut values = ConfigTree::new();
/// values.insert("server.port".to_string(), ConfigValue::from(8080));
///
/// let adapter = MapAdapter::new("overrides", values);
/// assert_eq!(adapter.priority(), 40);
/// assert_eq!(adapter.load().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MapAdapter {
    name: String,
    priority: i32,
    values: ConfigTree,
}

impl MapAdapter {
    /// Creates a map source at the explicit-map priority.
    pub fn new(name: impl Into<String>, values: ConfigTree) -> Self {
        Self {
            name: name.into(),
            priority: MAP_PRIORITY,
            values,
        }
    }

    /// Creates a `"defaults"` map source at the lowest builder priority.
    pub fn defaults(values: ConfigTree) -> Self {
        Self::new("defaults", values).with_priority(DEFAULTS_PRIORITY)
    }

    /// Sets the source priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl ConfigSource for MapAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn load(&self) -> Result<ConfigTree> {
        Ok(self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigValue;

    #[test]
    fn test_map_adapter_isolated_from_caller() {
        let mut values = ConfigTree::new();
        values.insert("a".to_string(), ConfigValue::tree([("b", 1)]));

        let adapter = MapAdapter::new("fixed", values.clone());
        values.clear();

        let mut loaded = adapter.load().unwrap();
        assert_eq!(loaded["a"], ConfigValue::tree([("b", 1)]));

        loaded.clear();
        assert_eq!(adapter.load().unwrap().len(), 1);
    }

    #[test]
    fn test_map_adapter_priorities() {
        assert_eq!(MapAdapter::new("m", ConfigTree::new()).priority(), MAP_PRIORITY);
        let defaults = MapAdapter::defaults(ConfigTree::new());
        assert_eq!(defaults.name(), "defaults");
        assert_eq!(defaults.priority(), DEFAULTS_PRIORITY);
        assert_eq!(defaults.with_priority(-1).priority(), -1);
    }
}
