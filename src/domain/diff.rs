// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural change detection between two configuration trees.

use crate::domain::config_key::ConfigKey;
use crate::domain::config_value::{ConfigTree, ConfigValue};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// The set of dotted key paths that differ between two tree snapshots.
///
/// Each entry maps a key to its new value, or to `None` when the key was
/// removed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeSet(BTreeMap<ConfigKey, Option<ConfigValue>>);

impl ChangeSet {
    /// Creates an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a single change.
    pub fn insert(&mut self, key: ConfigKey, value: Option<ConfigValue>) {
        self.0.insert(key, value);
    }

    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of changed keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the change recorded for `key`.
    ///
    /// The outer `Option` is `None` if `key` did not change; the inner one is
    /// `None` if it was removed.
    pub fn get(&self, key: &str) -> Option<Option<&ConfigValue>> {
        self.0.get(&ConfigKey::from(key)).map(Option::as_ref)
    }

    /// Returns `true` if `key` was removed.
    pub fn is_removed(&self, key: &str) -> bool {
        matches!(self.get(key), Some(None))
    }

    /// Iterates over the changed keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &ConfigKey> {
        self.0.keys()
    }

    /// Iterates over `(key, new value)` pairs in sorted key order.
    pub fn iter(&self) -> btree_map::Iter<'_, ConfigKey, Option<ConfigValue>> {
        self.0.iter()
    }
}

impl IntoIterator for ChangeSet {
    type Item = (ConfigKey, Option<ConfigValue>);
    type IntoIter = btree_map::IntoIter<ConfigKey, Option<ConfigValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = (&'a ConfigKey, &'a Option<ConfigValue>);
    type IntoIter = btree_map::Iter<'a, ConfigKey, Option<ConfigValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Computes the changes that turn `old` into `new`.
///
/// Keys only in `new` are added, keys in both with unequal values are changed,
/// and keys only in `old` are removed. Where both sides hold a nested tree the
/// walk recurses, so only the altered leaves or branches are reported.
///
/// # Examples
///
/// ```
/// use tierconf::domain::{diff, ConfigTree, ConfigValue};
///
/// let mut old = ConfigTree::new();
/// old.insert("server".into(), ConfigValue::tree([("port", 8080)]));
/// let mut new = ConfigTree::new();
/// new.insert("server".into(), ConfigValue::tree([("port", 9090)]));
///
/// let changes = diff(&old, &new);
/// assert_eq!(changes.len(), 1);
/// assert_eq!(changes.get("server.port"), Some(Some(&ConfigValue::Int(9090))));
/// ```
pub fn diff(old: &ConfigTree, new: &ConfigTree) -> ChangeSet {
    let mut changes = ChangeSet::new();
    diff_into(&ConfigKey::root(), old, new, &mut changes);
    changes
}

fn diff_into(prefix: &ConfigKey, old: &ConfigTree, new: &ConfigTree, changes: &mut ChangeSet) {
    for (name, new_value) in new {
        let key = prefix.child(name);
        match (old.get(name), new_value) {
            (None, _) => changes.insert(key, Some(new_value.clone())),
            (Some(ConfigValue::Tree(old_child)), ConfigValue::Tree(new_child)) => {
                diff_into(&key, old_child, new_child, changes);
            }
            (Some(old_value), _) if old_value != new_value => {
                changes.insert(key, Some(new_value.clone()));
            }
            _ => {}
        }
    }

    for name in old.keys() {
        if !new.contains_key(name) {
            changes.insert(prefix.child(name), None);
        }
    }
}
