// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration key newtype for type-safe key handling.
//!
//! This module provides the `ConfigKey` type, a newtype wrapper around a dotted
//! key path such as `server.port` or `servers[0].host`. Each `.`-separated
//! segment is one level of nesting in the configuration tree; a trailing
//! `[n]` on a segment addresses element `n` of a list.

use std::fmt;

/// A type-safe wrapper for dotted configuration key paths.
///
/// `ConfigKey` wraps a `String` to provide type safety when working with
/// configuration keys. Requesting `"server.port"` is equivalent to walking
/// `tree["server"]["port"]`. The empty key addresses the whole tree.
///
/// # Examples
///
/// ```
/// use tierconf::domain::config_key::ConfigKey;
///
/// let key = ConfigKey::from("database.host");
/// assert_eq!(key.as_str(), "database.host");
/// assert_eq!(key.segments().collect::<Vec<_>>(), vec!["database", "host"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ConfigKey(String);

/// One step of a key path: a map lookup optionally followed by list indexes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PathStep<'a> {
    pub(crate) name: &'a str,
    pub(crate) indexes: Vec<usize>,
}

impl ConfigKey {
    /// Creates a new `ConfigKey` from a `String`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tierconf::domain::config_key::ConfigKey;
    ///
    /// let key = ConfigKey::new("app.name".to_string());
    /// assert_eq!(key.as_str(), "app.name");
    /// ```
    pub fn new(key: String) -> Self {
        ConfigKey(key)
    }

    /// The empty key, which addresses the whole tree.
    pub fn root() -> Self {
        ConfigKey(String::new())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if this is the empty key.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the non-empty `.`-separated segments of the key.
    ///
    /// Empty segments (from `a..b` or a leading dot) are skipped.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }

    /// Returns the key for a named child of this key.
    ///
    /// # Examples
    ///
    /// ```
    /// use tierconf::domain::config_key::ConfigKey;
    ///
    /// assert_eq!(ConfigKey::from("server").child("port").as_str(), "server.port");
    /// assert_eq!(ConfigKey::root().child("server").as_str(), "server");
    /// ```
    pub fn child(&self, name: &str) -> Self {
        if self.is_root() {
            ConfigKey(name.to_string())
        } else {
            ConfigKey(format!("{}.{}", self.0, name))
        }
    }

    /// Returns the key for element `index` of the list at this key.
    ///
    /// # Examples
    ///
    /// ```
    /// use tierconf::domain::config_key::ConfigKey;
    ///
    /// assert_eq!(ConfigKey::from("servers").index(1).as_str(), "servers[1]");
    /// ```
    pub fn index(&self, index: usize) -> Self {
        ConfigKey(format!("{}[{}]", self.0, index))
    }

    /// Splits the key into lookup steps, parsing `name[i][j]` suffixes.
    ///
    /// Returns `None` if a bracket suffix is malformed.
    pub(crate) fn steps(&self) -> Option<Vec<PathStep<'_>>> {
        self.segments().map(parse_step).collect()
    }
}

fn parse_step(segment: &str) -> Option<PathStep<'_>> {
    let Some(open) = segment.find('[') else {
        return Some(PathStep {
            name: segment,
            indexes: Vec::new(),
        });
    };

    let name = &segment[..open];
    let mut indexes = Vec::new();
    let mut rest = &segment[open..];
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        indexes.push(inner[..close].trim().parse::<usize>().ok()?);
        rest = &inner[close + 1..];
    }

    Some(PathStep { name, indexes })
}

impl From<String> for ConfigKey {
    fn from(s: String) -> Self {
        ConfigKey(s)
    }
}

impl From<&str> for ConfigKey {
    fn from(s: &str) -> Self {
        ConfigKey(s.to_string())
    }
}

impl From<&ConfigKey> for ConfigKey {
    fn from(key: &ConfigKey) -> Self {
        key.clone()
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
