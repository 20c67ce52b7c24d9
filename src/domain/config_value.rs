// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration value type and the tree it forms.
//!
//! A [`ConfigValue`] is a closed tagged union over the shapes a configuration
//! node can take: a scalar (string, integer, float, boolean, duration), an
//! ordered list, or a nested [`ConfigTree`]. A key in a tree maps to exactly
//! one of these at a time.

use crate::domain::duration::format_duration;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A mapping from key segments to values. Keys are kept sorted so that
/// iteration, diffing and serialization are deterministic.
pub type ConfigTree = BTreeMap<String, ConfigValue>;

/// A single configuration value.
///
/// # Examples
///
/// ```
/// use tierconf::domain::ConfigValue;
///
/// let port = ConfigValue::from(8080);
/// assert_eq!(port, ConfigValue::Int(8080));
/// assert!(port.is_scalar());
///
/// let server = ConfigValue::tree([("port", 8080)]);
/// assert!(server.is_tree());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    /// A text scalar.
    String(String),
    /// A signed integer scalar.
    Int(i64),
    /// A floating point scalar.
    Float(f64),
    /// A boolean scalar.
    Bool(bool),
    /// A duration scalar.
    Duration(Duration),
    /// An ordered list of values. Lists are replaced wholesale on merge.
    List(Vec<ConfigValue>),
    /// A nested tree.
    Tree(ConfigTree),
}

impl ConfigValue {
    /// Builds a [`ConfigValue::Tree`] from key/value pairs.
    pub fn tree<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<ConfigValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        ConfigValue::Tree(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns a short name for the value's shape, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::String(_) => "string",
            ConfigValue::Int(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Duration(_) => "duration",
            ConfigValue::List(_) => "list",
            ConfigValue::Tree(_) => "tree",
        }
    }

    /// Returns `true` for every shape except lists and trees.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, ConfigValue::List(_) | ConfigValue::Tree(_))
    }

    /// Returns `true` if the value is a nested tree.
    pub fn is_tree(&self) -> bool {
        matches!(self, ConfigValue::Tree(_))
    }

    /// Returns the nested tree, if this value is one.
    pub fn as_tree(&self) -> Option<&ConfigTree> {
        match self {
            ConfigValue::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Returns the list elements, if this value is a list.
    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Parses an integer, then a finite float, from text.
    pub(crate) fn parse_number(raw: &str) -> Option<ConfigValue> {
        if let Ok(i) = raw.parse::<i64>() {
            return Some(ConfigValue::Int(i));
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Some(ConfigValue::Float(f)),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::Int(i) => write!(f, "{}", i),
            ConfigValue::Float(x) => write!(f, "{}", x),
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Duration(d) => f.write_str(&format_duration(*d)),
            ConfigValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            ConfigValue::Tree(tree) => {
                f.write_str("{")?;
                for (i, (key, value)) in tree.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Int(i) => serializer.serialize_i64(*i),
            ConfigValue::Float(x) => serializer.serialize_f64(*x),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Duration(d) => serializer.serialize_str(&format_duration(*d)),
            ConfigValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Tree(tree) => {
                let mut map = serializer.serialize_map(Some(tree.len()))?;
                for (key, value) in tree {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Int(i)
    }
}

impl From<i32> for ConfigValue {
    fn from(i: i32) -> Self {
        ConfigValue::Int(i64::from(i))
    }
}

impl From<u32> for ConfigValue {
    fn from(i: u32) -> Self {
        ConfigValue::Int(i64::from(i))
    }
}

impl From<f64> for ConfigValue {
    fn from(x: f64) -> Self {
        ConfigValue::Float(x)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<Duration> for ConfigValue {
    fn from(d: Duration) -> Self {
        ConfigValue::Duration(d)
    }
}

impl From<ConfigTree> for ConfigValue {
    fn from(tree: ConfigTree) -> Self {
        ConfigValue::Tree(tree)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        ConfigValue::List(items.into_iter().map(Into::into).collect())
    }
}
