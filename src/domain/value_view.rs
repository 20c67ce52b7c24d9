// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed, read-only view over one resolved configuration value.
//!
//! A [`ValueView`] pairs a key path with the raw value found there (or with
//! nothing, when the key is unset). Every `as_x` accessor has an `as_x_or`
//! twin taking a default; the plain form uses the type's zero value. The
//! conversions never fail: anything that cannot be converted yields the
//! default. Only [`ValueView::as_struct`] reports errors.

use crate::domain::config_key::ConfigKey;
use crate::domain::config_value::ConfigValue;
use crate::domain::duration::parse_duration;
use crate::domain::errors::{ConfigError, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

/// An ephemeral typed accessor over one value of the resolved tree.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tierconf::domain::{ConfigValue, ValueView};
///
/// let view = ValueView::new("server.port", Some(ConfigValue::from("8080")));
/// assert!(view.is_set());
/// assert_eq!(view.as_int(), 8080);
///
/// let missing = ValueView::unset("server.timeout");
/// assert!(!missing.is_set());
/// assert_eq!(missing.as_duration_or(Duration::from_secs(5)), Duration::from_secs(5));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ValueView {
    key: ConfigKey,
    raw: Option<ConfigValue>,
}

impl ValueView {
    /// Creates a view over `raw` found at `key`.
    pub fn new(key: impl Into<ConfigKey>, raw: Option<ConfigValue>) -> Self {
        Self {
            key: key.into(),
            raw,
        }
    }

    /// Creates a view for a key that is not set.
    pub fn unset(key: impl Into<ConfigKey>) -> Self {
        Self::new(key, None)
    }

    /// The key path this view was resolved from.
    pub fn key(&self) -> &ConfigKey {
        &self.key
    }

    /// The raw value, if set.
    pub fn raw(&self) -> Option<&ConfigValue> {
        self.raw.as_ref()
    }

    /// Consumes the view, returning the raw value.
    pub fn into_raw(self) -> Option<ConfigValue> {
        self.raw
    }

    /// Returns `false` only when the key is absent. An explicit empty string,
    /// `false` or `0` is still set.
    pub fn is_set(&self) -> bool {
        self.raw.is_some()
    }

    /// Returns the value as text, or an empty string.
    pub fn as_string(&self) -> String {
        self.as_string_or("")
    }

    /// Returns any scalar in its natural textual form, or `default` for
    /// lists, trees and unset keys.
    pub fn as_string_or(&self, default: &str) -> String {
        match &self.raw {
            Some(value) if value.is_scalar() => value.to_string(),
            _ => default.to_string(),
        }
    }

    /// Returns the value as an integer, or `0`.
    pub fn as_int(&self) -> i64 {
        self.as_int_or(0)
    }

    /// Converts numeric scalars directly (floats truncate) and parses strings.
    pub fn as_int_or(&self, default: i64) -> i64 {
        match &self.raw {
            Some(ConfigValue::Int(i)) => *i,
            Some(ConfigValue::Float(x)) => *x as i64,
            Some(ConfigValue::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Returns the value as a float, or `0.0`.
    pub fn as_float(&self) -> f64 {
        self.as_float_or(0.0)
    }

    /// Converts numeric scalars directly and parses strings.
    pub fn as_float_or(&self, default: f64) -> f64 {
        match &self.raw {
            Some(ConfigValue::Float(x)) => *x,
            Some(ConfigValue::Int(i)) => *i as f64,
            Some(ConfigValue::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Returns the value as a boolean, or `false`.
    pub fn as_bool(&self) -> bool {
        self.as_bool_or(false)
    }

    /// Booleans pass through and non-zero numbers are `true`. Strings accept
    /// the standard literals (`1 t T true TRUE True`, `0 f F false FALSE
    /// False`) plus `yes`, `y` and `Y` as `true`.
    pub fn as_bool_or(&self, default: bool) -> bool {
        match &self.raw {
            Some(ConfigValue::Bool(b)) => *b,
            Some(ConfigValue::Int(i)) => *i != 0,
            Some(ConfigValue::Float(x)) => *x != 0.0,
            Some(ConfigValue::String(s)) => match s.as_str() {
                "1" | "t" | "T" | "true" | "TRUE" | "True" | "yes" | "y" | "Y" => true,
                "0" | "f" | "F" | "false" | "FALSE" | "False" => false,
                _ => default,
            },
            _ => default,
        }
    }

    /// Returns the value as a duration, or zero.
    pub fn as_duration(&self) -> Duration {
        self.as_duration_or(Duration::ZERO)
    }

    /// Durations pass through, numbers are milliseconds and strings are
    /// parsed as duration literals (`"5s"`, `"2h"`, `"1m30s"`).
    pub fn as_duration_or(&self, default: Duration) -> Duration {
        match &self.raw {
            Some(ConfigValue::Duration(d)) => *d,
            Some(ConfigValue::Int(ms)) => u64::try_from(*ms)
                .map(Duration::from_millis)
                .unwrap_or(default),
            Some(ConfigValue::Float(ms)) => {
                let nanos = (ms * 1_000_000.0).round();
                if nanos.is_finite() && nanos >= 0.0 && nanos <= u64::MAX as f64 {
                    Duration::from_nanos(nanos as u64)
                } else {
                    default
                }
            }
            Some(ConfigValue::String(s)) => parse_duration(s).unwrap_or(default),
            _ => default,
        }
    }

    /// Returns the elements of a list, see [`ValueView::as_list_or`].
    pub fn as_list(&self) -> Vec<ValueView> {
        self.as_list_or(Vec::new())
    }

    /// Returns one view per list element, keyed `key[0]`, `key[1]`, ...
    ///
    /// Any other set value yields a single-element list wrapping this view;
    /// an unset key yields `default`.
    pub fn as_list_or(&self, default: Vec<ValueView>) -> Vec<ValueView> {
        match &self.raw {
            Some(ConfigValue::List(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| ValueView::new(self.key.index(i), Some(item.clone())))
                .collect(),
            Some(_) => vec![self.clone()],
            None => default,
        }
    }

    /// Returns the children of a tree, see [`ValueView::as_map_or`].
    pub fn as_map(&self) -> BTreeMap<String, ValueView> {
        self.as_map_or(BTreeMap::new())
    }

    /// Returns one view per child of a tree, keyed by dotted child path.
    /// Any other shape yields `default`.
    pub fn as_map_or(&self, default: BTreeMap<String, ValueView>) -> BTreeMap<String, ValueView> {
        match &self.raw {
            Some(ConfigValue::Tree(tree)) => tree
                .iter()
                .map(|(name, value)| {
                    (
                        name.clone(),
                        ValueView::new(self.key.child(name), Some(value.clone())),
                    )
                })
                .collect(),
            _ => default,
        }
    }

    /// Decodes the value into `T` by round-tripping it through YAML text.
    ///
    /// Durations are encoded as literals such as `"30s"`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigKeyNotFound`] if the key is unset and
    /// [`ConfigError::TypeConversionError`] if the shape does not fit `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde::Deserialize;
    /// use tierconf::domain::{ConfigValue, ValueView};
    ///
    /// #[derive(Deserialize)]
    /// struct Server {
    ///     host: String,
    ///     port: u16,
    /// }
    ///
    /// let raw = ConfigValue::tree([
    ///     ("host", ConfigValue::from("localhost")),
    ///     ("port", ConfigValue::from(8080)),
    /// ]);
    /// let server: Server = ValueView::new("server", Some(raw)).as_struct().unwrap();
    /// assert_eq!(server.host, "localhost");
    /// assert_eq!(server.port, 8080);
    /// ```
    pub fn as_struct<T: DeserializeOwned>(&self) -> Result<T> {
        let raw = self
            .raw
            .as_ref()
            .ok_or_else(|| ConfigError::ConfigKeyNotFound {
                key: self.key.to_string(),
            })?;

        let text = serde_yaml::to_string(raw).map_err(|e| self.conversion_error::<T>(e))?;
        serde_yaml::from_str(&text).map_err(|e| self.conversion_error::<T>(e))
    }

    fn conversion_error<T>(&self, err: serde_yaml::Error) -> ConfigError {
        ConfigError::TypeConversionError {
            key: self.key.to_string(),
            target_type: std::any::type_name::<T>().to_string(),
            source: Box::new(err),
        }
    }
}
