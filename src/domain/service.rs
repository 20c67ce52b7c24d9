// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration service trait definition.
//!
//! This module defines the `ConfigurationService` trait, which is the main interface
//! for interacting with the configuration system. It provides methods for reading
//! the resolved tree, overriding values at runtime, reloading every source and
//! subscribing to changes.

use crate::domain::{ConfigKey, ConfigTree, ConfigValue, Result, ValueView};
use crate::ports::{ChangeListener, ConfigWatcher, Notification, ReloadReport};

/// The main configuration service trait.
///
/// Reads never fail: a missing key yields an unset [`ValueView`] whose typed
/// accessors fall back to the caller's default.
///
/// # Examples
///
/// ```rust
/// use tierconf::domain::{ConfigurationService, ConfigKey, ConfigTree, ConfigValue, Result, ValueView};
/// use tierconf::ports::{ChangeListener, ConfigWatcher, Notification, ReloadReport};
///
/// struct Fixed(ConfigTree);
///
/// impl ConfigurationService for Fixed {
///     fn get(&self, key: &ConfigKey) -> ValueView {
///         ValueView::new(key.clone(), self.0.get(key.as_str()).cloned())
///     }
///
///     fn all_settings(&self) -> ConfigTree {
///         self.0.clone()
///     }
///
///     fn set(&self, _key: &ConfigKey, _value: ConfigValue) -> Notification {
///         Notification::none()
///     }
///
///     fn load_all(&self) -> Result<ReloadReport> {
///         Ok(ReloadReport::default())
///     }
///
///     fn on_change(&self, _listener: ChangeListener) {}
///
///     fn register_watcher(&self, _watcher: Box<dyn ConfigWatcher>) -> Result<()> {
///         Ok(())
///     }
/// }
///
/// let mut tree = ConfigTree::new();
/// tree.insert("port".to_string(), ConfigValue::from(8080));
/// let service = Fixed(tree);
/// assert_eq!(service.get_str("port").as_int_or(0), 8080);
/// assert!(!service.has(&ConfigKey::from("host")));
/// ```
pub trait ConfigurationService {
    /// Returns a view over the value at `key`.
    ///
    /// The root key (`""`) views the entire resolved tree. Dotted segments
    /// descend into nested trees and `name[i]` selects a list element.
    fn get(&self, key: &ConfigKey) -> ValueView;

    /// Convenience wrapper around [`get`](ConfigurationService::get) taking a
    /// string key.
    fn get_str(&self, key: &str) -> ValueView {
        self.get(&ConfigKey::from(key))
    }

    /// Returns `true` if `key` resolves to a value.
    fn has(&self, key: &ConfigKey) -> bool {
        self.get(key).is_set()
    }

    /// Returns a deep copy of the resolved tree. Mutating the copy does not
    /// affect the service.
    fn all_settings(&self) -> ConfigTree;

    /// Overrides the value at `key` in the resolved tree and notifies every
    /// listener for that single key.
    ///
    /// The override lives until the next full reload rebuilds the tree from
    /// its sources.
    fn set(&self, key: &ConfigKey, value: ConfigValue) -> Notification;

    /// Reloads every source, replaces the resolved tree and notifies
    /// listeners of each changed key.
    ///
    /// # Errors
    ///
    /// Returns the first source error. The resolved tree is left untouched
    /// and no listener is invoked.
    fn load_all(&self) -> Result<ReloadReport>;

    /// Registers a change listener.
    fn on_change(&self, listener: ChangeListener);

    /// Starts `watcher` so that each change it reports requests a reload.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot start.
    fn register_watcher(&self, watcher: Box<dyn ConfigWatcher>) -> Result<()>;
}
