// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration watcher trait definition.
//!
//! A watcher monitors some backing medium (usually a file) and invokes a
//! callback when it changes. The store registers watchers with a callback
//! that requests a coalesced reload, so a watcher never touches the tree.

use crate::domain::{ConfigKey, Result};
use std::sync::Arc;

/// Callback invoked by a watcher when its resource changes.
///
/// The key names the changed resource (a file watcher passes the file path).
pub type ChangeCallback = Arc<dyn Fn(ConfigKey) + Send + Sync>;

/// A trait for watching configuration media for changes.
///
/// # Examples
///
/// ```rust
/// use tierconf::ports::{ChangeCallback, ConfigWatcher};
/// use tierconf::domain::{ConfigKey, Result};
///
/// struct ManualWatcher {
///     callback: Option<ChangeCallback>,
/// }
///
/// impl ManualWatcher {
///     fn poke(&self) {
///         if let Some(callback) = &self.callback {
///             callback(ConfigKey::from("manual"));
///         }
///     }
/// }
///
/// impl ConfigWatcher for ManualWatcher {
///     fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
///         self.callback = Some(callback);
///         Ok(())
///     }
///
///     fn stop(&mut self) -> Result<()> {
///         self.callback = None;
///         Ok(())
///     }
/// }
/// ```
pub trait ConfigWatcher: Send + Sync {
    /// Starts watching. The callback should be cheap; the store's callback
    /// only raises a reload signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot start or is already running.
    fn watch(&mut self, callback: ChangeCallback) -> Result<()>;

    /// Stops watching. No callbacks are invoked after this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher could not be shut down cleanly.
    fn stop(&mut self) -> Result<()>;
}
