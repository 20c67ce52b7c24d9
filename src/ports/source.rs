// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration source trait definition.
//!
//! This module defines the `ConfigSource` trait, the primary port for
//! producing configuration. A source is a named, prioritized producer of one
//! raw [`ConfigTree`]; the store folds every source's tree in ascending
//! priority order to build the resolved configuration.

use crate::domain::{ConfigTree, Result};

/// A trait for configuration sources.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a store can be shared with its
/// background reload thread.
///
/// # Priority
///
/// Priorities are caller-assigned integers. The store applies sources in
/// ascending priority, so the **highest** priority wins on conflicting leaf
/// keys. Sources with equal priority keep their registration order. The
/// builder uses these bands:
///
/// - **10**: defaults
/// - **20**: environment variables
/// - **25**: dotenv files
/// - **30**: configuration files
/// - **40**: explicit maps
///
/// # Examples
///
/// ```rust
/// use tierconf::ports::ConfigSource;
/// use tierconf::domain::{ConfigTree, ConfigValue, Result};
///
/// struct FeatureFlags;
///
/// impl ConfigSource for FeatureFlags {
///     fn name(&self) -> &str {
///         "feature-flags"
///     }
///
///     fn priority(&self) -> i32 {
///         35
///     }
///
///     fn load(&self) -> Result<ConfigTree> {
///         let mut tree = ConfigTree::new();
///         tree.insert("features.beta".to_string(), ConfigValue::from(true));
///         Ok(tree)
///     }
/// }
///
/// let source = FeatureFlags;
/// assert_eq!(source.load().unwrap().len(), 1);
/// ```
pub trait ConfigSource: Send + Sync {
    /// Returns the name of this configuration source.
    ///
    /// This name is used for logging and error messages. It should be a short
    /// identifier like `"env:APP_"` or `"dotenv:.env"`.
    fn name(&self) -> &str;

    /// Returns the priority of this configuration source.
    fn priority(&self) -> i32;

    /// Produces a fresh tree from the source's backing medium.
    ///
    /// Loading must not mutate shared state; it only reads the environment,
    /// a file, or the source's own data. Keys may be nested trees or dotted
    /// paths; the merge engine treats both the same way.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read or parsed. A
    /// failing source never yields a partial tree.
    fn load(&self) -> Result<ConfigTree>;
}
