// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fluent construction of a [`ConfigStore`].

use crate::adapters::MapAdapter;
use crate::domain::{ConfigKey, ConfigTree, ConfigValue, Result};
use crate::ports::{ChangeListener, ConfigSource};
use crate::service::store::ConfigStore;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// A validation hook run against the store after every change.
pub type Validator = Arc<dyn Fn(&ConfigStore) -> Result<()> + Send + Sync>;

/// Builder for constructing a [`ConfigStore`].
///
/// Sources are registered in ascending priority when [`build`](Self::build)
/// runs, so the incremental folds yield the same tree as a full reload. The
/// builder's priority bands are:
///
/// | source | priority |
/// | --- | --- |
/// | [`with_defaults`](Self::with_defaults) | 10 |
/// | [`from_env`](Self::from_env) | 20 |
/// | [`from_dotenv`](Self::from_dotenv) | 25 |
/// | [`from_file`](Self::from_file) | 30 |
/// | [`from_map`](Self::from_map) | 40 |
///
/// # Examples
///
/// ```rust
/// use tierconf::domain::{ConfigTree, ConfigValue};
/// use tierconf::service::ConfigStoreBuilder;
///
/// # fn main() -> tierconf::domain::Result<()> {
/// let mut defaults = ConfigTree::new();
/// defaults.insert("server.port".to_string(), ConfigValue::from(8080));
/// defaults.insert("server.host".to_string(), ConfigValue::from("0.0.0.0"));
///
/// let mut overrides = ConfigTree::new();
/// overrides.insert("server.port".to_string(), ConfigValue::from(9090));
///
/// let store = ConfigStoreBuilder::new()
///     .from_map(overrides, "overrides")
///     .with_defaults(defaults)
///     .build()?;
///
/// assert_eq!(store.get("server.port").as_int(), 9090);
/// assert_eq!(store.get("server.host").as_string(), "0.0.0.0");
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ConfigStoreBuilder {
    sources: Vec<Box<dyn ConfigSource>>,
    listeners: Vec<ChangeListener>,
    validators: Vec<Validator>,
    required_env: Vec<String>,
    auto_reload: Option<Duration>,
    #[cfg(feature = "watch")]
    watched_files: Vec<std::path::PathBuf>,
}

impl ConfigStoreBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds any configuration source at its own priority.
    pub fn with_source(mut self, source: Box<dyn ConfigSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Adds a YAML file source at priority 30. The file is read at build time
    /// and on every reload.
    #[cfg(feature = "yaml")]
    pub fn from_file(self, path: impl AsRef<std::path::Path>) -> Self {
        use crate::adapters::YamlFileAdapter;
        self.with_source(Box::new(YamlFileAdapter::new(path)))
    }

    /// Adds the process environment at priority 20. An empty prefix reads
    /// every variable.
    #[cfg(feature = "env")]
    pub fn from_env(self, prefix: impl Into<String>) -> Self {
        use crate::adapters::EnvVarAdapter;
        let prefix = prefix.into();
        let adapter = if prefix.is_empty() {
            EnvVarAdapter::new()
        } else {
            EnvVarAdapter::with_prefix(prefix)
        };
        self.with_source(Box::new(adapter))
    }

    /// Adds a dotenv file at priority 25.
    #[cfg(feature = "dotenv")]
    pub fn from_dotenv(self, path: impl AsRef<std::path::Path>) -> Self {
        use crate::adapters::DotenvFileAdapter;
        self.with_source(Box::new(DotenvFileAdapter::new(path)))
    }

    /// Adds an explicit map at priority 40, the highest builder band.
    pub fn from_map(self, values: ConfigTree, name: impl Into<String>) -> Self {
        self.with_source(Box::new(MapAdapter::new(name, values)))
    }

    /// Adds default values at priority 10, the lowest builder band.
    pub fn with_defaults(self, values: ConfigTree) -> Self {
        self.with_source(Box::new(MapAdapter::defaults(values)))
    }

    /// Reloads every source on a fixed period once built.
    pub fn with_auto_reload(mut self, interval: Duration) -> Self {
        self.auto_reload = Some(interval);
        self
    }

    /// Registers a change listener.
    pub fn with_on_change<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ConfigKey, Option<&ConfigValue>) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(hook));
        self
    }

    /// Registers a validation hook.
    ///
    /// The hook runs once when the store is built, where a failure aborts
    /// [`build`](Self::build), and then after every change, where a failure
    /// is only logged and the change stays applied.
    pub fn with_validation<F>(mut self, validator: F) -> Self
    where
        F: Fn(&ConfigStore) -> Result<()> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Requires environment variables to be present when building.
    pub fn require_env<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_env.extend(names.into_iter().map(Into::into));
        self
    }

    /// Watches `path` and requests a reload whenever it changes.
    #[cfg(feature = "watch")]
    pub fn watch_file(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.watched_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Builds the store.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingEnvVars`](crate::domain::ConfigError::MissingEnvVars) if a required variable is unset;
    /// - the first error returned by a validation hook;
    /// - [`ConfigError::SchedulerError`](crate::domain::ConfigError::SchedulerError) for a zero auto-reload interval;
    /// - [`ConfigError::WatcherError`](crate::domain::ConfigError::WatcherError) if a watched file cannot be watched.
    ///
    /// Source load failures are logged and do not fail the build.
    pub fn build(mut self) -> Result<Arc<ConfigStore>> {
        let store = ConfigStore::new();

        if !self.required_env.is_empty() {
            store.require_env(self.required_env)?;
        }

        self.sources.sort_by_key(|s| s.priority());
        for source in self.sources {
            store.add_source(source);
        }

        for validator in &self.validators {
            validator(&*store)?;
        }
        for listener in self.listeners {
            store.on_change(listener);
        }
        for validator in self.validators {
            store.on_change(validation_listener(Arc::downgrade(&store), validator));
        }

        if let Some(interval) = self.auto_reload {
            store.start_auto_reload(interval)?;
        }

        #[cfg(feature = "watch")]
        for path in self.watched_files {
            let watcher = crate::adapters::FileWatcher::new(&path, None)?;
            store.register_watcher(Box::new(watcher))?;
        }

        tracing::debug!(sources = ?store.source_names(), "Configuration store built");
        Ok(store)
    }
}

fn validation_listener(store: Weak<ConfigStore>, validator: Validator) -> ChangeListener {
    Arc::new(move |key: &ConfigKey, _: Option<&ConfigValue>| {
        let Some(store) = store.upgrade() else {
            return;
        };
        if let Err(e) = validator(&*store) {
            tracing::warn!(key = %key, error = %e, "Configuration change failed validation");
        }
    })
}
