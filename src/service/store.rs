// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration store.
//!
//! `ConfigStore` owns the prioritized source list, the resolved tree and the
//! change listeners behind a single reader/writer lock. Reads take the read
//! lock; writes, incremental source registration and full reloads take the
//! write lock. Listeners are always invoked after the lock is released.

use crate::domain::tree::{lookup, set_path};
use crate::domain::{
    diff, merge, merge_into, ChangeSet, ConfigError, ConfigKey, ConfigTree, ConfigValue,
    ConfigurationService, Result, ValueView,
};
use crate::ports::{
    ChangeCallback, ChangeListener, ConfigSource, ConfigWatcher, Notification, ReloadReport,
};
use crate::service::scheduler::{ReloadScheduler, ReloadState};
use std::collections::BTreeSet;
use std::env;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};
use std::time::Duration;

struct StoreState {
    /// Ascending priority; equal priorities keep registration order
    sources: Vec<Box<dyn ConfigSource>>,
    tree: ConfigTree,
    listeners: Vec<ChangeListener>,
}

/// Thread-safe hierarchical configuration store.
///
/// Created through [`ConfigStore::new`] (or the
/// [`ConfigStoreBuilder`](crate::service::ConfigStoreBuilder)), which hands
/// out an `Arc` so that the reload scheduler and watchers can hold weak
/// references back to the store.
///
/// # Examples
///
/// ```rust
/// use tierconf::adapters::MapAdapter;
/// use tierconf::domain::{ConfigTree, ConfigValue};
/// use tierconf::service::ConfigStore;
///
/// # fn main() -> tierconf::domain::Result<()> {
/// let mut low = ConfigTree::new();
/// low.insert("server.port".to_string(), ConfigValue::from(8080));
/// low.insert("server.host".to_string(), ConfigValue::from("localhost"));
/// let mut high = ConfigTree::new();
/// high.insert("server.port".to_string(), ConfigValue::from(9090));
///
/// let store = ConfigStore::new();
/// store.add_source(Box::new(MapAdapter::new("high", high).with_priority(20)));
/// store.add_source(Box::new(MapAdapter::new("low", low).with_priority(10)));
/// store.load_all()?;
///
/// assert_eq!(store.get("server.port").as_int(), 9090);
/// assert_eq!(store.get("server.host").as_string(), "localhost");
/// # Ok(())
/// # }
/// ```
pub struct ConfigStore {
    state: RwLock<StoreState>,
    required_env: Mutex<BTreeSet<String>>,
    scheduler: Mutex<Option<ReloadScheduler>>,
    watchers: Mutex<Vec<Box<dyn ConfigWatcher>>>,
    self_ref: Weak<ConfigStore>,
}

impl ConfigStore {
    /// Creates an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            state: RwLock::new(StoreState {
                sources: Vec::new(),
                tree: ConfigTree::new(),
                listeners: Vec::new(),
            }),
            required_env: Mutex::new(BTreeSet::new()),
            scheduler: Mutex::new(None),
            watchers: Mutex::new(Vec::new()),
            self_ref: self_ref.clone(),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn scheduler(&self) -> MutexGuard<'_, Option<ReloadScheduler>> {
        self.scheduler.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a view over the value at `key`.
    ///
    /// The empty key views the whole tree; a missing key yields an unset view.
    pub fn get(&self, key: impl Into<ConfigKey>) -> ValueView {
        let key = key.into();
        let state = self.read();
        let raw = if key.is_root() {
            Some(ConfigValue::Tree(state.tree.clone()))
        } else {
            lookup(&state.tree, &key).cloned()
        };
        ValueView::new(key, raw)
    }

    /// Returns `true` if `key` resolves to a value.
    pub fn has(&self, key: impl Into<ConfigKey>) -> bool {
        let key = key.into();
        key.is_root() || lookup(&self.read().tree, &key).is_some()
    }

    /// Deep copy of the resolved tree.
    pub fn all_settings(&self) -> ConfigTree {
        self.read().tree.clone()
    }

    /// Writes `value` directly into the resolved tree, bypassing sources and
    /// priorities, then notifies listeners for `key`.
    ///
    /// The override holds until the next [`load_all`](Self::load_all).
    /// Writing through a scalar replaces it with a nested tree. An indexed
    /// key such as `servers[0].host` writes into an existing list element and
    /// never extends the list. The root key, a malformed index and an index
    /// past the end of its list are ignored: nothing is written and no
    /// listener runs.
    pub fn set(&self, key: impl Into<ConfigKey>, value: impl Into<ConfigValue>) -> Notification {
        let key = key.into();
        let value = value.into();

        let listeners = {
            let mut state = self.write();
            if !set_path(&mut state.tree, &key, value.clone()) {
                tracing::warn!(key = %key, "Ignoring write to an unaddressable configuration key");
                return Notification::none();
            }
            state.listeners.clone()
        };

        tracing::debug!(key = %key, "Configuration value overridden");
        let mut changes = ChangeSet::new();
        changes.insert(key, Some(value));
        Notification::dispatch(&listeners, &changes)
    }

    /// Registers a source and folds its current tree onto the resolved tree.
    ///
    /// The fold is incremental: the new source's values win over whatever is
    /// resolved right now, whatever its priority, until the next
    /// [`load_all`](Self::load_all) rebuilds the tree in priority order. A
    /// load failure here is logged and the source stays registered.
    /// Listeners are not notified.
    pub fn add_source(&self, source: Box<dyn ConfigSource>) {
        let loaded = source.load();
        let name = source.name().to_string();
        let priority = source.priority();

        let mut state = self.write();
        state.sources.push(source);
        state.sources.sort_by_key(|s| s.priority());

        match loaded {
            Ok(tree) => {
                merge_into(&mut state.tree, tree);
                tracing::info!(source = %name, priority, "Registered configuration source");
            }
            Err(e) => {
                tracing::warn!(
                    source = %name,
                    priority,
                    error = %e,
                    "Registered configuration source, but its initial load failed"
                );
            }
        }
    }

    /// Names of the registered sources in application order.
    pub fn source_names(&self) -> Vec<String> {
        self.read()
            .sources
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Reloads every source in ascending priority, replaces the resolved tree
    /// and notifies listeners of each changed key.
    ///
    /// Concurrent readers see either the old tree or the new one, never a
    /// mix.
    ///
    /// # Errors
    ///
    /// Returns the first source failure. The resolved tree is left untouched
    /// and no listener is notified.
    pub fn load_all(&self) -> Result<ReloadReport> {
        let (changes, listeners) = {
            let mut state = self.write();

            let mut trees = Vec::with_capacity(state.sources.len());
            for source in &state.sources {
                match source.load() {
                    Ok(tree) => trees.push(tree),
                    Err(e) => {
                        tracing::warn!(
                            source = %source.name(),
                            error = %e,
                            "Configuration reload aborted"
                        );
                        return Err(e);
                    }
                }
            }

            let resolved = merge(trees);
            let changes = diff(&state.tree, &resolved);
            state.tree = resolved;
            (changes, state.listeners.clone())
        };

        if changes.is_empty() {
            tracing::debug!("Configuration reloaded; no changes");
            return Ok(ReloadReport::default());
        }

        tracing::info!(changed_keys = changes.len(), "Configuration reloaded");
        let notification = Notification::dispatch(&listeners, &changes);
        Ok(ReloadReport {
            changes,
            notification,
        })
    }

    /// Adds `names` to the required environment variables and checks that
    /// every required variable is present in the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVars`] listing every missing name,
    /// sorted.
    pub fn require_env<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut required = self
            .required_env
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        required.extend(names.into_iter().map(Into::into));

        let missing: Vec<String> = required
            .iter()
            .filter(|name| env::var_os(name.as_str()).is_none())
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingEnvVars { names: missing })
        }
    }

    /// The accumulated required environment variable names, sorted.
    pub fn required_env(&self) -> Vec<String> {
        self.required_env
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Registers a listener for every future change.
    pub fn on_change(&self, listener: ChangeListener) {
        self.write().listeners.push(listener);
    }

    /// Starts reloading every `interval`, replacing any running scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SchedulerError`] for a zero interval.
    pub fn start_auto_reload(&self, interval: Duration) -> Result<()> {
        let mut scheduler = ReloadScheduler::new(interval)?;
        let store = self.self_ref.clone();
        scheduler.start(move || {
            let store = store.upgrade()?;
            Some(store.load_all().map(|report| {
                tracing::debug!(
                    changed_keys = report.changes.len(),
                    "Scheduled configuration reload finished"
                );
            }))
        })?;

        let previous = self.scheduler().replace(scheduler);
        if let Some(mut previous) = previous {
            previous.stop();
        }
        Ok(())
    }

    /// Requests a reload.
    ///
    /// With auto-reload running this raises the scheduler's coalescing
    /// signal and returns immediately; otherwise it reloads synchronously.
    ///
    /// # Errors
    ///
    /// Returns the reload error when reloading synchronously.
    pub fn trigger_reload(&self) -> Result<()> {
        let signalled = self
            .scheduler()
            .as_ref()
            .is_some_and(ReloadScheduler::trigger);
        if signalled {
            return Ok(());
        }
        self.load_all().map(|_| ())
    }

    /// Stops auto-reload and waits for an in-flight reload to finish.
    pub fn stop_auto_reload(&self) {
        if let Some(scheduler) = self.scheduler().as_mut() {
            scheduler.stop();
        }
    }

    /// State of the most recently started scheduler; `Idle` when none was
    /// started.
    pub fn auto_reload_state(&self) -> ReloadState {
        self.scheduler()
            .as_ref()
            .map_or(ReloadState::Idle, ReloadScheduler::state)
    }

    /// Starts `watcher`; every change it reports requests a reload.
    ///
    /// # Errors
    ///
    /// Returns the watcher's startup error.
    pub fn register_watcher(&self, mut watcher: Box<dyn ConfigWatcher>) -> Result<()> {
        let store = self.self_ref.clone();
        let callback: ChangeCallback = Arc::new(move |resource: ConfigKey| {
            let Some(store) = store.upgrade() else {
                return;
            };
            tracing::debug!(resource = %resource, "Watched resource changed; requesting reload");
            if let Err(e) = store.trigger_reload() {
                tracing::warn!(resource = %resource, error = %e, "Reload after change failed");
            }
        });

        watcher.watch(callback)?;
        self.watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(watcher);
        Ok(())
    }
}

impl Drop for ConfigStore {
    fn drop(&mut self) {
        let watchers = self
            .watchers
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for watcher in watchers.iter_mut() {
            if let Err(e) = watcher.stop() {
                tracing::warn!(error = %e, "Failed to stop configuration watcher");
            }
        }
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("ConfigStore")
            .field(
                "sources",
                &state.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("tree", &state.tree)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl ConfigurationService for ConfigStore {
    fn get(&self, key: &ConfigKey) -> ValueView {
        ConfigStore::get(self, key)
    }

    fn has(&self, key: &ConfigKey) -> bool {
        ConfigStore::has(self, key)
    }

    fn all_settings(&self) -> ConfigTree {
        ConfigStore::all_settings(self)
    }

    fn set(&self, key: &ConfigKey, value: ConfigValue) -> Notification {
        ConfigStore::set(self, key, value)
    }

    fn load_all(&self) -> Result<ReloadReport> {
        ConfigStore::load_all(self)
    }

    fn on_change(&self, listener: ChangeListener) {
        ConfigStore::on_change(self, listener)
    }

    fn register_watcher(&self, watcher: Box<dyn ConfigWatcher>) -> Result<()> {
        ConfigStore::register_watcher(self, watcher)
    }
}
