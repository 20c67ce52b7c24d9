// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change listener types and asynchronous dispatch.
//!
//! Each listener gets its own thread per batch of changes and is invoked once
//! per changed key, after the store has released its lock. A slow or
//! panicking listener therefore never blocks the store or other listeners,
//! and a panic on one key does not cost the listener the remaining keys.

use crate::domain::{ChangeSet, ConfigKey, ConfigValue};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A callback invoked with a changed key and its new value, or `None` when
/// the key was removed.
pub type ChangeListener = Arc<dyn Fn(&ConfigKey, Option<&ConfigValue>) + Send + Sync>;

/// Handle to a batch of in-flight listener invocations.
///
/// Dropping the handle detaches the invocations; they still run to
/// completion. Call [`wait`](Notification::wait) to block until every
/// invocation has finished.
#[derive(Debug, Default)]
#[must_use = "dropping a Notification detaches its listener threads"]
pub struct Notification {
    /// One thread per listener, each yielding how many keys it handled cleanly
    handles: Vec<JoinHandle<usize>>,
    invocations: usize,
}

impl Notification {
    /// A notification with no invocations.
    pub fn none() -> Self {
        Self::default()
    }

    /// Spawns one thread per listener that walks every changed key.
    pub fn dispatch(listeners: &[ChangeListener], changes: &ChangeSet) -> Self {
        if changes.is_empty() {
            return Self::none();
        }

        let batch: Arc<Vec<(ConfigKey, Option<ConfigValue>)>> = Arc::new(
            changes
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        );

        let mut handles = Vec::with_capacity(listeners.len());
        for listener in listeners {
            let listener = Arc::clone(listener);
            let shared = Arc::clone(&batch);
            let spawned = thread::Builder::new()
                .name("tierconf-listener".to_string())
                .spawn(move || deliver(listener.as_ref(), &shared));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        changes = batch.len(),
                        "Failed to spawn change listener thread"
                    );
                }
            }
        }

        let invocations = handles.len() * batch.len();
        if invocations > 0 {
            tracing::debug!(
                listeners = handles.len(),
                changes = batch.len(),
                "Dispatched change notifications"
            );
        }
        Self {
            handles,
            invocations,
        }
    }

    /// Number of listener invocations that were started.
    pub fn dispatched(&self) -> usize {
        self.invocations
    }

    /// Blocks until every invocation finishes and returns how many completed
    /// without panicking.
    pub fn wait(self) -> usize {
        self.handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(0))
            .sum()
    }
}

fn deliver(
    listener: &(dyn Fn(&ConfigKey, Option<&ConfigValue>) + Send + Sync),
    batch: &[(ConfigKey, Option<ConfigValue>)],
) -> usize {
    let mut completed = 0;
    for (key, value) in batch {
        match panic::catch_unwind(AssertUnwindSafe(|| listener(key, value.as_ref()))) {
            Ok(()) => completed += 1,
            Err(_) => tracing::error!(key = %key, "Change listener panicked"),
        }
    }
    completed
}

/// Outcome of a successful reload.
#[derive(Debug, Default)]
pub struct ReloadReport {
    /// Every key whose resolved value changed.
    pub changes: ChangeSet,
    /// Listener invocations started for those changes.
    pub notification: Notification,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn changes(pairs: &[(&str, Option<i64>)]) -> ChangeSet {
        let mut set = ChangeSet::new();
        for (k, v) in pairs {
            set.insert(ConfigKey::from(*k), v.map(ConfigValue::from));
        }
        set
    }

    #[test]
    fn test_dispatch_invokes_each_listener_per_key() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let a = {
            let seen = Arc::clone(&seen);
            Arc::new(move |k: &ConfigKey, _: Option<&ConfigValue>| {
                seen.lock().unwrap().push(format!("a:{}", k));
            }) as ChangeListener
        };
        let b = {
            let seen = Arc::clone(&seen);
            Arc::new(move |k: &ConfigKey, _: Option<&ConfigValue>| {
                seen.lock().unwrap().push(format!("b:{}", k));
            }) as ChangeListener
        };

        let notification = Notification::dispatch(&[a, b], &changes(&[("x", Some(1)), ("y", None)]));
        assert_eq!(notification.dispatched(), 4);
        assert_eq!(notification.wait(), 4);

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec!["a:x", "a:y", "b:x", "b:y"]);
    }

    #[test]
    fn test_removed_key_delivered_as_none() {
        let removed = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&removed);
        let listener: ChangeListener = Arc::new(move |k: &ConfigKey, v: Option<&ConfigValue>| {
            *slot.lock().unwrap() = Some((k.to_string(), v.is_none()));
        });

        Notification::dispatch(&[listener], &changes(&[("gone", None)])).wait();
        assert_eq!(*removed.lock().unwrap(), Some(("gone".to_string(), true)));
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let ok = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&ok);
        let good: ChangeListener = Arc::new(move |_: &ConfigKey, _: Option<&ConfigValue>| *counter.lock().unwrap() += 1);
        let bad: ChangeListener = Arc::new(|_: &ConfigKey, _: Option<&ConfigValue>| panic!("listener failure"));

        let notification = Notification::dispatch(&[bad, good], &changes(&[("k", Some(1))]));
        assert_eq!(notification.wait(), 1);
        assert_eq!(*ok.lock().unwrap(), 1);
    }

    #[test]
    fn test_no_changes_no_dispatch() {
        let listener: ChangeListener = Arc::new(|_: &ConfigKey, _: Option<&ConfigValue>| {});
        assert_eq!(Notification::dispatch(&[listener], &ChangeSet::new()).dispatched(), 0);
        assert_eq!(Notification::none().wait(), 0);
    }

    #[test]
    fn test_each_listener_runs_on_one_thread_per_batch() {
        let threads = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&threads);
        let listener: ChangeListener = Arc::new(move |_: &ConfigKey, _: Option<&ConfigValue>| {
            sink.lock().unwrap().push(thread::current().id());
        });

        let notification = Notification::dispatch(
            &[listener],
            &changes(&[("a", Some(1)), ("b", Some(2)), ("c", None)]),
        );
        assert_eq!(notification.dispatched(), 3);
        assert_eq!(notification.wait(), 3);

        let threads = threads.lock().unwrap();
        assert_eq!(threads.len(), 3);
        assert!(threads.iter().all(|id| *id == threads[0]));
        assert_ne!(threads[0], thread::current().id());
    }

    #[test]
    fn test_panic_on_one_key_does_not_skip_the_rest() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: ChangeListener = Arc::new(move |k: &ConfigKey, _: Option<&ConfigValue>| {
            if k.as_str() == "a" {
                panic!("listener failure");
            }
            sink.lock().unwrap().push(k.to_string());
        });

        let notification =
            Notification::dispatch(&[listener], &changes(&[("a", Some(1)), ("b", Some(2))]));
        assert_eq!(notification.wait(), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["b"]);
    }
}
