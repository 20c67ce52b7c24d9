// SPDX-License-Identifier: MIT OR Apache-2.0

//! File system watcher for configuration file changes.
//!
//! The watcher observes the file's parent directory, since editors often
//! replace a file instead of writing it in place, and reports a change once
//! events for the file have been quiet for the debounce delay.

use crate::domain::{ConfigError, ConfigKey, Result};
use crate::ports::{ChangeCallback, ConfigWatcher};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// File system watcher for configuration files.
///
/// A burst of events (truncate, write, rename) collapses into a single
/// callback fired after the burst has been quiet for the debounce delay.
///
/// # Examples
///
/// ```rust,no_run
/// use tierconf::adapters::FileWatcher;
/// use tierconf::ports::ConfigWatcher;
/// use std::sync::Arc;
///
/// # fn main() -> tierconf::domain::Result<()> {
/// let mut watcher = FileWatcher::new("/path/to/config.yaml", None)?;
///
/// watcher.watch(Arc::new(|key| {
///     println!("Configuration file changed: {}", key);
/// }))?;
///
/// // Later, stop watching
/// watcher.stop()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileWatcher {
    /// Canonical path of the watched file
    file_path: PathBuf,
    debounce_delay: Duration,
    watcher: Option<RecommendedWatcher>,
    watch_thread: Option<JoinHandle<()>>,
    stop_flag: Arc<AtomicBool>,
}

impl FileWatcher {
    /// Creates a new file watcher for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file to watch
    /// * `debounce_delay` - Optional debounce delay (default 500ms)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WatcherError`] if the file does not exist.
    pub fn new(path: impl AsRef<Path>, debounce_delay: Option<Duration>) -> Result<Self> {
        let path = path.as_ref();
        let file_path = path.canonicalize().map_err(|e| ConfigError::WatcherError {
            message: format!("File does not exist: {}", path.display()),
            source: Some(Box::new(e)),
        })?;

        Ok(Self {
            file_path,
            debounce_delay: debounce_delay.unwrap_or(DEFAULT_DEBOUNCE),
            watcher: None,
            watch_thread: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns the canonical path being watched.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

fn is_relevant(event: &Event, file_name: &OsString) -> bool {
    !matches!(event.kind, EventKind::Access(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

fn run_event_loop(
    events: Receiver<notify::Result<Event>>,
    stop_flag: Arc<AtomicBool>,
    file_path: PathBuf,
    file_name: OsString,
    debounce_delay: Duration,
    callback: ChangeCallback,
) {
    let key = ConfigKey::from(file_path.to_string_lossy().as_ref());
    let mut pending_since: Option<Instant> = None;

    while !stop_flag.load(Ordering::SeqCst) {
        match events.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(event)) if is_relevant(&event, &file_name) => {
                pending_since = Some(Instant::now());
            }
            Ok(Ok(_)) | Err(RecvTimeoutError::Timeout) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, path = %file_path.display(), "File watch error"),
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if pending_since.is_some_and(|since| since.elapsed() >= debounce_delay) {
            pending_since = None;
            tracing::debug!(path = %file_path.display(), "Configuration file changed");
            callback(key.clone());
        }
    }
}

impl ConfigWatcher for FileWatcher {
    fn watch(&mut self, callback: ChangeCallback) -> Result<()> {
        if self.watcher.is_some() {
            return Err(ConfigError::WatcherError {
                message: "Watcher is already running".to_string(),
                source: None,
            });
        }

        let (parent, file_name) = match (self.file_path.parent(), self.file_path.file_name()) {
            (Some(parent), Some(name)) => (parent.to_path_buf(), name.to_os_string()),
            _ => {
                return Err(ConfigError::WatcherError {
                    message: format!("Cannot watch {}", self.file_path.display()),
                    source: None,
                })
            }
        };

        let (event_tx, event_rx) = channel();
        let mut watcher =
            RecommendedWatcher::new(event_tx, notify::Config::default()).map_err(|e| {
                ConfigError::WatcherError {
                    message: format!("Failed to create file watcher: {}", e),
                    source: Some(Box::new(e)),
                }
            })?;
        watcher
            .watch(&parent, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatcherError {
                message: format!("Failed to start watching: {}", e),
                source: Some(Box::new(e)),
            })?;

        self.stop_flag.store(false, Ordering::SeqCst);
        let stop_flag = Arc::clone(&self.stop_flag);
        let file_path = self.file_path.clone();
        let debounce_delay = self.debounce_delay;

        let watch_thread = thread::Builder::new()
            .name("tierconf-file-watcher".to_string())
            .spawn(move || {
                run_event_loop(event_rx, stop_flag, file_path, file_name, debounce_delay, callback)
            })
            .map_err(|e| ConfigError::WatcherError {
                message: format!("Failed to spawn watcher thread: {}", e),
                source: Some(Box::new(e)),
            })?;

        tracing::debug!(path = %self.file_path.display(), "Started file watcher");
        self.watcher = Some(watcher);
        self.watch_thread = Some(watch_thread);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.stop_flag.store(true, Ordering::SeqCst);
        // Dropping the notify watcher disconnects the event channel.
        self.watcher = None;

        if let Some(handle) = self.watch_thread.take() {
            // Stopping from inside a callback must not join the calling thread.
            if handle.thread().id() == thread::current().id() {
                return Ok(());
            }
            handle.join().map_err(|_| ConfigError::WatcherError {
                message: "Failed to join watcher thread".to_string(),
                source: None,
            })?;
        }
        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
