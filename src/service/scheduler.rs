// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background reload scheduler.
//!
//! A scheduler owns one thread that waits for either its fixed-period timer
//! or a reload signal, runs the reload task, and rearms the timer. Signals
//! are single-slot: any number of triggers raised while a reload is pending
//! or in flight collapse into one further reload.

use crate::domain::{ConfigError, Result};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Lifecycle of a [`ReloadScheduler`].
///
/// The only transitions are `Idle -> Running -> Stopped` and
/// `Idle -> Stopped`. A stopped scheduler cannot be restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadState {
    /// Created but not started.
    Idle,
    /// The background loop is running.
    Running,
    /// Stopped; no further reloads will happen.
    Stopped,
}

#[derive(Debug)]
struct Control {
    state: ReloadState,
    pending: bool,
}

#[derive(Debug)]
struct Shared {
    control: Mutex<Control>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Timer and signal driven reload loop.
///
/// The task passed to [`start`](ReloadScheduler::start) returns `None` once
/// its target is gone, which ends the loop. A task error is logged and the
/// loop keeps its schedule.
///
/// # Examples
///
/// ```rust
/// use tierconf::service::{ReloadScheduler, ReloadState};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # fn main() -> tierconf::domain::Result<()> {
/// let runs = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&runs);
///
/// let mut scheduler = ReloadScheduler::new(Duration::from_secs(3600))?;
/// scheduler.start(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
///     Some(Ok(()))
/// })?;
/// assert_eq!(scheduler.state(), ReloadState::Running);
///
/// scheduler.trigger();
/// scheduler.stop();
/// assert_eq!(scheduler.state(), ReloadState::Stopped);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ReloadScheduler {
    interval: Duration,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl ReloadScheduler {
    /// Creates an idle scheduler with the given period.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SchedulerError`] for a zero interval.
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(ConfigError::SchedulerError {
                message: "auto-reload interval must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            interval,
            shared: Arc::new(Shared {
                control: Mutex::new(Control {
                    state: ReloadState::Idle,
                    pending: false,
                }),
                wake: Condvar::new(),
            }),
            handle: None,
        })
    }

    /// The reload period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReloadState {
        self.shared.lock().state
    }

    /// Starts the background loop, moving `Idle` to `Running`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SchedulerError`] unless the scheduler is idle,
    /// or [`ConfigError::IoError`] if the thread cannot be spawned.
    pub fn start<F>(&mut self, task: F) -> Result<()>
    where
        F: FnMut() -> Option<Result<()>> + Send + 'static,
    {
        {
            let mut control = self.shared.lock();
            if control.state != ReloadState::Idle {
                return Err(ConfigError::SchedulerError {
                    message: format!("cannot start a scheduler in state {:?}", control.state),
                });
            }
            control.state = ReloadState::Running;
        }

        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        let spawned = thread::Builder::new()
            .name("tierconf-reload".to_string())
            .spawn(move || run_loop(&shared, interval, task));

        match spawned {
            Ok(handle) => {
                tracing::info!(interval_ms = interval.as_millis() as u64, "Auto-reload started");
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.lock().state = ReloadState::Stopped;
                Err(ConfigError::IoError(e))
            }
        }
    }

    /// Requests a reload as soon as the loop is free. Returns `false` if the
    /// scheduler is not running.
    pub fn trigger(&self) -> bool {
        let mut control = self.shared.lock();
        if control.state != ReloadState::Running {
            return false;
        }
        control.pending = true;
        self.shared.wake.notify_all();
        true
    }

    /// Stops the loop and waits for an in-flight reload to finish.
    ///
    /// Calling `stop` from the reload task itself only signals the loop.
    pub fn stop(&mut self) {
        {
            let mut control = self.shared.lock();
            if control.state == ReloadState::Stopped && self.handle.is_none() {
                return;
            }
            control.state = ReloadState::Stopped;
            control.pending = false;
            self.shared.wake.notify_all();
        }

        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                tracing::error!("Reload thread panicked");
            }
            tracing::info!("Auto-reload stopped");
        }
    }
}

impl Drop for ReloadScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop<F>(shared: &Shared, interval: Duration, mut task: F)
where
    F: FnMut() -> Option<Result<()>>,
{
    let mut deadline = Instant::now() + interval;
    loop {
        let mut control = shared.lock();
        loop {
            if control.state == ReloadState::Stopped {
                return;
            }
            if control.pending {
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            control = match shared.wake.wait_timeout(control, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        control.pending = false;
        drop(control);

        match task() {
            None => {
                tracing::debug!("Reload target dropped; ending auto-reload loop");
                shared.lock().state = ReloadState::Stopped;
                return;
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Scheduled configuration reload failed; keeping previous configuration");
            }
            Some(Ok(())) => {}
        }
        deadline = Instant::now() + interval;
    }
}
