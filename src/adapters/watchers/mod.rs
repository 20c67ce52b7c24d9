// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watcher implementations for configuration change detection.
//!
//! This module contains implementations of the `ConfigWatcher` trait that
//! turn changes to a source's backing medium into reload requests.

#[cfg(feature = "watch")]
pub mod file_watcher;

#[cfg(feature = "watch")]
pub use file_watcher::FileWatcher;
