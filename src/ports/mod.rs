// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the interfaces between the store and the outside
//! world: where configuration comes from (`ConfigSource`, `ConfigParser`),
//! what tells the store to reload (`ConfigWatcher`), and who hears about
//! changes (`ChangeListener`).

pub mod listener;
pub mod parser;
pub mod source;
pub mod watcher;

// Re-export commonly used types
pub use listener::{ChangeListener, Notification, ReloadReport};
pub use parser::ConfigParser;
pub use source::ConfigSource;
pub use watcher::{ChangeCallback, ConfigWatcher};
