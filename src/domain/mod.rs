// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core business logic and types.
//!
//! This module contains the configuration value model, the merge engine, the
//! change detector and the typed value view. It is independent of any
//! external concerns: nothing here touches the filesystem, the environment
//! or threads.

pub mod config_key;
pub mod config_value;
pub mod diff;
pub mod duration;
pub mod errors;
pub mod merge;
pub mod service;
pub mod tree;
pub mod value_view;

// Re-export commonly used types
pub use config_key::ConfigKey;
pub use config_value::{ConfigTree, ConfigValue};
pub use diff::{diff, ChangeSet};
pub use errors::{ConfigError, Result};
pub use merge::{merge, merge_into, normalize};
pub use service::ConfigurationService;
pub use value_view::ValueView;
