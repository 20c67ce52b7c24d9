// SPDX-License-Identifier: MIT OR Apache-2.0

//! A hexagonal architecture configuration engine.
//!
//! This crate merges configuration from prioritized sources (defaults,
//! environment variables, dotenv files, YAML files and explicit maps) into a
//! single hierarchical tree, and keeps that tree current with periodic or
//! file-triggered reloads.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types and logic (`ConfigKey`, `ConfigValue`, merge, diff, errors)
//! - **Ports**: Trait definitions that define interfaces (`ConfigSource`, `ConfigWatcher`)
//! - **Adapters**: Implementations for specific configuration sources (env vars, YAML, etc.)
//! - **Service**: The configuration store, its builder and the reload scheduler
//!
//! # Features
//!
//! - **Multiple Sources**: Defaults, environment variables, dotenv files, YAML files, maps
//! - **Deep Merge**: Higher priority sources override lower ones key by key
//! - **Typed Reads**: Lenient conversions through [`ValueView`](domain::ValueView)
//! - **Change Notification**: Listeners are told which keys changed after every update
//! - **Dynamic Reloading**: Timer driven reloads and optional file watching
//!
//! # Feature Flags
//!
//! - `yaml`: Enable YAML file support (default)
//! - `env`: Enable environment variable support (default)
//! - `dotenv`: Enable dotenv file support (default)
//! - `watch`: Enable reloading on file system changes
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tierconf::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let mut defaults = ConfigTree::new();
//! defaults.insert("server.port".to_string(), ConfigValue::from(8080));
//!
//! let store = ConfigStoreBuilder::new()
//!     .with_defaults(defaults)
//!     .from_env("APP_")
//!     .from_dotenv(".env")
//!     .from_file("config.yaml")
//!     .with_auto_reload(Duration::from_secs(30))
//!     .with_on_change(|key, value| println!("{} changed to {:?}", key, value))
//!     .build()?;
//!
//! let port = store.get("server.port").as_int();
//! let timeout = store.get("server.timeout").as_duration_or(Duration::from_secs(5));
//! # let _ = (port, timeout);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        ConfigError, ConfigKey, ConfigTree, ConfigValue, ConfigurationService, Result, ValueView,
    };
    pub use crate::ports::{
        ChangeListener, ConfigParser, ConfigSource, ConfigWatcher, Notification, ReloadReport,
    };
    pub use crate::service::{ConfigStore, ConfigStoreBuilder, ReloadState};

    // Re-export adapters based on feature flags
    pub use crate::adapters::MapAdapter;
    #[cfg(feature = "dotenv")]
    pub use crate::adapters::{DotenvFileAdapter, DotenvParser};
    #[cfg(feature = "env")]
    pub use crate::adapters::EnvVarAdapter;
    #[cfg(feature = "watch")]
    pub use crate::adapters::FileWatcher;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::{YamlFileAdapter, YamlParser};
}
