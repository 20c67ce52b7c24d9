// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the configuration store.
//!
//! This module contains [`ConfigStore`], the implementation of the
//! `ConfigurationService` trait, together with its builder and the
//! background reload scheduler.

pub mod builder;
pub mod scheduler;
pub mod store;

// Re-export commonly used types
pub use builder::{ConfigStoreBuilder, Validator};
pub use scheduler::{ReloadScheduler, ReloadState};
pub use store::ConfigStore;
