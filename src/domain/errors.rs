// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration crate.
//!
//! This module defines the error types that can occur when loading sources,
//! decoding values or checking the process environment. All errors use
//! `thiserror` for proper error handling and conversion.

use thiserror::Error;

/// The main error type for configuration operations.
///
/// This enum represents all possible errors that can occur when loading, merging
/// or decoding configuration. It is marked as `#[non_exhaustive]` to allow
/// for future additions without breaking backwards compatibility.
///
/// Typed accessors on [`ValueView`](crate::domain::ValueView) never return
/// these errors; they fall back to a default instead. Only source loads, the
/// required-environment check and struct decoding are fallible.
///
/// # Examples
///
/// ```
/// use tierconf::domain::errors::ConfigError;
///
/// fn require_port(port: Option<i64>) -> Result<i64, ConfigError> {
///     port.ok_or_else(|| ConfigError::ConfigKeyNotFound {
///         key: "server.port".to_string(),
///     })
/// }
///
/// assert!(require_port(None).is_err());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The requested configuration key is not set in the resolved tree.
    #[error("Configuration key not found: {key}")]
    ConfigKeyNotFound {
        /// The key that was not found
        key: String,
    },

    /// Failed to convert a configuration value to the requested type.
    #[error(
        "Failed to convert configuration value for key '{key}' to type {target_type}: {source}"
    )]
    TypeConversionError {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An error occurred in a configuration source.
    #[error("Configuration source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to parse a configuration file or value.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A dotenv line is not of the form `KEY=VALUE`.
    #[error("Invalid line {line}: expected KEY=VALUE, got '{content}'")]
    InvalidLine {
        /// 1-based line number of the offending line
        line: usize,
        /// The trimmed line content
        content: String,
    },

    /// One or more required environment variables are not set.
    #[error("Missing required environment variables: {}", .names.join(", "))]
    MissingEnvVars {
        /// Every missing variable name, sorted
        names: Vec<String>,
    },

    /// A validation hook rejected the current configuration.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// The error message
        message: String,
    },

    /// An error occurred in a configuration watcher.
    #[error("Configuration watcher error: {message}")]
    WatcherError {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The reload scheduler was misused or could not start.
    #[error("Reload scheduler error: {message}")]
    SchedulerError {
        /// The error message
        message: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Wraps any error as a [`ConfigError::SourceError`] for the named source.
    pub fn source_error<E>(source_name: impl Into<String>, message: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConfigError::SourceError {
            source_name: source_name.into(),
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Creates a [`ConfigError::ValidationError`] from a message.
    pub fn validation(message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            message: message.into(),
        }
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
