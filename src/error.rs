//! Unified error types for podwatch
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from an observation source
    #[error("Collection error: {0}")]
    Collect(#[from] CollectError),

    /// Error from notification dispatch
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// No rules survived configuration loading
    #[error("No valid rules configured; nothing to watch")]
    NoRulesConfigured,

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// A single rule failed validation (skipped with a warning, not fatal)
    #[error("Invalid rule '{rule}': {message}")]
    InvalidRule { rule: String, message: String },

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors from observation sources
///
/// A collector that fails or times out is skipped for the current cycle
/// only; these errors never abort the cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectError {
    /// The source did not answer within its deadline
    #[error("Source '{0}' timed out")]
    Timeout(String),

    /// The source was reached but reported a failure
    ///
    /// The collector name is a plain string, not a nested error; thiserror
    /// reserves the name `source` for error chaining.
    #[error("Source '{collector}' unavailable: {message}")]
    Unavailable { collector: String, message: String },
}

/// Errors from notification dispatch
///
/// Dispatch failures are logged and never retried; an unresolved issue
/// resurfaces on its normal schedule.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The dispatch sink rejected or failed to deliver the digest
    #[error("Delivery via '{sink}' failed: {message}")]
    DeliveryFailed { sink: String, message: String },

    /// IO error while writing a record
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
