//! podwatch - Kubernetes watcher and alert engine
//!
//! A stateful evaluator that turns per-cycle observations of a cluster
//! (pod statuses, pod logs, network path reachability) into de-duplicated,
//! lifecycle-aware notifications.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`collect`]: Observation collection seam
//! - [`dispatch`]: Notification and audit sinks
//! - [`domain`]: Domain models
//! - [`error`]: Error types
//! - [`rules`]: Rule model and evaluation
//! - [`scheduler`]: Cycle loop and shutdown semantics
//! - [`tracker`]: Issue lifecycle tracking

pub mod cli;
pub mod collect;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod rules;
pub mod scheduler;
pub mod tracker;

#[cfg(test)]
pub mod mock;

pub use error::{AppError, Result};
