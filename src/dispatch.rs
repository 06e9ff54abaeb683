//! Notification and audit sinks
//!
//! The engine hands each cycle's digest to exactly one dispatcher and never
//! retries a failed delivery; an unresolved issue resurfaces on its normal
//! schedule. SMTP transport, HTML templating and on-disk alert logs live
//! behind these traits, outside the crate.

use crate::domain::{CycleDigest, Severity};
use crate::error::DispatchError;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Notification sink: consumes one digest per cycle
pub trait Dispatcher: Send + Sync {
    /// Sink name for logging
    fn name(&self) -> &str;

    /// Deliver one cycle digest
    fn dispatch(&self, digest: &CycleDigest) -> Result<(), DispatchError>;
}

/// Audit record emitted on graceful termination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminationRecord {
    /// Initiating actor, when resolvable
    pub actor: Option<String>,
    pub timestamp: SystemTime,
    pub reason: String,
}

impl TerminationRecord {
    /// Build a record for now, resolving the actor from the environment
    pub fn now(reason: impl Into<String>) -> Self {
        Self {
            actor: resolve_actor(),
            timestamp: SystemTime::now(),
            reason: reason.into(),
        }
    }
}

/// Resolve the initiating actor: login name, plus the client address when
/// running over SSH
fn resolve_actor() -> Option<String> {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .ok()?;

    match std::env::var("SSH_CONNECTION") {
        Ok(conn) => {
            let ip = conn.split_whitespace().next().unwrap_or("unknown");
            Some(format!("{} (from {})", user, ip))
        }
        Err(_) => Some(user),
    }
}

/// Audit sink: accepts termination records
pub trait AuditSink: Send + Sync {
    fn record_termination(&self, record: &TerminationRecord) -> Result<(), DispatchError>;
}

/// Dispatcher that writes digests through the logger
///
/// The default sink when no external notification collaborator is wired in.
#[derive(Debug, Default)]
pub struct LogDispatcher;

impl Dispatcher for LogDispatcher {
    fn name(&self) -> &str {
        "log"
    }

    fn dispatch(&self, digest: &CycleDigest) -> Result<(), DispatchError> {
        log::info!(
            "Cycle {} digest: {} ({} entries)",
            digest.cycle,
            digest.summary(),
            digest.entries.len()
        );
        for entry in &digest.entries {
            let line = format!(
                "[{}] {} {}: {} (seen {} cycle(s))",
                entry.severity,
                entry.status.to_string().to_uppercase(),
                entry.issue_key,
                entry.message,
                entry.occurrence_count
            );
            match entry.severity {
                Severity::Critical => log::error!("{}", line),
                Severity::Warning => log::warn!("{}", line),
                Severity::Info => log::info!("{}", line),
            }
        }
        Ok(())
    }
}

/// Audit sink that writes termination records through the logger
#[derive(Debug, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record_termination(&self, record: &TerminationRecord) -> Result<(), DispatchError> {
        log::info!(
            "Watcher terminated: {} (actor: {})",
            record.reason,
            record.actor.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }
}
