//! Findings: rule firings for the current cycle
//!
//! A finding is ephemeral; the full set is recomputed every cycle and the
//! issue key is the only identity that survives across cycles.

use crate::domain::observation::SourceKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime};

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational, no action needed
    Info,
    /// Attention recommended
    Warning,
    /// Action required
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// What the rule actually saw when it fired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OccurrenceDetail {
    /// Pod status text that matched an alert status
    Status(String),
    /// Accumulated match count over the rule's time window
    MatchCount { count: u64, window: Duration },
    /// Path probe came back negative
    Unreachable,
}

/// A rule firing against an observation in the current cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Deterministic composite identifying one monitored failure mode,
    /// e.g. `pod_status/default/api-0/CrashLoopBackOff`
    pub issue_key: String,
    /// Rule that produced this finding
    pub rule_id: String,
    /// Source kind the underlying observation came from
    pub source_kind: SourceKind,
    pub severity: Severity,
    pub message: String,
    pub timestamp: SystemTime,
    pub detail: OccurrenceDetail,
}
