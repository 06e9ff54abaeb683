//! Observations: per-cycle facts about monitored sources
//!
//! Collectors produce a fresh set of observations every cycle; the engine
//! never mutates them and never carries them across cycles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// The kind of source an observation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Pod phase / container state reports
    PodStatus,
    /// Log scans (configured targets and global scanning)
    PodLogs,
    /// Network path reachability probes
    NetworkPath,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PodStatus => write!(f, "pod_status"),
            Self::PodLogs => write!(f, "pod_logs"),
            Self::NetworkPath => write!(f, "network_path"),
        }
    }
}

/// Whether a log observation came from a configured target or the global scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogScope {
    /// A named target from `pod_log_monitoring.targets`
    Target,
    /// Any pod picked up by `global_pod_log_scanning`
    Global,
}

/// Pattern class a log line matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogClass {
    Error,
    Warning,
}

impl fmt::Display for LogClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// The observed value, one variant per source kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObservedValue {
    /// Status text for a pod (phase or container waiting/terminated reason)
    PodPhase(String),
    /// Number of pattern matches seen in this cycle's log window
    LogMatches {
        count: u64,
        scope: LogScope,
        class: LogClass,
    },
    /// Whether a monitored path answered the probe
    Reachable(bool),
}

/// One cycle's raw fact about a monitored source
///
/// `source_id` identifies the monitored object within its kind:
/// `namespace/pod` for statuses, the target name (or
/// `namespace/pod/container` for global scans) for logs, and the path for
/// reachability probes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub source_kind: SourceKind,
    pub source_id: String,
    pub timestamp: SystemTime,
    pub value: ObservedValue,
}

impl Observation {
    /// Observation of a pod's current status text
    pub fn pod_status(
        namespace: &str,
        pod: &str,
        status: impl Into<String>,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            source_kind: SourceKind::PodStatus,
            source_id: format!("{}/{}", namespace, pod),
            timestamp,
            value: ObservedValue::PodPhase(status.into()),
        }
    }

    /// Observation of match counts for a configured log target
    pub fn target_log_matches(target: &str, count: u64, timestamp: SystemTime) -> Self {
        Self {
            source_kind: SourceKind::PodLogs,
            source_id: target.to_string(),
            timestamp,
            value: ObservedValue::LogMatches {
                count,
                scope: LogScope::Target,
                class: LogClass::Error,
            },
        }
    }

    /// Observation of match counts from the global pod log scan
    pub fn global_log_matches(
        namespace: &str,
        pod: &str,
        container: &str,
        class: LogClass,
        count: u64,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            source_kind: SourceKind::PodLogs,
            source_id: format!("{}/{}/{}", namespace, pod, container),
            timestamp,
            value: ObservedValue::LogMatches {
                count,
                scope: LogScope::Global,
                class,
            },
        }
    }

    /// Observation of a network path probe
    pub fn path_reachability(path: &str, reachable: bool, timestamp: SystemTime) -> Self {
        Self {
            source_kind: SourceKind::NetworkPath,
            source_id: path.to_string(),
            timestamp,
            value: ObservedValue::Reachable(reachable),
        }
    }
}
