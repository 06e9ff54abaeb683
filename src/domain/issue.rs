//! Issue lifecycle types
//!
//! An issue is the stable identity of one recurring failure mode. Its state
//! lives in the [`crate::tracker::IssueTracker`] map and is created, advanced
//! and removed exclusively by the cycle loop.

use crate::domain::finding::Severity;
use crate::domain::observation::SourceKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a tracked issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueStatus {
    /// Seen for the first time this cycle
    New,
    /// Seen in at least two consecutive cycles
    Ongoing,
}

/// Per-issue state carried across cycles
///
/// Invariant: `consecutive_cycles` strictly increases while the key recurs
/// and resets only by removal of the whole state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueState {
    pub issue_key: String,
    /// Source kind of the finding that created this state; used to decide
    /// whether an absent finding means "resolved" or "source unavailable"
    pub source_kind: SourceKind,
    pub severity: Severity,
    /// Most recent finding message for this key
    pub message: String,
    pub first_seen_cycle: u64,
    pub consecutive_cycles: u64,
    pub status: IssueStatus,
    pub last_notified_cycle: Option<u64>,
}

/// Lifecycle transition that warrants a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Transition {
    New,
    Ongoing,
    Resolved,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Ongoing => write!(f, "ongoing"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

/// One notify-worthy decision produced by the tracker for this cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyDecision {
    pub issue_key: String,
    pub transition: Transition,
    pub severity: Severity,
    pub message: String,
    /// Consecutive cycles the issue has been observed (at decision time)
    pub occurrence_count: u64,
    pub cycle: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_display() {
        assert_eq!(Transition::New.to_string(), "new");
        assert_eq!(Transition::Ongoing.to_string(), "ongoing");
        assert_eq!(Transition::Resolved.to_string(), "resolved");
    }

    #[test]
    fn test_transition_ordering_for_digest() {
        assert!(Transition::New < Transition::Ongoing);
        assert!(Transition::Ongoing < Transition::Resolved);
    }
}
