//! Cycle digest: one outbound notification unit per cycle
//!
//! Bundling every decision from a cycle into a single digest keeps dispatch
//! at one notification per cycle instead of one per issue.

use crate::domain::finding::Severity;
use crate::domain::issue::{NotifyDecision, Transition};
use serde::{Deserialize, Serialize};

/// One entry of a cycle digest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestEntry {
    pub issue_key: String,
    pub status: Transition,
    pub severity: Severity,
    pub message: String,
    pub occurrence_count: u64,
}

/// The batched notification decisions of one cycle
///
/// Consumed exactly once by the dispatch collaborator, then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleDigest {
    pub cycle: u64,
    pub entries: Vec<DigestEntry>,
}

impl CycleDigest {
    /// One-line summary suitable as a notification subject,
    /// e.g. `2 new, 1 ongoing, 3 resolved`
    pub fn summary(&self) -> String {
        let count = |t: Transition| self.entries.iter().filter(|e| e.status == t).count();
        format!(
            "{} new, {} ongoing, {} resolved",
            count(Transition::New),
            count(Transition::Ongoing),
            count(Transition::Resolved)
        )
    }

    /// Highest severity among the entries
    pub fn max_severity(&self) -> Option<Severity> {
        self.entries.iter().map(|e| e.severity).max()
    }
}

/// Aggregates a cycle's notify decisions into one outbound digest
pub struct DigestBuilder;

impl DigestBuilder {
    /// Build the digest for a cycle, or `None` when there is nothing to send
    ///
    /// Entries are ordered new, ongoing, resolved, and by issue key within
    /// each group, so identical decision sets always produce identical
    /// digests.
    pub fn build(cycle: u64, decisions: &[NotifyDecision]) -> Option<CycleDigest> {
        if decisions.is_empty() {
            return None;
        }

        let mut entries: Vec<DigestEntry> = decisions
            .iter()
            .map(|d| DigestEntry {
                issue_key: d.issue_key.clone(),
                status: d.transition,
                severity: d.severity,
                message: d.message.clone(),
                occurrence_count: d.occurrence_count,
            })
            .collect();
        entries.sort_by(|a, b| (a.status, &a.issue_key).cmp(&(b.status, &b.issue_key)));

        Some(CycleDigest { cycle, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(key: &str, transition: Transition) -> NotifyDecision {
        NotifyDecision {
            issue_key: key.to_string(),
            transition,
            severity: Severity::Critical,
            message: format!("issue {}", key),
            occurrence_count: 1,
            cycle: 7,
        }
    }

    #[test]
    fn test_empty_decisions_build_nothing() {
        assert!(DigestBuilder::build(1, &[]).is_none());
    }

    #[test]
    fn test_entries_ordered_by_transition_then_key() {
        let decisions = vec![
            decision("b", Transition::Resolved),
            decision("z", Transition::New),
            decision("a", Transition::New),
            decision("c", Transition::Ongoing),
        ];

        let digest = DigestBuilder::build(7, &decisions).unwrap();
        let keys: Vec<&str> = digest.entries.iter().map(|e| e.issue_key.as_str()).collect();
        assert_eq!(keys, vec!["a", "z", "c", "b"]);
        assert_eq!(digest.cycle, 7);
    }

    #[test]
    fn test_summary_counts() {
        let decisions = vec![
            decision("a", Transition::New),
            decision("b", Transition::New),
            decision("c", Transition::Resolved),
        ];

        let digest = DigestBuilder::build(3, &decisions).unwrap();
        assert_eq!(digest.summary(), "2 new, 0 ongoing, 1 resolved");
    }

    #[test]
    fn test_max_severity() {
        let mut decisions = vec![decision("a", Transition::New)];
        decisions[0].severity = Severity::Warning;
        decisions.push(decision("b", Transition::New));

        let digest = DigestBuilder::build(1, &decisions).unwrap();
        assert_eq!(digest.max_severity(), Some(Severity::Critical));
    }
}
