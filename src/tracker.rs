//! Issue tracking across cycles
//!
//! The tracker owns the per-issue state map and is the only stateful step
//! between findings and notifications. It is driven exclusively by the cycle
//! loop, so no locking is needed, and its output is a pure function of
//! (prior state, current findings, cycle number, config): replaying the same
//! observation sequence from a fresh tracker reproduces the same decisions.

use crate::domain::{
    Finding, IssueState, IssueStatus, NotifyDecision, SourceKind, Transition,
};
use std::collections::{BTreeMap, BTreeSet};

/// Per-issue lifecycle state machine
///
/// Transitions per issue key and cycle:
/// - absent -> tracked: finding present, no prior state; notify "new"
/// - tracked -> tracked: finding present; count advances, notify "ongoing"
///   every `ongoing_alert_cycles` consecutive cycles
/// - tracked -> removed: no finding from a source that reported this cycle;
///   notify "resolved" and forget the key immediately
/// - a tracked key whose source did not report is left untouched
pub struct IssueTracker {
    issues: BTreeMap<String, IssueState>,
    ongoing_alert_cycles: u64,
}

impl IssueTracker {
    /// `ongoing_alert_cycles` is clamped to at least 1
    pub fn new(ongoing_alert_cycles: u64) -> Self {
        Self {
            issues: BTreeMap::new(),
            ongoing_alert_cycles: ongoing_alert_cycles.max(1),
        }
    }

    /// Number of currently tracked issues
    pub fn tracked(&self) -> usize {
        self.issues.len()
    }

    /// State of one tracked issue, if any
    pub fn state(&self, issue_key: &str) -> Option<&IssueState> {
        self.issues.get(issue_key)
    }

    /// Advance the state machine by one cycle
    ///
    /// `reported_sources` lists the source kinds whose collectors produced a
    /// result this cycle. A tracked issue can only resolve when its own
    /// source kind reported; data loss must not clear an active issue.
    pub fn update(
        &mut self,
        findings: &[Finding],
        reported_sources: &BTreeSet<SourceKind>,
        cycle: u64,
    ) -> Vec<NotifyDecision> {
        let mut decisions = Vec::new();

        // Key the findings; evaluator already de-duplicated, keep first on
        // the off chance of a duplicate
        let mut current: BTreeMap<&str, &Finding> = BTreeMap::new();
        for finding in findings {
            current.entry(finding.issue_key.as_str()).or_insert(finding);
        }

        for (&key, &finding) in &current {
            match self.issues.get_mut(key) {
                Some(state) => {
                    state.consecutive_cycles += 1;
                    state.status = IssueStatus::Ongoing;
                    state.severity = finding.severity;
                    state.message = finding.message.clone();

                    if state.consecutive_cycles % self.ongoing_alert_cycles == 0 {
                        state.last_notified_cycle = Some(cycle);
                        decisions.push(NotifyDecision {
                            issue_key: key.to_string(),
                            transition: Transition::Ongoing,
                            severity: state.severity,
                            message: state.message.clone(),
                            occurrence_count: state.consecutive_cycles,
                            cycle,
                        });
                    }
                }
                None => {
                    self.issues.insert(
                        key.to_string(),
                        IssueState {
                            issue_key: key.to_string(),
                            source_kind: finding.source_kind,
                            severity: finding.severity,
                            message: finding.message.clone(),
                            first_seen_cycle: cycle,
                            consecutive_cycles: 1,
                            status: IssueStatus::New,
                            last_notified_cycle: Some(cycle),
                        },
                    );
                    decisions.push(NotifyDecision {
                        issue_key: key.to_string(),
                        transition: Transition::New,
                        severity: finding.severity,
                        message: finding.message.clone(),
                        occurrence_count: 1,
                        cycle,
                    });
                }
            }
        }

        // Diff: tracked keys with no finding this cycle resolve, unless
        // their source went missing
        let resolved: Vec<String> = self
            .issues
            .iter()
            .filter(|(key, state)| {
                !current.contains_key(key.as_str())
                    && reported_sources.contains(&state.source_kind)
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in resolved {
            // Key came out of the map above, still present
            if let Some(state) = self.issues.remove(&key) {
                decisions.push(NotifyDecision {
                    issue_key: key,
                    transition: Transition::Resolved,
                    severity: state.severity,
                    message: state.message,
                    occurrence_count: state.consecutive_cycles,
                    cycle,
                });
            }
        }

        decisions
    }
}
