//! Rule evaluation
//!
//! Matches one cycle's observations against the configured rules and
//! produces the cycle's findings. The evaluator owns the per-source sliding
//! windows for log-pattern rules; everything else is stateless.

use crate::domain::{
    Finding, LogScope, ObservedValue, Observation, OccurrenceDetail, SourceKind,
};
use crate::rules::{format_window, LogSelector, Rule, RuleSpec, SlidingWindow};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, SystemTime};

/// Matches observations against rules, producing findings for the cycle
pub struct RuleEvaluator {
    /// Sorted by rule id so duplicate-key ties resolve deterministically
    rules: Vec<Rule>,
    /// Rolling match-count buffers keyed by (rule id, source id)
    windows: HashMap<(String, String), SlidingWindow>,
}

impl RuleEvaluator {
    pub fn new(mut rules: Vec<Rule>) -> Self {
        rules.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            rules,
            windows: HashMap::new(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate one cycle's observations
    ///
    /// If two rules produce the same issue key, the higher-severity finding
    /// wins; on equal severity the rule with the smaller id wins.
    pub fn evaluate(&mut self, observations: &[Observation], now: SystemTime) -> Vec<Finding> {
        self.sweep(now);

        let mut best: BTreeMap<String, Finding> = BTreeMap::new();

        for idx in 0..self.rules.len() {
            for obs in observations {
                let finding = match &self.rules[idx].spec {
                    RuleSpec::PodStatus { alert_statuses } => {
                        evaluate_pod_status(&self.rules[idx], alert_statuses, obs)
                    }
                    RuleSpec::LogPattern {
                        selector,
                        threshold,
                        window,
                        ..
                    } => {
                        let rule = &self.rules[idx];
                        evaluate_log_pattern(
                            rule,
                            selector,
                            *threshold,
                            *window,
                            obs,
                            now,
                            &mut self.windows,
                        )
                    }
                    RuleSpec::NetworkPath { path } => {
                        evaluate_network_path(&self.rules[idx], path, obs)
                    }
                };

                if let Some(finding) = finding {
                    match best.entry(finding.issue_key.clone()) {
                        Entry::Vacant(slot) => {
                            slot.insert(finding);
                        }
                        Entry::Occupied(mut slot) => {
                            if finding.severity > slot.get().severity {
                                slot.insert(finding);
                            }
                        }
                    }
                }
            }
        }

        best.into_values().collect()
    }

    /// Age out and drop windows that no longer hold any samples
    fn sweep(&mut self, now: SystemTime) {
        let spans: HashMap<&str, Duration> = self
            .rules
            .iter()
            .filter_map(|r| match &r.spec {
                RuleSpec::LogPattern { window, .. } => Some((r.id.as_str(), *window)),
                _ => None,
            })
            .collect();

        self.windows.retain(|(rule_id, _), window| {
            if let Some(span) = spans.get(rule_id.as_str()) {
                window.prune(now, *span);
            }
            !window.is_empty()
        });
    }

    #[cfg(test)]
    pub(crate) fn window_count(&self) -> usize {
        self.windows.len()
    }
}

fn evaluate_pod_status(rule: &Rule, alert_statuses: &[String], obs: &Observation) -> Option<Finding> {
    let status = match &obs.value {
        ObservedValue::PodPhase(status) => status,
        _ => return None,
    };
    if !alert_statuses.iter().any(|s| s == status) {
        return None;
    }

    let (namespace, pod) = obs.source_id.split_once('/').unwrap_or(("", &obs.source_id));
    Some(Finding {
        issue_key: format!("pod_status/{}/{}", obs.source_id, status),
        rule_id: rule.id.clone(),
        source_kind: SourceKind::PodStatus,
        severity: rule.severity,
        message: format!("Pod '{}' in '{}' is in '{}' state", pod, namespace, status),
        timestamp: obs.timestamp,
        detail: OccurrenceDetail::Status(status.clone()),
    })
}

fn evaluate_log_pattern(
    rule: &Rule,
    selector: &LogSelector,
    threshold: u64,
    span: Duration,
    obs: &Observation,
    now: SystemTime,
    windows: &mut HashMap<(String, String), SlidingWindow>,
) -> Option<Finding> {
    let (count, scope, class) = match &obs.value {
        ObservedValue::LogMatches { count, scope, class } => (*count, *scope, *class),
        _ => return None,
    };

    let applies = match selector {
        LogSelector::Target(name) => scope == LogScope::Target && obs.source_id == *name,
        LogSelector::Global(wanted) => scope == LogScope::Global && class == *wanted,
    };
    if !applies {
        return None;
    }

    let window = windows
        .entry((rule.id.clone(), obs.source_id.clone()))
        .or_default();
    window.prune(now, span);
    window.record(obs.timestamp, count);
    let total = window.total();
    if total < threshold {
        return None;
    }

    let (issue_key, message) = match selector {
        LogSelector::Target(name) => (
            format!("log/{}", name),
            format!(
                "Log threshold breached for '{}': {} matches in the last {}",
                name,
                total,
                format_window(span)
            ),
        ),
        LogSelector::Global(_) => (
            format!("global_pod_log_{}/{}", class, obs.source_id),
            format!(
                "Log {} pattern matched in '{}' ({} line(s))",
                class, obs.source_id, total
            ),
        ),
    };

    Some(Finding {
        issue_key,
        rule_id: rule.id.clone(),
        source_kind: SourceKind::PodLogs,
        severity: rule.severity,
        message,
        timestamp: obs.timestamp,
        detail: OccurrenceDetail::MatchCount {
            count: total,
            window: span,
        },
    })
}

fn evaluate_network_path(rule: &Rule, path: &str, obs: &Observation) -> Option<Finding> {
    let reachable = match obs.value {
        ObservedValue::Reachable(reachable) => reachable,
        _ => return None,
    };
    if reachable || obs.source_id != path {
        return None;
    }

    Some(Finding {
        issue_key: format!("network_path/{}", path),
        rule_id: rule.id.clone(),
        source_kind: SourceKind::NetworkPath,
        severity: rule.severity,
        message: format!("Network path '{}' is inaccessible", path),
        timestamp: obs.timestamp,
        detail: OccurrenceDetail::Unreachable,
    })
}
