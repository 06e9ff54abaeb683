//! Rule model and evaluation
//!
//! Rules are the closed set of configured criteria that interpret
//! observations: pod status membership, log-pattern thresholds over a time
//! window, and network path reachability. They are immutable after load and
//! carry their compiled regex matchers so nothing is recompiled per cycle.

pub mod evaluator;
pub mod window;

pub use evaluator::RuleEvaluator;
pub use window::SlidingWindow;

use crate::domain::{LogClass, Severity};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Which log observations a log-pattern rule applies to
#[derive(Debug, Clone)]
pub enum LogSelector {
    /// A named target from `pod_log_monitoring.targets`
    Target(String),
    /// Global scan observations of one pattern class
    Global(LogClass),
}

/// Kind-specific rule payload
#[derive(Debug, Clone)]
pub enum RuleSpec {
    /// Fire when a pod's status text is one of the alert statuses
    PodStatus { alert_statuses: Vec<String> },
    /// Fire when the windowed match count reaches the threshold
    LogPattern {
        selector: LogSelector,
        patterns: Vec<Regex>,
        threshold: u64,
        window: Duration,
    },
    /// Fire when the monitored path is unreachable
    NetworkPath { path: String },
}

/// A configured, validated monitoring criterion
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub severity: Severity,
    pub spec: RuleSpec,
}

impl Rule {
    pub fn pod_status(id: impl Into<String>, alert_statuses: Vec<String>) -> Self {
        Self {
            id: id.into(),
            severity: Severity::Critical,
            spec: RuleSpec::PodStatus { alert_statuses },
        }
    }

    pub fn log_target(
        id: impl Into<String>,
        target: impl Into<String>,
        patterns: Vec<Regex>,
        threshold: u64,
        window: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            severity: Severity::Critical,
            spec: RuleSpec::LogPattern {
                selector: LogSelector::Target(target.into()),
                patterns,
                threshold,
                window,
            },
        }
    }

    /// Global-scan rule: fires as soon as one line matches within a cycle
    pub fn global_logs(
        id: impl Into<String>,
        class: LogClass,
        patterns: Vec<Regex>,
        cycle_interval: Duration,
    ) -> Self {
        let severity = match class {
            LogClass::Error => Severity::Critical,
            LogClass::Warning => Severity::Warning,
        };
        Self {
            id: id.into(),
            severity,
            spec: RuleSpec::LogPattern {
                selector: LogSelector::Global(class),
                patterns,
                threshold: 1,
                window: cycle_interval,
            },
        }
    }

    pub fn network_path(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            severity: Severity::Critical,
            spec: RuleSpec::NetworkPath { path: path.into() },
        }
    }

    /// The rule kind as configured (`pod_status | log_pattern | network_path`)
    pub fn kind(&self) -> &'static str {
        match self.spec {
            RuleSpec::PodStatus { .. } => "pod_status",
            RuleSpec::LogPattern { .. } => "log_pattern",
            RuleSpec::NetworkPath { .. } => "network_path",
        }
    }

    /// Compiled log patterns, for collectors that scan on this rule's behalf
    pub fn patterns(&self) -> &[Regex] {
        match &self.spec {
            RuleSpec::LogPattern { patterns, .. } => patterns,
            _ => &[],
        }
    }

    /// Serializable one-line description for config inspection
    pub fn summary(&self) -> RuleSummary {
        let detail = match &self.spec {
            RuleSpec::PodStatus { alert_statuses } => {
                format!("statuses: {}", alert_statuses.join(", "))
            }
            RuleSpec::LogPattern {
                selector,
                patterns,
                threshold,
                window,
            } => {
                let scope = match selector {
                    LogSelector::Target(name) => format!("target '{}'", name),
                    LogSelector::Global(class) => format!("global {} scan", class),
                };
                format!(
                    "{}, {} pattern(s), threshold {} in {}",
                    scope,
                    patterns.len(),
                    threshold,
                    format_window(*window)
                )
            }
            RuleSpec::NetworkPath { path } => format!("path: {}", path),
        };

        RuleSummary {
            id: self.id.clone(),
            kind: self.kind(),
            severity: self.severity,
            detail,
        }
    }
}

/// Flattened rule description for CLI output
#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub id: String,
    pub kind: &'static str,
    pub severity: Severity,
    pub detail: String,
}

impl fmt::Display for RuleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<24} {:<12} {:<8} {}",
            self.id, self.kind, self.severity, self.detail
        )
    }
}

/// Render a duration in the config's window notation (`90s`, `10m`, `2h`, `1d`)
pub(crate) fn format_window(window: Duration) -> String {
    let secs = window.as_secs();
    if secs >= 86_400 && secs % 86_400 == 0 {
        format!("{}d", secs / 86_400)
    } else if secs >= 3_600 && secs % 3_600 == 0 {
        format!("{}h", secs / 3_600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
