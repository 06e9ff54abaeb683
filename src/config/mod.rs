//! Configuration system
//!
//! Parses the watcher's YAML configuration (`config.yml`) and compiles it
//! into the closed set of rule variants. Compilation validates each rule in
//! isolation: a malformed rule is skipped with a startup warning while the
//! rest of the configuration stays in effect. Only an unparsable top-level
//! file is fatal.

pub mod file;

pub use file::ConfigFile;

use crate::domain::LogClass;
use crate::error::ConfigError;
use crate::rules::Rule;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Top-level watcher configuration (logical schema of `config.yml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Seconds between cycle starts
    pub watcher_interval_seconds: u64,
    /// Re-notification cadence for persisting issues, in cycles
    pub ongoing_alert_cycles: u64,
    /// Shared per-cycle deadline for all collectors, in seconds
    pub collect_timeout_seconds: u64,
    /// Pod status texts that raise an issue
    pub pod_alert_statuses: Vec<String>,
    pub pod_log_monitoring: PodLogMonitoring,
    pub network_path_monitoring: NetworkPathMonitoring,
    pub global_pod_log_scanning: GlobalLogScanning,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            watcher_interval_seconds: 60,
            ongoing_alert_cycles: 20,
            collect_timeout_seconds: 30,
            pod_alert_statuses: Vec::new(),
            pod_log_monitoring: PodLogMonitoring::default(),
            network_path_monitoring: NetworkPathMonitoring::default(),
            global_pod_log_scanning: GlobalLogScanning::default(),
        }
    }
}

/// Threshold-based log monitoring for named targets
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PodLogMonitoring {
    pub enabled: bool,
    /// Lines of log tail the collector fetches per pod
    pub tail_lines: u64,
    pub targets: Vec<LogTargetConfig>,
}

/// One monitored log target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogTargetConfig {
    pub name: String,
    pub namespace: String,
    pub label_selector: String,
    pub error_patterns: Vec<String>,
    /// Matches required within the window before a finding is raised
    pub threshold: u64,
    /// Window notation: `30s`, `10m`, `2h`, `1d`
    pub time_window: String,
}

impl Default for LogTargetConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            namespace: "default".to_string(),
            label_selector: String::new(),
            error_patterns: Vec::new(),
            threshold: 1,
            time_window: "10m".to_string(),
        }
    }
}

/// Reachability monitoring for one mounted network path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkPathMonitoring {
    pub enabled: bool,
    pub path: Option<String>,
    /// Hint for the dispatch collaborator; the engine tracks regardless
    pub email_on_unreachable: bool,
}

impl Default for NetworkPathMonitoring {
    fn default() -> Self {
        Self {
            enabled: false,
            path: None,
            email_on_unreachable: true,
        }
    }
}

/// Pattern scanning across all pod logs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalLogScanning {
    pub enabled: bool,
    pub lines_to_scan: u64,
    pub include_namespaces: Vec<String>,
    pub exclude_namespaces: Vec<String>,
    pub error_patterns: Vec<String>,
    pub warning_patterns: Vec<String>,
}

impl Default for GlobalLogScanning {
    fn default() -> Self {
        Self {
            enabled: false,
            lines_to_scan: 100,
            include_namespaces: Vec::new(),
            exclude_namespaces: Vec::new(),
            error_patterns: Vec::new(),
            warning_patterns: Vec::new(),
        }
    }
}

/// Result of compiling a configuration into rules
#[derive(Debug)]
pub struct CompiledRules {
    pub rules: Vec<Rule>,
    /// One entry per skipped rule or pattern
    pub warnings: Vec<String>,
}

impl WatcherConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.watcher_interval_seconds)
    }

    pub fn collect_timeout(&self) -> Duration {
        Duration::from_secs(self.collect_timeout_seconds)
    }

    /// Compile the configuration into validated rules
    ///
    /// Every invalid rule is reported through a warning (and `log::warn`)
    /// and skipped; compilation itself never fails.
    pub fn compile(&self) -> CompiledRules {
        let mut rules = Vec::new();
        let mut warnings = Vec::new();

        if !self.pod_alert_statuses.is_empty() {
            rules.push(Rule::pod_status(
                "pod-status",
                self.pod_alert_statuses.clone(),
            ));
        }

        if self.pod_log_monitoring.enabled {
            let mut seen = BTreeSet::new();
            for target in &self.pod_log_monitoring.targets {
                match compile_target(target, &seen) {
                    Ok(rule) => {
                        seen.insert(target.name.clone());
                        rules.push(rule);
                    }
                    Err(e) => {
                        log::warn!("Skipping log target: {}", e);
                        warnings.push(e.to_string());
                    }
                }
            }
        }

        if self.global_pod_log_scanning.enabled {
            let interval = self.interval();
            for (class, patterns, id) in [
                (
                    LogClass::Error,
                    &self.global_pod_log_scanning.error_patterns,
                    "global-log-errors",
                ),
                (
                    LogClass::Warning,
                    &self.global_pod_log_scanning.warning_patterns,
                    "global-log-warnings",
                ),
            ] {
                let compiled = compile_patterns(id, patterns, &mut warnings);
                if !compiled.is_empty() {
                    rules.push(Rule::global_logs(id, class, compiled, interval));
                }
            }
        }

        if self.network_path_monitoring.enabled {
            match self.network_path_monitoring.path.as_deref() {
                Some(path) if !path.is_empty() => {
                    rules.push(Rule::network_path("network-path", path));
                }
                _ => {
                    let e = ConfigError::InvalidRule {
                        rule: "network-path".to_string(),
                        message: "monitoring enabled but no path configured".to_string(),
                    };
                    log::warn!("{}", e);
                    warnings.push(e.to_string());
                }
            }
        }

        CompiledRules { rules, warnings }
    }
}

fn compile_target(
    target: &LogTargetConfig,
    seen: &BTreeSet<String>,
) -> Result<Rule, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidRule {
        rule: if target.name.is_empty() {
            "<unnamed>".to_string()
        } else {
            target.name.clone()
        },
        message,
    };

    if target.name.is_empty() {
        return Err(invalid("target has no name".to_string()));
    }
    if seen.contains(&target.name) {
        return Err(invalid("duplicate target name".to_string()));
    }
    if target.threshold == 0 {
        return Err(invalid("threshold must be at least 1".to_string()));
    }
    if target.error_patterns.is_empty() {
        return Err(invalid("no error patterns configured".to_string()));
    }

    let window = parse_time_window(&target.time_window)
        .map_err(|e| invalid(format!("bad time_window '{}': {}", target.time_window, e)))?;

    let mut patterns = Vec::with_capacity(target.error_patterns.len());
    for pattern in &target.error_patterns {
        let regex = compile_pattern(pattern)
            .map_err(|e| invalid(format!("bad pattern '{}': {}", pattern, e)))?;
        patterns.push(regex);
    }

    Ok(Rule::log_target(
        format!("log-{}", target.name),
        target.name.clone(),
        patterns,
        target.threshold,
        window,
    ))
}

/// Compile a pattern list, dropping (and warning about) the bad ones
fn compile_patterns(rule_id: &str, patterns: &[String], warnings: &mut Vec<String>) -> Vec<Regex> {
    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        match compile_pattern(pattern) {
            Ok(regex) => compiled.push(regex),
            Err(e) => {
                let e = ConfigError::InvalidRule {
                    rule: rule_id.to_string(),
                    message: format!("bad pattern '{}': {}", pattern, e),
                };
                log::warn!("{}", e);
                warnings.push(e.to_string());
            }
        }
    }
    compiled
}

/// Patterns match case-insensitively, as the log scanners always have
fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Parse window notation (`30s`, `10m`, `2h`, `1d`) into a duration
pub fn parse_time_window(input: &str) -> Result<Duration, ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        key: "time_window".to_string(),
        message: message.to_string(),
    };

    let input = input.trim();

    // Strip the unit first; indexing by byte would panic on a multibyte
    // final character.
    let (number, unit_seconds) = if let Some(n) = input.strip_suffix('s') {
        (n, 1)
    } else if let Some(n) = input.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = input.strip_suffix('h') {
        (n, 3_600)
    } else if let Some(n) = input.strip_suffix('d') {
        (n, 86_400)
    } else {
        return Err(invalid("unit must be one of s, m, h, d"));
    };

    let value: u64 = number
        .parse()
        .map_err(|_| invalid("expected a number followed by s, m, h or d"))?;
    if value == 0 {
        return Err(invalid("window must be positive"));
    }

    Ok(Duration::from_secs(value * unit_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
watcher_interval_seconds: 30
ongoing_alert_cycles: 10
pod_alert_statuses: ["CrashLoopBackOff", "ImagePullBackOff"]
pod_log_monitoring:
  enabled: true
  tail_lines: 200
  targets:
    - name: api
      namespace: prod
      label_selector: "app=api"
      error_patterns: ["ERROR", "panic"]
      threshold: 5
      time_window: "10m"
network_path_monitoring:
  enabled: true
  path: /mnt/backup
global_pod_log_scanning:
  enabled: true
  error_patterns: ["fatal"]
  warning_patterns: ["deprecated"]
"#;

    #[test]
    fn test_defaults() {
        let config = WatcherConfig::default();
        assert_eq!(config.watcher_interval_seconds, 60);
        assert_eq!(config.ongoing_alert_cycles, 20);
        assert!(!config.pod_log_monitoring.enabled);
        assert!(config.network_path_monitoring.email_on_unreachable);
    }

    #[test]
    fn test_parse_sample_yaml() {
        let config: WatcherConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.watcher_interval_seconds, 30);
        assert_eq!(config.pod_log_monitoring.targets.len(), 1);
        assert_eq!(config.pod_log_monitoring.targets[0].threshold, 5);
        assert_eq!(config.network_path_monitoring.path.as_deref(), Some("/mnt/backup"));
    }

    #[test]
    fn test_compile_full_config() {
        let config: WatcherConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let compiled = config.compile();
        assert!(compiled.warnings.is_empty());

        let mut ids: Vec<&str> = compiled.rules.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(
            ids,
            vec![
                "global-log-errors",
                "global-log-warnings",
                "log-api",
                "network-path",
                "pod-status",
            ]
        );
    }

    #[test]
    fn test_bad_regex_skips_rule_keeps_rest() {
        let mut config: WatcherConfig = serde_yaml::from_str(SAMPLE).unwrap();
        config.pod_log_monitoring.targets[0].error_patterns = vec!["[unclosed".to_string()];

        let compiled = config.compile();
        assert_eq!(compiled.warnings.len(), 1);
        assert!(compiled.warnings[0].contains("log-api") || compiled.warnings[0].contains("api"));
        assert!(!compiled.rules.iter().any(|r| r.id == "log-api"));
        assert!(compiled.rules.iter().any(|r| r.id == "pod-status"));
    }

    #[test]
    fn test_bad_window_skips_rule() {
        let mut config: WatcherConfig = serde_yaml::from_str(SAMPLE).unwrap();
        config.pod_log_monitoring.targets[0].time_window = "soon".to_string();

        let compiled = config.compile();
        assert_eq!(compiled.warnings.len(), 1);
        assert!(!compiled.rules.iter().any(|r| r.id == "log-api"));
    }

    #[test]
    fn test_duplicate_target_names_skipped() {
        let mut config: WatcherConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let duplicate = config.pod_log_monitoring.targets[0].clone();
        config.pod_log_monitoring.targets.push(duplicate);

        let compiled = config.compile();
        assert_eq!(compiled.warnings.len(), 1);
        assert_eq!(
            compiled.rules.iter().filter(|r| r.id == "log-api").count(),
            1
        );
    }

    #[test]
    fn test_enabled_network_monitoring_without_path_warns() {
        let mut config = WatcherConfig::default();
        config.network_path_monitoring.enabled = true;

        let compiled = config.compile();
        assert!(compiled.rules.is_empty());
        assert_eq!(compiled.warnings.len(), 1);
    }

    #[test]
    fn test_global_scan_bad_pattern_dropped_good_kept() {
        let mut config = WatcherConfig::default();
        config.global_pod_log_scanning.enabled = true;
        config.global_pod_log_scanning.error_patterns =
            vec!["(bad".to_string(), "fatal".to_string()];

        let compiled = config.compile();
        assert_eq!(compiled.warnings.len(), 1);
        let rule = compiled
            .rules
            .iter()
            .find(|r| r.id == "global-log-errors")
            .unwrap();
        assert_eq!(rule.patterns().len(), 1);
    }

    #[test]
    fn test_parse_time_window() {
        assert_eq!(parse_time_window("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_time_window("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_time_window("2h").unwrap(), Duration::from_secs(7_200));
        assert_eq!(parse_time_window("1d").unwrap(), Duration::from_secs(86_400));
        assert!(parse_time_window("10").is_err());
        assert!(parse_time_window("m").is_err());
        assert!(parse_time_window("0m").is_err());
        assert!(parse_time_window("tenminutes").is_err());
    }

    #[test]
    fn test_parse_time_window_multibyte_unit() {
        // Must reject cleanly, not panic on a char boundary
        assert!(parse_time_window("10µ").is_err());
        assert!(parse_time_window("µ").is_err());
        assert!(parse_time_window("1µs").is_err());
    }

    #[test]
    fn test_multibyte_window_unit_skips_rule() {
        let mut config: WatcherConfig = serde_yaml::from_str(SAMPLE).unwrap();
        config.pod_log_monitoring.targets[0].time_window = "10µ".to_string();

        let compiled = config.compile();
        assert_eq!(compiled.warnings.len(), 1);
        assert!(!compiled.rules.iter().any(|r| r.id == "log-api"));
        assert!(compiled.rules.iter().any(|r| r.id == "pod-status"));
    }
}
