//! Watch command implementation
//!
//! Wires configuration, collectors and the cycle scheduler together and
//! runs the watch loop in the foreground.

use crate::cli::args::WatchArgs;
use crate::collect::{Collector, PathProbeCollector};
use crate::dispatch::{LogAuditSink, LogDispatcher};
use crate::error::{AppError, Result};
use crate::rules::{RuleEvaluator, RuleSpec};
use crate::scheduler::{CycleScheduler, SchedulerConfig, StopSignal};
use crate::tracker::IssueTracker;
use std::sync::Arc;

/// Execute the watch command
pub fn run_watch(args: &WatchArgs, config_path: Option<&str>) -> Result<()> {
    let config = super::load_config(config_path)?;

    let compiled = config.compile();
    for warning in &compiled.warnings {
        eprintln!("Warning: {}", warning);
    }
    if compiled.rules.is_empty() {
        return Err(AppError::NoRulesConfigured);
    }
    println!("Loaded {} rule(s)", compiled.rules.len());

    let mut collectors: Vec<Arc<dyn Collector>> = Vec::new();
    for rule in &compiled.rules {
        match &rule.spec {
            RuleSpec::NetworkPath { path } => {
                collectors.push(Arc::new(PathProbeCollector::new(path.clone())));
            }
            // Pod statuses and logs come from an external collector
            // collaborator; without one those rules stay idle.
            RuleSpec::PodStatus { .. } | RuleSpec::LogPattern { .. } => {
                log::warn!(
                    "Rule '{}' needs an external {} collector; no observations will arrive for it",
                    rule.id,
                    rule.kind()
                );
            }
        }
    }

    let scheduler_config = SchedulerConfig {
        interval: config.interval(),
        collect_timeout: config.collect_timeout(),
        max_cycles: args.cycles,
    };

    println!(
        "Starting watch loop (interval: {}s, {} collector(s))",
        config.watcher_interval_seconds,
        collectors.len()
    );
    if args.cycles.is_none() {
        println!("Press Ctrl+C to stop");
    }

    let evaluator = RuleEvaluator::new(compiled.rules);
    let tracker = IssueTracker::new(config.ongoing_alert_cycles);

    let mut scheduler = CycleScheduler::new(
        scheduler_config,
        collectors,
        evaluator,
        tracker,
        Box::new(LogDispatcher),
        Box::new(LogAuditSink),
        StopSignal::new(),
    );
    scheduler.run()
}
