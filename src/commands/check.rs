//! Check-config command implementation
//!
//! Validates the configuration and lists the rules it compiles to.

use crate::cli::args::OutputFormat;
use crate::error::{AppError, ConfigError, Result};
use std::collections::BTreeMap;

/// Execute the check-config command
pub fn run_check_config(format: OutputFormat, config_path: Option<&str>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let compiled = config.compile();

    match format {
        OutputFormat::Json => {
            let summaries: Vec<_> = compiled.rules.iter().map(|r| r.summary()).collect();
            let mut report = BTreeMap::new();
            report.insert(
                "rules",
                serde_json::to_value(&summaries).map_err(ConfigError::from)?,
            );
            report.insert(
                "warnings",
                serde_json::to_value(&compiled.warnings).map_err(ConfigError::from)?,
            );
            let json = serde_json::to_string_pretty(&report).map_err(ConfigError::from)?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!(
                "Watcher: every {}s, ongoing re-alert every {} cycle(s), collect timeout {}s",
                config.watcher_interval_seconds,
                config.ongoing_alert_cycles,
                config.collect_timeout_seconds
            );
            println!("\nCompiled Rules:");
            println!("{:-<80}", "");
            for rule in &compiled.rules {
                println!("{}", rule.summary());
            }
            println!("{:-<80}", "");
            println!("Total rules: {}", compiled.rules.len());

            if !compiled.warnings.is_empty() {
                println!("\nWarnings:");
                for warning in &compiled.warnings {
                    println!("  - {}", warning);
                }
            }
        }
    }

    if compiled.rules.is_empty() {
        return Err(AppError::NoRulesConfigured);
    }
    Ok(())
}
