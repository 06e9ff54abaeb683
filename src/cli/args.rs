//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{Parser, Subcommand, ValueEnum};

/// Kubernetes watcher and alert engine
///
/// Watches pod statuses, pod logs and network paths on a fixed cadence and
/// turns findings into de-duplicated, lifecycle-aware notifications.
#[derive(Parser, Debug)]
#[command(name = "podwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "PODWATCH_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the watch loop
    Watch(WatchArgs),

    /// Validate the configuration and list the compiled rules
    CheckConfig,
}

/// Arguments for the watch command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Stop after this many cycles (default: run until stopped)
    #[arg(long)]
    pub cycles: Option<u64>,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format for machine parsing
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_watch() {
        let args = Cli::try_parse_from(["podwatch", "watch"]).unwrap();
        assert!(matches!(args.command, Commands::Watch(_)));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let args = Cli::try_parse_from(["podwatch", "-v", "check-config"]).unwrap();
        assert!(args.verbose);
        assert!(matches!(args.command, Commands::CheckConfig));
    }

    #[test]
    fn test_cli_parse_config_path() {
        let args =
            Cli::try_parse_from(["podwatch", "--config", "/tmp/config.yml", "watch"]).unwrap();
        assert_eq!(args.config.as_deref(), Some("/tmp/config.yml"));
    }

    #[test]
    fn test_cli_parse_cycle_limit() {
        let args = Cli::try_parse_from(["podwatch", "watch", "--cycles", "3"]).unwrap();
        if let Commands::Watch(watch) = args.command {
            assert_eq!(watch.cycles, Some(3));
        } else {
            panic!("Expected Watch command");
        }
    }

    #[test]
    fn test_cli_parse_json_format() {
        let args = Cli::try_parse_from(["podwatch", "--format", "json", "check-config"]).unwrap();
        assert!(matches!(args.format, OutputFormat::Json));
    }
}
