//! podwatch - Kubernetes watcher and alert engine
//!
//! A command-line tool that watches pod statuses, pod logs and network
//! paths and emails per-cycle digests of new, ongoing and resolved issues.

use clap::Parser;
use podwatch::cli::args::{Cli, Commands};
use podwatch::commands::{run_check_config, run_watch};
use podwatch::error::{AppError, ConfigError};

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Set log level based on verbose flag
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    match &cli.command {
        Commands::Watch(args) => run_watch(args, cli.config.as_deref()),

        Commands::CheckConfig => run_check_config(cli.format, cli.config.as_deref()),
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Config(ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Create a config.yml or pass one with --config.");
            eprintln!("      'podwatch check-config' validates it without starting the loop.");
        }
        AppError::NoRulesConfigured => {
            eprintln!();
            eprintln!("Hint: Enable at least one monitoring section in the configuration");
            eprintln!("      (pod_alert_statuses, pod_log_monitoring, network_path_monitoring,");
            eprintln!("      global_pod_log_scanning).");
        }
        _ => {}
    }
}
