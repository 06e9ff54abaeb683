//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod check;
pub mod watch;

pub use check::run_check_config;
pub use watch::run_watch;

use crate::config::{ConfigFile, WatcherConfig};
use crate::error::{ConfigError, Result};

/// Load the configuration for a command
///
/// An explicit path must load cleanly; otherwise the default locations are
/// searched. Finding no file anywhere is fatal, matching an unparsable file.
fn load_config(explicit: Option<&str>) -> Result<WatcherConfig> {
    if let Some(path) = explicit {
        return Ok(ConfigFile::load(path)?);
    }
    ConfigFile::load_default().ok_or_else(|| {
        ConfigError::FileNotFound("no configuration file in default locations".to_string()).into()
    })
}
