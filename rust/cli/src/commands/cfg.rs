//! Configuration command handler.
//!
//! This module implements the `cfg` command, which displays the current
//! Greenfelt configuration settings with their sources (default, environment,
//! or configuration file).
//!
//! # Example Output
//!
//! ```json
//! {
//!   "starting_chips": {
//!     "value": 1000,
//!     "source": "default"
//!   },
//!   "default_stake": {
//!     "value": 10,
//!     "source": "default"
//!   },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

/// Handle the cfg command.
///
/// Loads the current configuration with source tracking and displays it
/// as formatted JSON to the output stream.
///
/// # Arguments
///
/// * `out` - Output stream for command output
/// * `err` - Error stream for error messages
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(CliError)` if configuration loading fails or output writing fails
///
/// # Errors
///
/// Returns `CliError::Config` if configuration loading fails.
/// Returns `CliError::Io` if writing to output stream fails.
pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(CliError::Config(format!("Invalid configuration: {}", e)));
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "starting_chips": {
            "value": config.starting_chips,
            "source": sources.starting_chips,
        },
        "default_stake": {
            "value": config.default_stake,
            "source": sources.default_stake,
        },
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "log_dir": {
            "value": config.log_dir,
            "source": sources.log_dir,
        },
        "unicode": {
            "value": config.unicode,
            "source": sources.unicode,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
