//! UI helper functions for terminal output formatting.
//!
//! This module provides utility functions for consistent user interface output
//! across CLI commands, including error messages, warnings, and status displays.

use std::io::Write;

pub fn write_error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "Error: {}", msg)
}

/// Display a warning message to stderr with "WARNING:" prefix
pub fn display_warning(err: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(err, "WARNING: {}", message)
}

/// Display the current balance line used by interactive tables.
pub fn write_balance(out: &mut dyn Write, chips: u64) -> std::io::Result<()> {
    writeln!(out, "Balance: {} chips", chips)
}
