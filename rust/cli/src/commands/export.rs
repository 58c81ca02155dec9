//! Round log export command.
//!
//! This module provides functionality to convert round logs between
//! formats, currently CSV and JSON arrays.

use crate::error::CliError;
use crate::io_utils::read_text_auto;
use crate::ui;
use greenfelt_engine::history::{Outcome, RoundRecord};
use std::io::Write;

/// Handles the export command to convert round logs between formats.
///
/// # Arguments
///
/// * `input` - Path to input JSONL file
/// * `output` - Path to output file
/// * `format` - Output format ("csv" or "json")
/// * `out` - Output stream for status messages
/// * `err` - Output stream for error messages
///
/// # Returns
///
/// `Result<(), CliError>`: `Ok(())` when export completes successfully.
pub fn handle_export_command(
    input: String,
    output: String,
    format: String,
    _out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let content = read_text_auto(&input).map_err(|e| {
        let _ = ui::write_error(err, &format!("Failed to read {}: {}", input, e));
        CliError::Config(format!("Failed to read {}: {}", input, e))
    })?;

    match format.as_str() {
        f if f.eq_ignore_ascii_case("csv") => export_csv(&content, &output, err),
        f if f.eq_ignore_ascii_case("json") => export_json(&content, &output, err),
        _ => Err(CliError::InvalidInput(format!(
            "Unsupported format: {}",
            format
        ))),
    }
}

/// CSV keeps the JSONL's lowercase outcome spelling.
fn outcome_str(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "win",
        Outcome::Lose => "lose",
        Outcome::Push => "push",
    }
}

/// Export to CSV format
fn export_csv(content: &str, output: &str, err: &mut dyn Write) -> Result<(), CliError> {
    if let Some(parent) = std::path::Path::new(output).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            let _ = ui::write_error(
                err,
                &format!("Failed to create parent directory for {}: {}", output, e),
            );
            CliError::Io(e)
        })?;
    }
    let mut w = std::fs::File::create(output)
        .map(std::io::BufWriter::new)
        .map_err(|e| {
            let _ = ui::write_error(err, &format!("Failed to write {}: {}", output, e));
            CliError::Io(e)
        })?;
    writeln!(w, "id,game,stake,outcome,payout,ts")?;
    for (idx, line) in content.lines().filter(|l| !l.trim().is_empty()).enumerate() {
        let rec: RoundRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                ui::write_error(err, &format!("Invalid record at line {}: {}", idx + 1, e))?;
                return Err(CliError::InvalidInput(format!(
                    "Invalid record at line {}: {}",
                    idx + 1,
                    e
                )));
            }
        };
        let ts = rec.ts.unwrap_or_default();
        writeln!(
            w,
            "{},{},{},{},{},{}",
            rec.id,
            rec.game.as_str(),
            rec.stake,
            outcome_str(rec.outcome),
            rec.payout,
            ts
        )?;
    }
    Ok(())
}

/// Export to JSON array format
fn export_json(content: &str, output: &str, err: &mut dyn Write) -> Result<(), CliError> {
    let mut arr = Vec::new();
    for (idx, line) in content.lines().filter(|l| !l.trim().is_empty()).enumerate() {
        let v: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                ui::write_error(err, &format!("Invalid record at line {}: {}", idx + 1, e))?;
                return Err(CliError::InvalidInput(format!(
                    "Invalid record at line {}: {}",
                    idx + 1,
                    e
                )));
            }
        };
        arr.push(v);
    }
    let s = serde_json::to_string_pretty(&arr).map_err(|e| {
        let _ = ui::write_error(err, &format!("Failed to serialize JSON: {}", e));
        CliError::InvalidInput(format!("Failed to serialize JSON: {}", e))
    })?;
    if let Some(parent) = std::path::Path::new(output).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            let _ = ui::write_error(
                err,
                &format!("Failed to create parent directory for {}: {}", output, e),
            );
            CliError::Io(e)
        })?;
    }
    std::fs::write(output, s).map_err(|e| {
        let _ = ui::write_error(err, &format!("Failed to write {}: {}", output, e));
        CliError::Io(e)
    })?;
    Ok(())
}
