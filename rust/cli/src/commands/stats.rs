//! Statistics aggregation command for round history analysis.
//!
//! This module provides functionality to aggregate statistics from JSONL
//! round logs. It computes summary metrics including total rounds played,
//! outcome and per-game distributions, and net chip movement, and validates
//! the payout rules each settled round must satisfy.

use crate::error::CliError;
use crate::io_utils::read_text_auto;
use crate::ui;
use greenfelt_engine::history::{GameKind, Outcome, RoundRecord};
use std::io::Write;
use std::path::Path;

/// Aggregates statistics from JSONL round log files.
///
/// Reads round logs (JSONL or .jsonl.zst) and computes summary statistics
/// including total rounds played, outcome distribution, per-game counts,
/// and net chip movement.
///
/// # Arguments
///
/// * `input` - Path to JSONL file or directory containing round logs
/// * `out` - Output stream for statistics report
/// * `err` - Output stream for error messages and warnings
///
/// # Returns
///
/// `Result<(), CliError>`: `Ok(())` when statistics are valid, otherwise an `Err` that maps
/// to exit code `2`.
///
/// # Validation
///
/// - Detects corrupted or incomplete records
/// - Verifies the payout rules (wins pay out, pushes return the stake,
///   losses pay back less than the stake)
/// - Reports warnings for skipped records
pub fn handle_stats_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    run_stats(&input, out, err)
}

/// Internal statistics aggregation implementation
fn run_stats(input: &str, out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    struct StatsState {
        rounds: u64,
        wins: u64,
        losses: u64,
        pushes: u64,
        blackjack: u64,
        roulette: u64,
        slots: u64,
        poker: u64,
        staked: u64,
        paid: u64,
        skipped: u64,
        corrupted: u64,
        stats_ok: bool,
    }

    fn consume_stats_content(
        content: String,
        state: &mut StatsState,
        err: &mut dyn Write,
    ) -> Result<(), CliError> {
        let has_trailing_nl = content.ends_with('\n');
        let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
        for (i, line) in lines.iter().enumerate() {
            let parsed: serde_json::Value = match serde_json::from_str(line) {
                Ok(v) => v,
                Err(_) => {
                    if i == lines.len() - 1 && !has_trailing_nl {
                        state.skipped += 1;
                    } else {
                        state.corrupted += 1;
                    }
                    continue;
                }
            };

            let rec: RoundRecord = match serde_json::from_value(parsed) {
                Ok(v) => v,
                Err(_) => {
                    state.corrupted += 1;
                    continue;
                }
            };

            // A settled round must obey the payout rules: a win pays more
            // than nothing, a push returns the stake exactly, and a loss
            // pays back less than the stake.
            let payout_ok = match rec.outcome {
                Outcome::Win => rec.payout > 0,
                Outcome::Push => rec.payout == rec.stake,
                Outcome::Lose => rec.payout < rec.stake,
            };
            if !payout_ok {
                state.stats_ok = false;
                ui::write_error(
                    err,
                    &format!("Payout rule violated at round {}", rec.id),
                )?;
            }

            state.rounds += 1;
            state.staked += rec.stake;
            state.paid += rec.payout;
            match rec.outcome {
                Outcome::Win => state.wins += 1,
                Outcome::Lose => state.losses += 1,
                Outcome::Push => state.pushes += 1,
            }
            match rec.game {
                GameKind::Blackjack => state.blackjack += 1,
                GameKind::Roulette => state.roulette += 1,
                GameKind::Slots => state.slots += 1,
                GameKind::Poker => state.poker += 1,
            }
        }
        Ok(())
    }

    let path = Path::new(input);
    let mut state = StatsState {
        rounds: 0,
        wins: 0,
        losses: 0,
        pushes: 0,
        blackjack: 0,
        roulette: 0,
        slots: 0,
        poker: 0,
        staked: 0,
        paid: 0,
        skipped: 0,
        corrupted: 0,
        stats_ok: true,
    };

    if path.is_dir() {
        let mut stack = vec![path.to_path_buf()];
        while let Some(d) = stack.pop() {
            let rd = match std::fs::read_dir(&d) {
                Ok(v) => v,
                Err(_) => continue,
            };
            for e in rd.filter_map(Result::ok) {
                let p = e.path();
                if p.is_dir() {
                    stack.push(p);
                } else if let Some(fname) = p.file_name().and_then(|f| f.to_str())
                    && (fname.ends_with(".jsonl") || fname.ends_with(".jsonl.zst"))
                {
                    match read_text_auto(&p.to_string_lossy()) {
                        Ok(content) => {
                            consume_stats_content(content, &mut state, err)?;
                        }
                        Err(_) => {
                            state.corrupted += 1;
                        }
                    }
                }
            }
        }
    } else {
        match read_text_auto(input) {
            Ok(s) => consume_stats_content(s, &mut state, err)?,
            Err(e) => {
                ui::write_error(err, &format!("Failed to read {}: {}", input, e))?;
                return Err(CliError::Config(format!("Failed to read {}: {}", input, e)));
            }
        }
    }

    if state.corrupted > 0 {
        ui::write_error(
            err,
            &format!("Skipped {} corrupted record(s)", state.corrupted),
        )?;
    }
    if state.skipped > 0 {
        ui::write_error(
            err,
            &format!("Discarded {} incomplete final line(s)", state.skipped),
        )?;
    }
    if !path.is_dir() && state.rounds == 0 && (state.corrupted > 0 || state.skipped > 0) {
        ui::write_error(err, "Invalid record")?;
        return Err(CliError::InvalidInput("Invalid record".to_string()));
    }

    let net = state.paid as i64 - state.staked as i64;
    let summary = serde_json::json!({
        "rounds": state.rounds,
        "outcomes": { "win": state.wins, "lose": state.losses, "push": state.pushes },
        "games": {
            "blackjack": state.blackjack,
            "roulette": state.roulette,
            "slots": state.slots,
            "poker": state.poker,
        },
        "net": net,
    });
    let json_output = serde_json::to_string_pretty(&summary)
        .map_err(|e| CliError::InvalidInput(format!("Failed to serialize stats: {}", e)))?;
    writeln!(out, "{}", json_output)?;
    if state.stats_ok {
        Ok(())
    } else {
        Err(CliError::InvalidInput(
            "Statistics validation failed".to_string(),
        ))
    }
}
