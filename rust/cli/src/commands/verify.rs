//! Verify command handler module.
//!
//! Validates round log integrity and payout rules compliance for JSONL round
//! log files. This module performs validation checks including:
//!
//! - Record structure (every line parses as a round record)
//! - Valid round ids (sequence format NNNNNN or dated format YYYYMMDD-NNNNNN)
//! - No duplicate round ids within a file
//! - Positive stakes
//! - Payout rules (wins pay out, pushes return the stake exactly, losses pay
//!   back less than the stake)
//! - Per-game meta checks: no duplicate cards in a blackjack deal, three
//!   reels per slots spin, roulette pockets on the wheel
//!
//! Errors are collected using the shared `BatchValidationError` pattern for structured reporting.

use crate::error::{BatchValidationError, CliError};
use crate::formatters::format_card;
use crate::io_utils::read_text_auto;
use greenfelt_engine::cards::Card;
use greenfelt_engine::history::{GameKind, Outcome, RoundRecord};
use std::collections::HashSet;
use std::io::Write;

/// Type alias for verify-specific batch validation errors.
/// The `usize` context represents the round index (1-based) for error reporting.
type VerifyError = BatchValidationError<usize>;

/// Handle the verify command - validate round log integrity.
///
/// Performs validation on JSONL round log files, checking record structure,
/// payout rules, and data integrity. Reports all errors found with round context.
///
/// # Arguments
///
/// * `input` - Path to JSONL file to verify
/// * `out` - Output stream for verification results (stdout)
/// * `err` - Output stream for error messages (stderr)
///
/// # Returns
///
/// `Result<(), CliError>`: `Ok(())` if all checks pass, otherwise an `Err` that maps to exit code `2`.
///
/// # Example
///
/// ```no_run
/// # use std::io;
/// # use greenfelt_cli::commands::handle_verify_command;
/// let input = "logs/session.jsonl".to_string();
/// let result = handle_verify_command(input, &mut io::stdout(), &mut io::stderr());
/// ```
pub fn handle_verify_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let mut errors: Vec<VerifyError> = Vec::new();
    let mut rounds = 0u64;
    let mut seen_ids: HashSet<String> = HashSet::new();

    // Sequence ids come from live sessions, dated ids from simulations
    let valid_id = |s: &str| -> bool {
        let dated = s.len() == 15
            && s[0..8].chars().all(|c| c.is_ascii_digit())
            && &s[8..9] == "-"
            && s[9..].chars().all(|c| c.is_ascii_digit());
        let sequence = !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        dated || sequence
    };

    let content = read_text_auto(&input)?;

    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        rounds += 1;

        let v: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(_) => {
                errors.push(VerifyError {
                    item_context: rounds as usize,
                    message: "Invalid JSON record".to_string(),
                });
                continue;
            }
        };

        let rec: RoundRecord = match serde_json::from_value(v.clone()) {
            Ok(rec) => rec,
            Err(_) => {
                errors.push(VerifyError {
                    item_context: rounds as usize,
                    message: "Invalid record structure".to_string(),
                });
                continue;
            }
        };

        if !valid_id(&rec.id) {
            errors.push(VerifyError {
                item_context: rounds as usize,
                message: "Invalid round id format".to_string(),
            });
        }
        if !seen_ids.insert(rec.id.clone()) {
            errors.push(VerifyError {
                item_context: rounds as usize,
                message: format!("Duplicate round id {}", rec.id),
            });
        }

        if rec.stake == 0 {
            errors.push(VerifyError {
                item_context: rounds as usize,
                message: "Stake must be at least 1 chip".to_string(),
            });
        }

        match rec.outcome {
            Outcome::Win => {
                if rec.payout == 0 {
                    errors.push(VerifyError {
                        item_context: rounds as usize,
                        message: "Winning round paid nothing".to_string(),
                    });
                }
            }
            Outcome::Push => {
                if rec.payout != rec.stake {
                    errors.push(VerifyError {
                        item_context: rounds as usize,
                        message: format!(
                            "Push payout {} does not match stake {}",
                            rec.payout, rec.stake
                        ),
                    });
                }
            }
            Outcome::Lose => {
                if rec.payout >= rec.stake {
                    errors.push(VerifyError {
                        item_context: rounds as usize,
                        message: format!(
                            "Losing round paid {} against stake {}",
                            rec.payout, rec.stake
                        ),
                    });
                }
            }
        }

        if let Some(meta) = v.get("meta") {
            validate_round_meta(rec.game, meta, rounds as usize, &mut errors);
        }
    }

    // Output results
    if errors.is_empty() {
        writeln!(out, "Verify: OK (rounds={})", rounds)?;
        Ok(())
    } else {
        writeln!(out, "Verify: FAIL (rounds={})", rounds)?;
        writeln!(err)?;
        writeln!(err, "Errors found:")?;
        for error in &errors {
            writeln!(err, "  Round {}: {}", error.item_context, error.message)?;
        }
        writeln!(err)?;
        let invalid_round_numbers: HashSet<usize> =
            errors.iter().map(|e| e.item_context).collect();
        let invalid_rounds = invalid_round_numbers.len() as u64;
        let percentage = if rounds > 0 {
            (invalid_rounds as f64 / rounds as f64 * 100.0).round() as u32
        } else {
            0
        };
        writeln!(
            err,
            "Summary: {} error(s) in {} rounds ({} invalid rounds, {}% invalid)",
            errors.len(),
            rounds,
            invalid_rounds,
            percentage
        )?;
        Err(CliError::InvalidInput(format!(
            "{} validation errors found",
            errors.len()
        )))
    }
}

/// Module-private helper: per-game meta payload checks.
///
/// Meta is optional and free-form, so only the fields a game is known to
/// write are checked, and only when present.
fn validate_round_meta(
    game: GameKind,
    meta: &serde_json::Value,
    round_index: usize,
    errors: &mut Vec<VerifyError>,
) {
    match game {
        GameKind::Blackjack => {
            // Player and dealer draw from one shoe, so no card repeats
            let mut seen_cards: HashSet<Card> = HashSet::new();
            let mut duplicate_cards: HashSet<Card> = HashSet::new();
            for hand in ["player", "dealer"] {
                let Some(cards) = meta.get(hand).and_then(|h| h.as_array()) else {
                    continue;
                };
                for card_val in cards {
                    match serde_json::from_value::<Card>(card_val.clone()) {
                        Ok(card) => {
                            if !seen_cards.insert(card) {
                                duplicate_cards.insert(card);
                            }
                        }
                        Err(_) => {
                            errors.push(VerifyError {
                                item_context: round_index,
                                message: format!("Invalid card in {} hand", hand),
                            });
                        }
                    }
                }
            }
            if !duplicate_cards.is_empty() {
                let mut cards: Vec<String> =
                    duplicate_cards.iter().map(|c| format_card(c)).collect();
                cards.sort();
                errors.push(VerifyError {
                    item_context: round_index,
                    message: format!("Duplicate card(s) detected: {}", cards.join(", ")),
                });
            }
        }
        GameKind::Roulette => {
            if let Some(pocket) = meta.get("pocket").and_then(|p| p.as_u64())
                && pocket > 36
            {
                errors.push(VerifyError {
                    item_context: round_index,
                    message: format!("Pocket {} is not on the wheel", pocket),
                });
            }
        }
        GameKind::Slots => {
            if let Some(reels) = meta.get("reels").and_then(|r| r.as_array())
                && reels.len() != 3
            {
                errors.push(VerifyError {
                    item_context: round_index,
                    message: format!("Expected 3 reels but found {}", reels.len()),
                });
            }
        }
        GameKind::Poker => {
            if let Some(community) = meta.get("community").and_then(|c| c.as_array())
                && community.len() > 5
            {
                errors.push(VerifyError {
                    item_context: round_index,
                    message: format!(
                        "Community board holds {} cards (maximum 5)",
                        community.len()
                    ),
                });
            }
        }
    }
}
