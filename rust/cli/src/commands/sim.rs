//! Simulation command handler for automated round generation.
//!
//! This module provides functionality to run automated casino rounds without
//! user input, generating round logs for the stats, verify, and export
//! commands. Blackjack plays a fixed hit-to-17 policy, roulette rotates
//! through the bet kinds, slots just spins, and poker deals every seat to a
//! house brain.
//!
//! Records are written with epoch timestamps and date-free sequence ids so a
//! seeded run produces byte-identical output.
//!
//! # Environment Variables
//!
//! - `GREENFELT_SIM_BREAK_AFTER`: Break after N rounds (for testing)
//!
//! # Examples
//!
//! ```no_run
//! use greenfelt_cli::GameChoice;
//! use greenfelt_cli::commands::sim::handle_sim_command;
//! use std::io;
//!
//! let mut out = io::stdout();
//! let mut err = io::stderr();
//!
//! // Run 1000 slots rounds with seed 42
//! handle_sim_command(
//!     GameChoice::Slots,
//!     1000,
//!     Some(10),
//!     Some("data/sim.jsonl".to_string()),
//!     Some(42),
//!     &mut out,
//!     &mut err,
//! )
//! .unwrap();
//! ```

use crate::GameChoice;
use crate::error::CliError;
use crate::ui;
use greenfelt_ai::{PokerBrain, create_brain, table_brains};
use greenfelt_engine::blackjack::{BlackjackPhase, BlackjackRound};
use greenfelt_engine::history::{Outcome, RoundRecord, RoundSummary};
use greenfelt_engine::logger::{RoundLogger, format_round_id};
use greenfelt_engine::poker::{DEFAULT_OPPONENTS, PokerRound, USER_SEAT};
use greenfelt_engine::roulette::{BetKind, RouletteRound};
use greenfelt_engine::slots::SlotsMachine;
use greenfelt_engine::wallet::ChipWallet;
use std::io::Write;

/// Timestamp written to every simulated record so seeded runs are reproducible.
const SIM_TS: &str = "1970-01-01T00:00:00Z";

/// Handle the sim command: run automated round simulations.
///
/// Generates and optionally records N rounds of one game. Each round uses a
/// fresh wallet holding exactly its stake, so the log is a sequence of
/// independent rounds rather than one bankroll's trajectory.
///
/// # Arguments
///
/// * `game` - Which game to simulate
/// * `rounds` - Total number of rounds to simulate
/// * `stake` - Stake per round (default 10)
/// * `output` - Path to save the round log (JSONL format)
/// * `seed` - Base RNG seed (each round uses seed + round_index)
/// * `out` - Output stream for normal messages
/// * `err` - Output stream for error messages
///
/// # Returns
///
/// `Ok(())` on success, or `CliError` on failure
///
/// # Environment Variables
///
/// - `GREENFELT_SIM_BREAK_AFTER`: Break after N rounds (for testing)
pub fn handle_sim_command(
    game: GameChoice,
    rounds: u64,
    stake: Option<u64>,
    output: Option<String>,
    seed: Option<u64>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let total: usize = rounds as usize;
    if total == 0 {
        ui::write_error(err, "rounds must be >= 1")?;
        return Err(CliError::InvalidInput("rounds must be >= 1".to_string()));
    }
    let stake = stake.unwrap_or(10);
    if stake == 0 {
        ui::write_error(err, "stake must be >= 1")?;
        return Err(CliError::InvalidInput("stake must be >= 1".to_string()));
    }

    let base_seed = seed.unwrap_or_else(rand::random);
    let mut logger = match output.as_ref() {
        Some(path) => Some(RoundLogger::create(path).map_err(|e| {
            let _ = ui::write_error(err, &format!("Failed to open {}: {}", path, e));
            CliError::Io(e)
        })?),
        None => None,
    };

    let break_after = std::env::var("GREENFELT_SIM_BREAK_AFTER")
        .ok()
        .and_then(|v| v.parse::<usize>().ok());

    let mut wins = 0u64;
    let mut losses = 0u64;
    let mut pushes = 0u64;
    let mut total_staked = 0u64;
    let mut total_paid = 0u64;
    let mut completed = 0usize;

    for i in 0..total {
        let round_seed = base_seed.wrapping_add(i as u64);
        let (summary, meta) = simulate_round(game, stake, round_seed, i)?;

        match summary.outcome {
            Outcome::Win => wins += 1,
            Outcome::Lose => losses += 1,
            Outcome::Push => pushes += 1,
        }
        total_staked += summary.stake;
        total_paid += summary.payout;

        if let Some(logger) = logger.as_mut() {
            let record = RoundRecord {
                id: format_round_id("19700101", (i + 1) as u32),
                game: summary.game,
                stake: summary.stake,
                outcome: summary.outcome,
                payout: summary.payout,
                ts: Some(SIM_TS.to_string()),
                meta: Some(meta),
            };
            logger.write(&record).map_err(|e| {
                let _ = ui::write_error(err, &format!("Failed to write round: {}", e));
                CliError::Io(e)
            })?;
        }

        completed += 1;

        if let Some(b) = break_after
            && completed == b
        {
            writeln!(out, "Interrupted: saved {}/{}", completed, total)?;
            return Err(CliError::Interrupted(format!(
                "Interrupted: saved {}/{}",
                completed, total
            )));
        }
    }

    let net = total_paid as i64 - total_staked as i64;
    let rtp = total_paid as f64 / total_staked as f64 * 100.0;
    writeln!(
        out,
        "Simulated: {} {} rounds (win {} / lose {} / push {}), net {:+} chips, observed RTP {:.1}%",
        completed,
        game.as_str(),
        wins,
        losses,
        pushes,
        net,
        rtp
    )?;
    Ok(())
}

/// Play one automated round and return its settlement and meta payload.
fn simulate_round(
    game: GameChoice,
    stake: u64,
    seed: u64,
    index: usize,
) -> Result<(RoundSummary, serde_json::Value), CliError> {
    // Each round gets a wallet holding exactly its stake
    let mut wallet = ChipWallet::new(stake);
    match game {
        GameChoice::Blackjack => {
            let mut round = BlackjackRound::new(Some(seed));
            round.deal(stake, &mut wallet)?;
            // Dealer-mirroring policy: draw to 17, then stand
            while round.phase() == BlackjackPhase::PlayerTurn {
                if round.player_value() < 17 {
                    round.hit(&mut wallet)?;
                } else {
                    round.stand()?;
                }
            }
            if round.phase() == BlackjackPhase::DealerTurn {
                round.play_dealer(&mut wallet)?;
            }
            let summary = round
                .settlement()
                .ok_or("blackjack round did not settle")?;
            let meta = serde_json::json!({
                "player": round.player_hand(),
                "dealer": round.dealer_hand(),
                "player_value": round.player_value(),
                "dealer_value": round.dealer_value(),
            });
            Ok((summary, meta))
        }
        GameChoice::Roulette => {
            let mut table = RouletteRound::new(Some(seed));
            let kind = match index % 5 {
                0 => BetKind::Red,
                1 => BetKind::Black,
                2 => BetKind::Even,
                3 => BetKind::Odd,
                _ => BetKind::Straight {
                    number: (index % 37) as u8,
                },
            };
            table.place_bet(kind, stake, &wallet)?;
            let report = table.spin(&mut wallet)?;
            let summary = table
                .summary()
                .ok_or("roulette spin did not settle")?;
            let meta = serde_json::json!({
                "pocket": report.pocket,
                "color": report.color,
                "bet": kind,
            });
            Ok((summary, meta))
        }
        GameChoice::Slots => {
            let mut machine = SlotsMachine::new(Some(seed));
            let result = machine.spin(stake, &mut wallet)?;
            let summary = machine
                .summary()
                .ok_or("slots spin did not settle")?;
            let meta = serde_json::json!({ "reels": result.reels });
            Ok((summary, meta))
        }
        GameChoice::Poker => {
            let mut round = PokerRound::new(stake, &DEFAULT_OPPONENTS, Some(seed), &mut wallet)?;
            let mut brains = table_brains(&DEFAULT_OPPONENTS, seed);
            let mut user_brain = create_brain("player", seed);
            while let Some(seat) = round.current_seat() {
                let action = if seat == USER_SEAT {
                    user_brain.act(&round, seat)
                } else {
                    brains[seat - 1].act(&round, seat)
                };
                round.apply_action(seat, action, &mut wallet)?;
            }
            let summary = round
                .settlement()
                .ok_or("poker round did not settle")?;
            let meta = serde_json::json!({
                "community": round.community(),
                "winner": round.report().map(|r| r.winner.clone()),
            });
            Ok((summary, meta))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_sim_rejects_zero_rounds() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        let result = handle_sim_command(
            GameChoice::Slots,
            0,
            Some(10),
            None,
            Some(42),
            &mut out,
            &mut err,
        );

        assert!(matches!(result, Err(CliError::InvalidInput(_))));
        let err_str = String::from_utf8(err).unwrap();
        assert!(err_str.contains("rounds must be >= 1"));
    }

    #[test]
    fn test_sim_writes_one_record_per_round() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.jsonl");
        let mut out = Vec::new();
        let mut err = Vec::new();

        let result = handle_sim_command(
            GameChoice::Slots,
            25,
            Some(10),
            Some(path.to_str().unwrap().to_string()),
            Some(42),
            &mut out,
            &mut err,
        );

        assert!(result.is_ok());
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 25);
        for line in lines {
            let record: RoundRecord = serde_json::from_str(line).unwrap();
            assert_eq!(record.stake, 10);
            assert_eq!(record.ts.as_deref(), Some(SIM_TS));
        }
    }

    #[test]
    fn test_sim_is_deterministic_under_a_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path_a = dir.path().join("a.jsonl");
        let path_b = dir.path().join("b.jsonl");

        for path in [&path_a, &path_b] {
            let mut out = Vec::new();
            let mut err = Vec::new();
            handle_sim_command(
                GameChoice::Blackjack,
                10,
                Some(5),
                Some(path.to_str().unwrap().to_string()),
                Some(99),
                &mut out,
                &mut err,
            )
            .unwrap();
        }

        let a = std::fs::read_to_string(&path_a).unwrap();
        let b = std::fs::read_to_string(&path_b).unwrap();
        assert_eq!(a, b, "seeded sim runs should be byte-identical");
    }

    #[test]
    fn test_sim_summary_tallies_every_round() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        let result = handle_sim_command(
            GameChoice::Roulette,
            30,
            Some(5),
            None,
            Some(7),
            &mut out,
            &mut err,
        );

        assert!(result.is_ok());
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Simulated: 30 roulette rounds"));
    }

    #[test]
    fn test_sim_poker_rounds_settle() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        let result = handle_sim_command(
            GameChoice::Poker,
            10,
            Some(50),
            None,
            Some(13),
            &mut out,
            &mut err,
        );

        assert!(result.is_ok(), "poker sim failed: {:?}", result);
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Simulated: 10 poker rounds"));
    }

    #[test]
    fn test_sim_round_ids_are_sequential() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seq.jsonl");
        let mut out = Vec::new();
        let mut err = Vec::new();

        handle_sim_command(
            GameChoice::Slots,
            3,
            Some(10),
            Some(path.to_str().unwrap().to_string()),
            Some(1),
            &mut out,
            &mut err,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let ids: Vec<String> = content
            .lines()
            .map(|l| {
                serde_json::from_str::<RoundRecord>(l)
                    .unwrap()
                    .id
            })
            .collect();
        assert_eq!(ids, vec!["19700101-000001", "19700101-000002", "19700101-000003"]);
    }
}
