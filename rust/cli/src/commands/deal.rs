//! Deal command handler for single-round dealing and display.
//!
//! This module provides the `deal` command which plays exactly one round of
//! the chosen game face up, with seeding support for deterministic output.
//! Blackjack stops at the deal (naturals settle and are shown); roulette
//! spins a single red bet; slots pulls one line; poker checks every seat
//! down to the showdown so the full board and winner are visible.

use crate::GameChoice;
use crate::error::CliError;
use crate::formatters::{format_board, format_outcome, format_pocket, format_reels};
use greenfelt_engine::blackjack::BlackjackRound;
use greenfelt_engine::poker::{DEFAULT_OPPONENTS, PokerAction, PokerRound};
use greenfelt_engine::roulette::{BetKind, RouletteRound};
use greenfelt_engine::slots::SlotsMachine;
use greenfelt_engine::wallet::ChipWallet;
use std::io::Write;

/// Stake used for the inspection deal; the wallet holds exactly this much.
const DEAL_STAKE: u64 = 10;

/// Handle the deal command.
///
/// Plays one round of `game` and prints it face up, including the dealer's
/// hole card and every poker seat's holes. Supports optional seeding for
/// deterministic dealing and reproducibility.
///
/// # Arguments
///
/// * `game` - Which table to deal at
/// * `seed` - Optional RNG seed for deterministic dealing
/// * `out` - Output stream for command results
///
/// # Returns
///
/// Returns `Ok(())` on success, or `CliError` on I/O errors.
///
/// # Examples
///
/// ```ignore
/// // Internal command handler - not part of public API
/// use greenfelt_cli::GameChoice;
/// use greenfelt_cli::commands::deal::handle_deal_command;
/// let mut out = Vec::new();
/// handle_deal_command(GameChoice::Blackjack, Some(42), &mut out).unwrap();
/// ```
pub fn handle_deal_command(
    game: GameChoice,
    seed: Option<u64>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let base_seed = seed.unwrap_or_else(rand::random);
    match game {
        GameChoice::Blackjack => deal_blackjack(base_seed, out),
        GameChoice::Roulette => deal_roulette(base_seed, out),
        GameChoice::Slots => deal_slots(base_seed, out),
        GameChoice::Poker => deal_poker(base_seed, out),
    }
}

fn deal_blackjack(seed: u64, out: &mut dyn Write) -> Result<(), CliError> {
    let mut wallet = ChipWallet::new(DEAL_STAKE);
    let mut round = BlackjackRound::new(Some(seed));
    round.deal(DEAL_STAKE, &mut wallet)?;

    writeln!(
        out,
        "Player: {} ({})",
        format_board(round.player_hand()),
        round.player_value()
    )?;
    writeln!(
        out,
        "Dealer: {} ({})",
        format_board(round.dealer_hand()),
        round.dealer_value()
    )?;
    if let Some(summary) = round.settlement() {
        writeln!(out, "Natural: {}", format_outcome(&summary.outcome))?;
    }
    Ok(())
}

fn deal_roulette(seed: u64, out: &mut dyn Write) -> Result<(), CliError> {
    let mut wallet = ChipWallet::new(DEAL_STAKE);
    let mut table = RouletteRound::new(Some(seed));
    table.place_bet(BetKind::Red, DEAL_STAKE, &wallet)?;
    let report = table.spin(&mut wallet)?;

    writeln!(out, "Bet: {} chips on red", DEAL_STAKE)?;
    writeln!(
        out,
        "The ball lands on {}",
        format_pocket(report.pocket, report.color)
    )?;
    if let Some(summary) = table.summary() {
        writeln!(
            out,
            "Settled: {}, payout {}",
            format_outcome(&summary.outcome),
            summary.payout
        )?;
    }
    Ok(())
}

fn deal_slots(seed: u64, out: &mut dyn Write) -> Result<(), CliError> {
    let mut wallet = ChipWallet::new(DEAL_STAKE);
    let mut machine = SlotsMachine::new(Some(seed));
    let result = machine.spin(DEAL_STAKE, &mut wallet)?;

    writeln!(out, "Reels: {}", format_reels(&result.reels))?;
    writeln!(
        out,
        "Settled: {}, payout {}",
        format_outcome(&result.outcome),
        result.payout
    )?;
    Ok(())
}

fn deal_poker(seed: u64, out: &mut dyn Write) -> Result<(), CliError> {
    let mut wallet = ChipWallet::new(DEAL_STAKE);
    let mut round = PokerRound::new(DEAL_STAKE, &DEFAULT_OPPONENTS, Some(seed), &mut wallet)?;

    // Check every seat down so the full board and showdown are visible
    while let Some(seat) = round.current_seat() {
        round.apply_action(seat, PokerAction::Call, &mut wallet)?;
    }

    for seat in round.seats() {
        let hole: Vec<_> = seat.hole().iter().flatten().copied().collect();
        writeln!(out, "{}: {}", seat.name(), format_board(&hole))?;
    }
    writeln!(out, "Board: {}", format_board(round.community()))?;
    if let Some(report) = round.report() {
        match &report.category {
            Some(category) => writeln!(
                out,
                "{} takes the pot ({} chips) with {}",
                report.winner,
                report.pot,
                category.label()
            )?,
            None => writeln!(
                out,
                "{} takes the pot ({} chips), everyone else folded",
                report.winner, report.pot
            )?,
        }
    }
    Ok(())
}
