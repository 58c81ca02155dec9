//! Interactive play command handler.
//!
//! This module implements the `play` command: a stdin-driven casino session
//! where the user moves between four tables (blackjack, roulette, slots,
//! poker), stakes chips from one wallet, and reviews history and statistics
//! at the lobby. Every settled round is recorded in the session history and,
//! when `--log` is given, appended to a JSONL round log.
//!
//! ## Input Model
//!
//! All input arrives line by line on the provided reader. Invalid lines
//! re-prompt rather than exit; EOF anywhere is a graceful quit. Quitting in
//! the middle of a blackjack or poker round finishes the round first (the
//! house stands or folds for you) so the wallet ledger stays balanced.

use crate::GameChoice;
use crate::error::CliError;
use crate::formatters::{
    format_action, format_bet_kind, format_board, format_card, format_outcome, format_pocket,
    format_reels,
};
use crate::io_utils::read_stdin_line;
use crate::ui;
use crate::validation::{
    self, BlackjackParse, LobbyChoice, PokerParse, RouletteParse, StakeParse,
};
use greenfelt_ai::{PokerBrain, table_brains};
use greenfelt_engine::blackjack::{BlackjackPhase, BlackjackRound, DealerStep};
use greenfelt_engine::history::{Outcome, RoundSummary, SessionHistory};
use greenfelt_engine::logger::RoundLogger;
use greenfelt_engine::poker::{DEFAULT_OPPONENTS, PokerAction, PokerRound, USER_SEAT};
use greenfelt_engine::roulette::RouletteRound;
use greenfelt_engine::slots::SlotsMachine;
use greenfelt_engine::wallet::{ChipWallet, Wallet};
use std::io::{BufRead, Write};

/// Buy-in offered at the poker table when the player just hits enter.
const DEFAULT_BUY_IN: u64 = 100;

/// How a table loop ended: back to the lobby, or out the door.
enum TableExit {
    Back,
    Quit,
}

/// Shared state for one casino sitting.
struct Session {
    wallet: ChipWallet,
    history: SessionHistory,
    logger: Option<RoundLogger>,
    base_seed: u64,
    rounds_dealt: u64,
    default_stake: u64,
}

impl Session {
    /// Per-round seed: the base seed perturbed by how many rounds started.
    fn next_seed(&mut self) -> u64 {
        let seed = self.base_seed.wrapping_add(self.rounds_dealt);
        self.rounds_dealt += 1;
        seed
    }

    /// Record a settled round in the history and the round log.
    fn settle(
        &mut self,
        summary: RoundSummary,
        meta: serde_json::Value,
        err: &mut dyn Write,
    ) -> Result<(), CliError> {
        let record = self.history.record_with_meta(summary, Some(meta));
        if let Some(logger) = self.logger.as_mut()
            && let Err(e) = logger.write(&record)
        {
            ui::display_warning(err, &format!("Failed to log round {}: {}", record.id, e))?;
        }
        Ok(())
    }
}

/// Handle the play command: an interactive casino session.
///
/// Resolves the starting balance, default stake, and seed from arguments
/// first and the configuration second, then runs the lobby loop (or sits
/// straight down at `game` when given).
///
/// # Arguments
///
/// * `game` - Table to sit at first; `None` opens the lobby prompt
/// * `chips` - Starting balance (config `starting_chips` when `None`)
/// * `stake` - Default stake at stake prompts (config `default_stake` when `None`)
/// * `seed` - Base RNG seed (config `seed`, else random, when `None`)
/// * `log` - Append settled rounds to this JSONL file
/// * `out` - Output stream for normal messages
/// * `err` - Output stream for error messages
/// * `stdin` - Line-based input source (stdin in production, a cursor in tests)
///
/// # Returns
///
/// `Ok(())` on a graceful quit (including EOF), or `CliError` on failure
#[allow(clippy::too_many_arguments)]
pub fn handle_play_command(
    game: Option<GameChoice>,
    chips: Option<u64>,
    stake: Option<u64>,
    seed: Option<u64>,
    log: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let cfg = crate::config::load().map_err(|e| CliError::Config(e.to_string()))?;

    let starting_chips = chips.unwrap_or(cfg.starting_chips);
    if starting_chips == 0 {
        ui::write_error(err, "chips must be >= 1")?;
        return Err(CliError::InvalidInput("chips must be >= 1".to_string()));
    }
    let default_stake = stake.unwrap_or(cfg.default_stake);
    if default_stake == 0 {
        ui::write_error(err, "stake must be >= 1")?;
        return Err(CliError::InvalidInput("stake must be >= 1".to_string()));
    }
    let base_seed = seed.or(cfg.seed).unwrap_or_else(rand::random);

    let logger = match log {
        Some(path) => Some(RoundLogger::create(&path).map_err(|e| {
            let _ = ui::write_error(err, &format!("Failed to open log {}: {}", path, e));
            CliError::Io(e)
        })?),
        None => None,
    };

    let mut session = Session {
        wallet: ChipWallet::new(starting_chips),
        history: SessionHistory::new(),
        logger,
        base_seed,
        rounds_dealt: 0,
        default_stake,
    };

    writeln!(
        out,
        "greenfelt casino: {} chips, seed {}",
        starting_chips, base_seed
    )?;

    // A preselected table skips the lobby until the player backs out of it.
    if let Some(game) = game {
        match run_table(game, &mut session, out, err, stdin)? {
            TableExit::Quit => return leave(&session, out),
            TableExit::Back => {}
        }
    }

    loop {
        writeln!(
            out,
            "Tables: [b]lackjack [r]oulette [s]lots [p]oker | balance history stats [q]uit"
        )?;
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = read_stdin_line(stdin) else {
            return leave(&session, out);
        };
        match validation::parse_lobby_choice(&line) {
            Ok(LobbyChoice::Blackjack) => {
                if let TableExit::Quit =
                    run_table(GameChoice::Blackjack, &mut session, out, err, stdin)?
                {
                    return leave(&session, out);
                }
            }
            Ok(LobbyChoice::Roulette) => {
                if let TableExit::Quit =
                    run_table(GameChoice::Roulette, &mut session, out, err, stdin)?
                {
                    return leave(&session, out);
                }
            }
            Ok(LobbyChoice::Slots) => {
                if let TableExit::Quit =
                    run_table(GameChoice::Slots, &mut session, out, err, stdin)?
                {
                    return leave(&session, out);
                }
            }
            Ok(LobbyChoice::Poker) => {
                if let TableExit::Quit =
                    run_table(GameChoice::Poker, &mut session, out, err, stdin)?
                {
                    return leave(&session, out);
                }
            }
            Ok(LobbyChoice::Balance) => {
                ui::write_balance(out, session.wallet.balance())?;
            }
            Ok(LobbyChoice::History) => {
                show_history(&session, out)?;
            }
            Ok(LobbyChoice::Stats) => {
                show_stats(&session, out)?;
            }
            Ok(LobbyChoice::Quit) => {
                return leave(&session, out);
            }
            Err(msg) => {
                ui::write_error(err, &msg)?;
            }
        }
    }
}

fn run_table(
    game: GameChoice,
    session: &mut Session,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<TableExit, CliError> {
    match game {
        GameChoice::Blackjack => blackjack_table(session, out, err, stdin),
        GameChoice::Roulette => roulette_table(session, out, err, stdin),
        GameChoice::Slots => slots_table(session, out, err, stdin),
        GameChoice::Poker => poker_table(session, out, err, stdin),
    }
}

fn leave(session: &Session, out: &mut dyn Write) -> Result<(), CliError> {
    writeln!(
        out,
        "You leave the casino with {} chips",
        session.wallet.balance()
    )?;
    Ok(())
}

fn show_history(session: &Session, out: &mut dyn Write) -> Result<(), CliError> {
    if session.history.is_empty() {
        writeln!(out, "No rounds played yet")?;
        return Ok(());
    }
    for record in session.history.recent(10) {
        writeln!(
            out,
            "{} {} {} stake {} payout {}",
            record.id,
            record.game.as_str(),
            format_outcome(&record.outcome),
            record.stake,
            record.payout
        )?;
    }
    Ok(())
}

fn show_stats(session: &Session, out: &mut dyn Write) -> Result<(), CliError> {
    let stats = session.history.stats();
    writeln!(
        out,
        "Rounds: {} | Win rate: {:.1}% | Net: {:+}",
        stats.total_games, stats.win_rate, stats.net_profit
    )?;
    Ok(())
}

fn write_settlement(out: &mut dyn Write, summary: &RoundSummary) -> Result<(), CliError> {
    match summary.outcome {
        Outcome::Win => writeln!(out, "WIN: {} chips paid", summary.payout)?,
        Outcome::Lose => writeln!(out, "LOSE: {} chips", summary.stake)?,
        Outcome::Push => writeln!(out, "PUSH: stake returned")?,
    }
    Ok(())
}

fn prompt(out: &mut dyn Write, text: &str) -> Result<(), CliError> {
    write!(out, "{}", text)?;
    out.flush()?;
    Ok(())
}

fn blackjack_table(
    session: &mut Session,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<TableExit, CliError> {
    writeln!(out, "-- Blackjack --")?;
    loop {
        prompt(out, &format!("Stake [{}] or back: ", session.default_stake))?;
        let Some(line) = read_stdin_line(stdin) else {
            return Ok(TableExit::Quit);
        };
        let stake = match validation::parse_stake(&line, session.default_stake) {
            StakeParse::Amount(n) => n,
            StakeParse::Back => return Ok(TableExit::Back),
            StakeParse::Quit => return Ok(TableExit::Quit),
            StakeParse::Invalid(msg) => {
                ui::write_error(err, &msg)?;
                continue;
            }
        };

        let mut round = BlackjackRound::new(Some(session.next_seed()));
        if let Err(e) = round.deal(stake, &mut session.wallet) {
            ui::write_error(err, &e.to_string())?;
            continue;
        }

        writeln!(
            out,
            "Dealer shows {}",
            format_board(round.visible_dealer_cards())
        )?;
        writeln!(
            out,
            "You: {} ({})",
            format_board(round.player_hand()),
            round.player_value()
        )?;

        let mut quitting = false;
        while round.phase() == BlackjackPhase::PlayerTurn {
            prompt(out, "hit or stand: ")?;
            let action = match read_stdin_line(stdin) {
                Some(line) => validation::parse_blackjack_action(&line),
                // EOF mid-hand: the house stands for you, then you leave
                None => BlackjackParse::Quit,
            };
            match action {
                BlackjackParse::Hit => {
                    let card = round.hit(&mut session.wallet)?;
                    writeln!(out, "You draw {}", format_card(&card))?;
                    writeln!(
                        out,
                        "You: {} ({})",
                        format_board(round.player_hand()),
                        round.player_value()
                    )?;
                }
                BlackjackParse::Stand => {
                    round.stand()?;
                }
                BlackjackParse::Quit => {
                    quitting = true;
                    round.stand()?;
                }
                BlackjackParse::Invalid(msg) => {
                    ui::write_error(err, &msg)?;
                }
            }
        }

        if round.phase() == BlackjackPhase::DealerTurn {
            loop {
                match round.dealer_step(&mut session.wallet)? {
                    DealerStep::Drew(card) => {
                        writeln!(out, "Dealer draws {}", format_card(&card))?;
                    }
                    DealerStep::Settled(_) => break,
                }
            }
        }

        if let Some(summary) = round.settlement() {
            writeln!(
                out,
                "Dealer: {} ({})",
                format_board(round.dealer_hand()),
                round.dealer_value()
            )?;
            write_settlement(out, &summary)?;
            ui::write_balance(out, session.wallet.balance())?;
            let meta = serde_json::json!({
                "player": round.player_hand(),
                "dealer": round.dealer_hand(),
                "player_value": round.player_value(),
                "dealer_value": round.dealer_value(),
            });
            session.settle(summary, meta, err)?;
        }

        if quitting {
            return Ok(TableExit::Quit);
        }
    }
}

fn roulette_table(
    session: &mut Session,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<TableExit, CliError> {
    writeln!(out, "-- Roulette --")?;
    writeln!(
        out,
        "Bets: red/black/even/odd <amount>, <pocket> <amount> | spin clear back"
    )?;
    let mut table = RouletteRound::new(Some(session.next_seed()));
    loop {
        prompt(out, "bet> ")?;
        let Some(line) = read_stdin_line(stdin) else {
            return Ok(TableExit::Quit);
        };
        match validation::parse_roulette_input(&line) {
            RouletteParse::Bet { kind, amount } => {
                if let Err(e) = table.place_bet(kind, amount, &session.wallet) {
                    ui::write_error(err, &e.to_string())?;
                    continue;
                }
                writeln!(
                    out,
                    "{} chips on {} ({} staked)",
                    amount,
                    format_bet_kind(&kind),
                    table.total_staked()
                )?;
            }
            RouletteParse::Spin => {
                let report = match table.spin(&mut session.wallet) {
                    Ok(report) => report,
                    Err(e) => {
                        ui::write_error(err, &e.to_string())?;
                        continue;
                    }
                };
                writeln!(
                    out,
                    "The ball lands on {}",
                    format_pocket(report.pocket, report.color)
                )?;
                if report.winning_bets.is_empty() {
                    writeln!(out, "No bets cover it")?;
                } else {
                    for bet in &report.winning_bets {
                        writeln!(
                            out,
                            "{} covers it: {} chips back",
                            format_bet_kind(&bet.kind),
                            bet.amount * (bet.kind.multiplier() + 1)
                        )?;
                    }
                }
                if let Some(summary) = table.summary() {
                    write_settlement(out, &summary)?;
                    ui::write_balance(out, session.wallet.balance())?;
                    let meta = serde_json::json!({
                        "pocket": report.pocket,
                        "color": report.color,
                        "bets": table.bets(),
                    });
                    session.settle(summary, meta, err)?;
                }
            }
            RouletteParse::Clear => {
                table.clear_bets();
                writeln!(out, "The felt is cleared")?;
            }
            RouletteParse::Back => return Ok(TableExit::Back),
            RouletteParse::Quit => return Ok(TableExit::Quit),
            RouletteParse::Invalid(msg) => {
                ui::write_error(err, &msg)?;
            }
        }
    }
}

fn slots_table(
    session: &mut Session,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<TableExit, CliError> {
    writeln!(out, "-- Slots --")?;
    let mut machine = SlotsMachine::new(Some(session.next_seed()));
    loop {
        prompt(out, &format!("Stake [{}] or back: ", session.default_stake))?;
        let Some(line) = read_stdin_line(stdin) else {
            return Ok(TableExit::Quit);
        };
        let stake = match validation::parse_stake(&line, session.default_stake) {
            StakeParse::Amount(n) => n,
            StakeParse::Back => return Ok(TableExit::Back),
            StakeParse::Quit => return Ok(TableExit::Quit),
            StakeParse::Invalid(msg) => {
                ui::write_error(err, &msg)?;
                continue;
            }
        };

        let result = match machine.spin(stake, &mut session.wallet) {
            Ok(result) => result,
            Err(e) => {
                ui::write_error(err, &e.to_string())?;
                continue;
            }
        };
        writeln!(out, "{}", format_reels(&result.reels))?;
        if let Some(summary) = machine.summary() {
            write_settlement(out, &summary)?;
            ui::write_balance(out, session.wallet.balance())?;
            let meta = serde_json::json!({ "reels": result.reels });
            session.settle(summary, meta, err)?;
        }
    }
}

fn poker_table(
    session: &mut Session,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<TableExit, CliError> {
    writeln!(out, "-- Poker --")?;
    loop {
        prompt(out, &format!("Buy-in [{}] or back: ", DEFAULT_BUY_IN))?;
        let Some(line) = read_stdin_line(stdin) else {
            return Ok(TableExit::Quit);
        };
        let buy_in = match validation::parse_stake(&line, DEFAULT_BUY_IN) {
            StakeParse::Amount(n) => n,
            StakeParse::Back => return Ok(TableExit::Back),
            StakeParse::Quit => return Ok(TableExit::Quit),
            StakeParse::Invalid(msg) => {
                ui::write_error(err, &msg)?;
                continue;
            }
        };

        let seed = session.next_seed();
        let mut round =
            match PokerRound::new(buy_in, &DEFAULT_OPPONENTS, Some(seed), &mut session.wallet) {
                Ok(round) => round,
                Err(e) => {
                    ui::write_error(err, &e.to_string())?;
                    continue;
                }
            };
        let mut brains = table_brains(&DEFAULT_OPPONENTS, seed);

        let hole: Vec<_> = round.seats()[USER_SEAT].hole().iter().flatten().copied().collect();
        writeln!(out, "Your hole cards: {}", format_board(&hole))?;

        let mut last_street = round.street();
        let mut quitting = false;
        while let Some(seat) = round.current_seat() {
            if round.street() != last_street {
                last_street = round.street();
                writeln!(
                    out,
                    "{:?}: {}",
                    round.street(),
                    format_board(round.community())
                )?;
            }
            if seat == USER_SEAT {
                writeln!(
                    out,
                    "Pot {} | To call {} | Your chips {}",
                    round.pot(),
                    round.to_call(USER_SEAT),
                    round.seats()[USER_SEAT].chips()
                )?;
                prompt(out, "fold, call, or raise <amount>: ")?;
                let parsed = match read_stdin_line(stdin) {
                    Some(line) => validation::parse_poker_action(&line),
                    // EOF mid-hand folds the seat so the round settles
                    None => PokerParse::Quit,
                };
                match parsed {
                    PokerParse::Action(action) => {
                        if let Err(e) = round.apply_action(USER_SEAT, action, &mut session.wallet) {
                            ui::write_error(err, &e.to_string())?;
                        }
                    }
                    PokerParse::Quit => {
                        quitting = true;
                        round.apply_action(USER_SEAT, PokerAction::Fold, &mut session.wallet)?;
                    }
                    PokerParse::Invalid(msg) => {
                        ui::write_error(err, &msg)?;
                    }
                }
            } else {
                let action = brains[seat - 1].act(&round, seat);
                let name = round.seats()[seat].name().to_string();
                round.apply_action(seat, action, &mut session.wallet)?;
                writeln!(out, "{}: {}", name, format_action(&action))?;
            }
        }

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
        if let Some(summary) = round.settlement() {
            write_settlement(out, &summary)?;
            ui::write_balance(out, session.wallet.balance())?;
            let meta = serde_json::json!({
                "community": round.community(),
                "winner": round.report().map(|r| r.winner.clone()),
                "pot": round.report().map(|r| r.pot),
            });
            session.settle(summary, meta, err)?;
        }

        if quitting {
            return Ok(TableExit::Quit);
        }
    }
}
