//! # Greenfelt CLI Library
//!
//! This library provides the command-line interface for the Greenfelt casino
//! engine. It exposes subcommands for playing the tables, simulating rounds,
//! and analyzing, verifying, and exporting round logs.
//!
//! ## Main Entry Point
//!
//! The primary entry point is the [`run`] function, which parses command-line arguments
//! and executes the appropriate subcommand.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::io;
//! let args = vec!["greenfelt", "play", "--game", "slots", "--chips", "500"];
//! let code = greenfelt_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `play`: Sit down at the blackjack, roulette, slots, or poker table
//! - `sim`: Run automated rounds and generate round logs
//! - `deal`: Deal a single sample round for inspection
//! - `stats`: Aggregate statistics from JSONL round logs
//! - `verify`: Validate round-log integrity and payout rules
//! - `export`: Convert round logs to various formats (CSV, JSON)
//! - `cfg`: Display current configuration settings
//! - `doctor`: Run environment diagnostics
//! - `rng`: Verify RNG properties

use clap::{Parser, ValueEnum};
use std::io::Write;
pub mod cli;
pub mod commands;
mod config;
mod error;
pub mod exit_code;
mod macros;
pub mod formatters;
pub mod io_utils;
pub mod ui;
pub mod validation;

// Import CLI types from cli module
use cli::{Commands, GreenfeltCli};

use commands::{
    handle_cfg_command, handle_deal_command, handle_doctor_command, handle_export_command,
    handle_play_command, handle_rng_command, handle_sim_command, handle_stats_command,
    handle_verify_command,
};

pub use error::{BatchValidationError, CliError};

/// Main entry point for the CLI application.
///
/// Parses command-line arguments and dispatches to the appropriate subcommand handler.
///
/// # Arguments
///
/// * `args` - Iterator over command-line arguments (typically `std::env::args()`)
/// * `out` - Output stream for normal output (typically `stdout`)
/// * `err` - Output stream for error messages (typically `stderr`)
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors, `130` for interruptions
///
/// # Example
///
/// ```
/// use std::io;
/// let args = vec!["greenfelt", "deal", "--seed", "42"];
/// let code = greenfelt_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
///
/// # Available Commands
///
/// - `play --game G --chips N --seed S`: Play interactively, optionally logging rounds
/// - `sim --game G --rounds N --output FILE`: Simulate N rounds and save to FILE
/// - `deal --game G --seed N`: Deal one sample round of a game
/// - `stats --input PATH`: Display statistics from round log files
/// - `verify --input PATH`: Validate round-log integrity
/// - `export --input IN --format FMT --output OUT`: Convert round logs
/// - `cfg`: Display configuration settings
/// - `doctor`: Run environment diagnostics
/// - `rng --seed N`: Test RNG output
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    const COMMANDS: &[&str] = &[
        "play", "sim", "deal", "stats", "verify", "export", "cfg", "doctor", "rng",
    ];
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let parsed = GreenfeltCli::try_parse_from(&argv);
    match parsed {
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version should print to stdout and exit 0
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    // Print clap error first, then the command roster
                    write_or_exit!(err, "{}", e);
                    write_or_exit!(err, "");
                    write_or_exit!(err, "Greenfelt Casino CLI");
                    write_or_exit!(err, "Usage: greenfelt <command> [options]\n");
                    write_or_exit!(err, "Commands:");
                    for c in COMMANDS {
                        write_or_exit!(err, "  {}", c);
                    }
                    write_or_exit!(err, "\nFor full help, run: greenfelt --help");
                    exit_code::ERROR
                }
            }
        }
        Ok(cli) => match cli.cmd {
            Commands::Play {
                game,
                chips,
                stake,
                seed,
                log,
            } => {
                // Use stdin for real input (supports both TTY and piped stdin)
                let stdin = std::io::stdin();
                let mut stdin_lock = stdin.lock();
                match handle_play_command(game, chips, stake, seed, log, out, err, &mut stdin_lock)
                {
                    Ok(()) => exit_code::SUCCESS,
                    Err(e) => {
                        write_or_exit!(err, "Error: {}", e);
                        exit_code::ERROR
                    }
                }
            }
            Commands::Sim {
                game,
                rounds,
                stake,
                output,
                seed,
            } => match handle_sim_command(game, rounds, stake, output, seed, out, err) {
                Ok(()) => exit_code::SUCCESS,
                Err(CliError::Interrupted(_)) => exit_code::INTERRUPTED,
                Err(e) => {
                    write_or_exit!(err, "Error: {}", e);
                    exit_code::ERROR
                }
            },
            Commands::Deal { game, seed } => match handle_deal_command(
                game.unwrap_or(GameChoice::Blackjack),
                seed,
                out,
            ) {
                Ok(()) => exit_code::SUCCESS,
                Err(e) => {
                    write_or_exit!(err, "Error: {}", e);
                    exit_code::ERROR
                }
            },
            Commands::Stats { input } => match handle_stats_command(input, out, err) {
                Ok(()) => exit_code::SUCCESS,
                Err(e) => {
                    write_or_exit!(err, "Error: {}", e);
                    exit_code::ERROR
                }
            },
            Commands::Verify { input } => {
                let Some(path) = input else {
                    let _ = ui::write_error(err, "input required");
                    return exit_code::ERROR;
                };
                match handle_verify_command(path, out, err) {
                    Ok(()) => exit_code::SUCCESS,
                    Err(e) => {
                        write_or_exit!(err, "Error: {}", e);
                        exit_code::ERROR
                    }
                }
            }
            Commands::Export {
                input,
                format,
                output,
            } => match handle_export_command(input, output, format, out, err) {
                Ok(()) => exit_code::SUCCESS,
                Err(e) => {
                    write_or_exit!(err, "Error: {}", e);
                    exit_code::ERROR
                }
            },
            Commands::Cfg => match handle_cfg_command(out, err) {
                Ok(()) => exit_code::SUCCESS,
                Err(e) => {
                    write_or_exit!(err, "Error: {}", e);
                    exit_code::ERROR
                }
            },
            Commands::Doctor => match handle_doctor_command(out, err) {
                Ok(()) => exit_code::SUCCESS,
                Err(_) => exit_code::ERROR,
            },
            Commands::Rng { seed } => match handle_rng_command(seed, out) {
                Ok(()) => exit_code::SUCCESS,
                Err(e) => {
                    write_or_exit!(err, "Error: {}", e);
                    exit_code::ERROR
                }
            },
        },
    }
}

/// Which casino game a command targets.
///
/// Used by `play` to pick the first table and by `sim` to choose the
/// simulated game.
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum GameChoice {
    /// Blackjack against the house dealer.
    Blackjack,
    /// European single-zero roulette.
    Roulette,
    /// Three-reel slot machine.
    Slots,
    /// Texas hold'em against three house opponents.
    Poker,
}

impl GameChoice {
    /// Returns the string representation of the game choice.
    ///
    /// # Examples
    ///
    /// ```
    /// # use greenfelt_cli::GameChoice;
    /// let game = GameChoice::Blackjack;
    /// assert_eq!(game.as_str(), "blackjack");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            GameChoice::Blackjack => "blackjack",
            GameChoice::Roulette => "roulette",
            GameChoice::Slots => "slots",
            GameChoice::Poker => "poker",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cfg_command_dispatch() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        let result = handle_cfg_command(&mut out, &mut err);
        assert!(result.is_ok());

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("starting_chips"));
    }

    #[test]
    fn test_doctor_command_dispatch() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        let result = handle_doctor_command(&mut out, &mut err);
        assert!(result.is_ok());
    }

    #[test]
    fn test_rng_command_dispatch_with_seed() {
        let mut out = Vec::new();

        let result = handle_rng_command(Some(42), &mut out);
        assert!(result.is_ok());

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("RNG"));
    }

    #[test]
    fn test_rng_command_dispatch_without_seed() {
        let mut out = Vec::new();

        let result = handle_rng_command(None, &mut out);
        assert!(result.is_ok());
    }

    #[test]
    fn test_deal_command_dispatch_with_seed() {
        let mut out = Vec::new();

        let result = handle_deal_command(GameChoice::Blackjack, Some(42), &mut out);
        assert!(result.is_ok());

        let output = String::from_utf8(out).unwrap();
        assert!(!output.is_empty());
    }

    #[test]
    fn test_deal_command_dispatch_without_seed() {
        let mut out = Vec::new();

        let result = handle_deal_command(GameChoice::Blackjack, None, &mut out);
        assert!(result.is_ok());
    }

    #[test]
    fn test_stats_command_dispatch_integration() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        // Use a non-existent file to test error handling path
        let result = handle_stats_command("nonexistent.jsonl".to_string(), &mut out, &mut err);

        assert!(result.is_err());
    }

    #[test]
    fn test_export_command_dispatch_integration() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        // Use a non-existent input file to test error handling
        let result = handle_export_command(
            "nonexistent.jsonl".to_string(),
            "output.csv".to_string(),
            "csv".to_string(),
            &mut out,
            &mut err,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_play_command_dispatch_via_handler() {
        use std::io::Cursor;

        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut stdin = Cursor::new(b"q\n".to_vec());

        let result = handle_play_command(
            None,
            Some(200),
            None,
            Some(42),
            None,
            &mut out,
            &mut err,
            &mut stdin,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn test_cli_module_exists_and_exports_greenfelt_cli() {
        use crate::cli::GreenfeltCli;

        let result = GreenfeltCli::try_parse_from(["greenfelt", "cfg"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_cli_module_exports_commands_enum() {
        use crate::cli::Commands;

        let cli = crate::cli::GreenfeltCli::try_parse_from(["greenfelt", "doctor"]).unwrap();

        match cli.cmd {
            Commands::Doctor => {}
            _ => panic!("Expected Commands::Doctor variant"),
        }
    }

    #[test]
    fn test_game_choice_covers_all_tables() {
        let names: Vec<&str> = [
            GameChoice::Blackjack,
            GameChoice::Roulette,
            GameChoice::Slots,
            GameChoice::Poker,
        ]
        .iter()
        .map(|g| g.as_str())
        .collect();
        assert_eq!(names, vec!["blackjack", "roulette", "slots", "poker"]);
    }
}
