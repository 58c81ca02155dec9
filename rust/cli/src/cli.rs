//! Command-line argument definitions for the greenfelt CLI.
//!
//! This module defines the clap parser types: the top-level [`GreenfeltCli`]
//! struct and the [`Commands`] enum with one variant per subcommand. Argument
//! validation that clap can express (value ranges, value enums) lives here;
//! everything else is validated in the command handlers.

use clap::{Parser, Subcommand};

use crate::GameChoice;

/// Top-level CLI parser for the greenfelt casino.
#[derive(Debug, Parser)]
#[command(
    name = "greenfelt",
    version,
    about = "Casino table games in the terminal"
)]
pub struct GreenfeltCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

/// All greenfelt subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Play casino games interactively
    Play {
        /// Table to sit down at first (lobby prompt when omitted)
        #[arg(long, value_enum)]
        game: Option<GameChoice>,

        /// Starting chip balance (config default when omitted)
        #[arg(long)]
        chips: Option<u64>,

        /// Default stake offered at stake prompts
        #[arg(long)]
        stake: Option<u64>,

        /// RNG seed for reproducible rounds
        #[arg(long)]
        seed: Option<u64>,

        /// Append settled rounds to this JSONL file
        #[arg(long)]
        log: Option<String>,
    },

    /// Run automated rounds and write a JSONL round log
    Sim {
        /// Game to simulate
        #[arg(long, value_enum)]
        game: GameChoice,

        /// Number of rounds to simulate
        #[arg(long, default_value_t = 100)]
        rounds: u64,

        /// Stake per round
        #[arg(long)]
        stake: Option<u64>,

        /// Path to save the round log (JSONL format)
        #[arg(long)]
        output: Option<String>,

        /// Base RNG seed (each round perturbs it)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Deal one sample round for inspection
    Deal {
        /// Table to deal at (blackjack when omitted)
        #[arg(long, value_enum)]
        game: Option<GameChoice>,

        /// RNG seed for a reproducible deal
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Aggregate statistics from JSONL round logs
    Stats {
        /// Path to a JSONL file or a directory of round logs
        #[arg(long)]
        input: String,
    },

    /// Validate round-log integrity and payout rules
    Verify {
        /// Path to the JSONL file to verify
        #[arg(long)]
        input: Option<String>,
    },

    /// Convert round logs to other formats
    Export {
        /// Path to input JSONL file
        #[arg(long)]
        input: String,

        /// Output format: csv or json
        #[arg(long)]
        format: String,

        /// Path to output file
        #[arg(long)]
        output: String,
    },

    /// Display current configuration settings
    Cfg,

    /// Run environment diagnostics
    Doctor,

    /// Sample the seeded RNG for determinism checks
    Rng {
        /// RNG seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
    },
}
