//! Random number generator verification command.
//!
//! The `rng` command verifies the properties of the ChaCha20 random number
//! generator that shuffles the shoe, spins the wheel, and rolls the reels.
//! It prints a raw sample, the first cards of a seeded shuffle, and a wheel
//! color tally for eyeballing uniformity.
//!
//! ## Purpose
//!
//! This command is primarily used for:
//! - Verifying RNG determinism (same seed produces same sequence)
//! - Debugging random number generation issues
//! - Validating RNG distribution properties

use crate::error::CliError;
use crate::formatters::format_board;
use greenfelt_engine::deck::Deck;
use greenfelt_engine::roulette::{PocketColor, pocket_color};
use rand::{Rng, RngCore, SeedableRng};
use std::io::Write;

/// Cards shown from the front of the seeded shuffle.
const CARD_SAMPLE: usize = 10;
/// Wheel draws for the color tally; ten expected hits per pocket.
const WHEEL_SAMPLE: u32 = 370;

/// Handle the rng command - verify random number generator properties.
///
/// Prints a raw `u64` sample, the first [`CARD_SAMPLE`] cards of a shuffle,
/// and a [`WHEEL_SAMPLE`]-spin color tally, all from the ChaCha20 RNG with
/// the specified seed (or a random seed if not provided).
///
/// # Arguments
///
/// * `seed` - Optional seed value for the RNG (uses random seed if None)
/// * `out` - Output stream for RNG sample values
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(CliError)` on write failure
///
/// # Example
///
/// ```ignore
/// # use greenfelt_cli::commands::handle_rng_command;
/// # use std::io;
/// let mut out = io::stdout();
/// handle_rng_command(Some(12345), &mut out).expect("RNG command failed");
/// ```
pub fn handle_rng_command(seed: Option<u64>, out: &mut dyn Write) -> Result<(), CliError> {
    let s = seed.unwrap_or_else(rand::random);
    let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(s);
    let mut vals = vec![];
    for _ in 0..5 {
        vals.push(rng.next_u64());
    }
    writeln!(out, "RNG sample: {:?}", vals)?;

    let mut deck = Deck::new_with_seed(s);
    deck.shuffle();
    let cards: Vec<_> = std::iter::from_fn(|| deck.deal_card())
        .take(CARD_SAMPLE)
        .collect();
    writeln!(out, "First {} cards: {}", CARD_SAMPLE, format_board(&cards))?;

    let mut reds = 0u32;
    let mut blacks = 0u32;
    let mut greens = 0u32;
    for _ in 0..WHEEL_SAMPLE {
        let pocket: u8 = rng.random_range(0..=36);
        match pocket_color(pocket) {
            PocketColor::Red => reds += 1,
            PocketColor::Black => blacks += 1,
            PocketColor::Green => greens += 1,
        }
    }
    writeln!(
        out,
        "Wheel sample ({} spins): red {}, black {}, green {}",
        WHEEL_SAMPLE, reds, blacks, greens
    )?;
    Ok(())
}
