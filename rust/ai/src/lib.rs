//! # greenfelt-ai: House Opponents for the Poker Table
//!
//! Decision policies for the named opponents seated at the hold'em table.
//! Each brain owns its own seeded RNG, so a whole table replays identically
//! under a fixed session seed.
//!
//! ## Core Components
//!
//! - [`PokerBrain`] - Trait a decision policy implements
//! - [`baseline`] - The rule-based house policy with per-name temperaments
//! - [`create_brain`] - Factory building a brain for an opponent name
//! - [`table_brains`] - One brain per opponent, seeds derived per seat
//!
//! ## Quick Start
//!
//! ```rust
//! use greenfelt_ai::{table_brains, PokerBrain};
//! use greenfelt_engine::poker::{PokerAction, PokerRound, DEFAULT_OPPONENTS, USER_SEAT};
//! use greenfelt_engine::wallet::ChipWallet;
//!
//! let mut wallet = ChipWallet::new(500);
//! let mut round =
//!     PokerRound::new(100, &DEFAULT_OPPONENTS, Some(42), &mut wallet).unwrap();
//! let mut brains = table_brains(&DEFAULT_OPPONENTS, 42);
//!
//! while let Some(seat) = round.current_seat() {
//!     let action = if seat == USER_SEAT {
//!         PokerAction::Call
//!     } else {
//!         brains[seat - 1].act(&round, seat)
//!     };
//!     round.apply_action(seat, action, &mut wallet).unwrap();
//! }
//! assert!(round.is_settled());
//! ```

use greenfelt_engine::poker::{PokerAction, PokerRound};

pub mod baseline;

/// A decision policy for one opponent seat.
///
/// The round machine validates whatever comes back, so a brain only has to
/// return a plausible action for the seat's current view of the table.
/// Brains carry mutable RNG state; `act` therefore takes `&mut self`.
pub trait PokerBrain: Send {
    /// Chooses the next action for `seat` given the table state.
    fn act(&mut self, round: &PokerRound, seat: usize) -> PokerAction;

    /// The opponent's display name.
    fn name(&self) -> &str;
}

/// Builds the house brain for an opponent name.
///
/// The stock roster maps "Alice" to a tight game, "Bob" to an aggressive
/// one and "Charlie" to a balanced one; any other name gets the balanced
/// temperament under its own name.
///
/// # Example
///
/// ```rust
/// use greenfelt_ai::create_brain;
///
/// let brain = create_brain("Alice", 7);
/// assert_eq!(brain.name(), "Alice");
/// ```
pub fn create_brain(name: &str, seed: u64) -> Box<dyn PokerBrain> {
    Box::new(baseline::HouseBrain::for_name(name, seed))
}

/// One brain per opponent, in seat order. Each takes a seed derived from
/// the table seed and its position so seats stay decorrelated.
pub fn table_brains(opponents: &[&str], seed: u64) -> Vec<Box<dyn PokerBrain>> {
    opponents
        .iter()
        .enumerate()
        .map(|(i, name)| create_brain(name, seed.wrapping_add(i as u64 + 1)))
        .collect()
}
