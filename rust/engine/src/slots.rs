use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::history::{GameKind, Outcome, RoundSummary};
use crate::wallet::Wallet;

/// The eight reel symbols, each equally likely on every reel.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Cherry,
    Lemon,
    Orange,
    Grape,
    Star,
    Diamond,
    Bell,
    Seven,
}

pub const ALL_SYMBOLS: [Symbol; 8] = [
    Symbol::Cherry,
    Symbol::Lemon,
    Symbol::Orange,
    Symbol::Grape,
    Symbol::Star,
    Symbol::Diamond,
    Symbol::Bell,
    Symbol::Seven,
];

impl Symbol {
    pub fn glyph(self) -> &'static str {
        match self {
            Symbol::Cherry => "\u{1F352}",
            Symbol::Lemon => "\u{1F34B}",
            Symbol::Orange => "\u{1F34A}",
            Symbol::Grape => "\u{1F347}",
            Symbol::Star => "\u{2B50}",
            Symbol::Diamond => "\u{1F48E}",
            Symbol::Bell => "\u{1F514}",
            Symbol::Seven => "7\u{FE0F}\u{20E3}",
        }
    }

    /// Paytable multiplier for a line of three of this symbol.
    pub fn triple_multiplier(self) -> u64 {
        match self {
            Symbol::Cherry => 5,
            Symbol::Lemon => 10,
            Symbol::Orange => 15,
            Symbol::Grape => 20,
            Symbol::Star => 50,
            Symbol::Diamond => 100,
            Symbol::Bell => 200,
            Symbol::Seven => 500,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Multiplier for a spun line: exact triples pay per the table, any other
/// combination pays zero.
pub fn line_multiplier(line: &[Symbol; 3]) -> u64 {
    if line[0] == line[1] && line[1] == line[2] {
        line[0].triple_multiplier()
    } else {
        0
    }
}

/// One settled spin.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    pub reels: [Symbol; 3],
    pub stake: u64,
    pub payout: u64,
    pub outcome: Outcome,
}

/// Three-reel slot machine.
///
/// A spin is a full round in one synchronous call: stake debited, reels
/// drawn uniformly, `stake * multiplier` credited back (zero off the
/// paytable). Auto-play is just the caller looping.
#[derive(Debug)]
pub struct SlotsMachine {
    rng: ChaCha20Rng,
    spin_count: u32,
    last: Option<SpinResult>,
}

impl SlotsMachine {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            spin_count: 0,
            last: None,
        }
    }

    pub fn spin_count(&self) -> u32 {
        self.spin_count
    }

    pub fn last_spin(&self) -> Option<SpinResult> {
        self.last
    }

    pub fn spin(&mut self, stake: u64, wallet: &mut dyn Wallet) -> Result<SpinResult, GameError> {
        if stake == 0 {
            return Err(GameError::InvalidStake { stake });
        }
        wallet.debit(stake)?;
        let reels = [self.draw(), self.draw(), self.draw()];
        let payout = stake * line_multiplier(&reels);
        wallet.credit(payout)?;
        let outcome = if payout > 0 {
            Outcome::Win
        } else {
            Outcome::Lose
        };
        let result = SpinResult {
            reels,
            stake,
            payout,
            outcome,
        };
        self.spin_count += 1;
        self.last = Some(result);
        Ok(result)
    }

    /// Round summary of the most recent spin, for history recording.
    pub fn summary(&self) -> Option<RoundSummary> {
        self.last.map(|r| RoundSummary {
            game: GameKind::Slots,
            stake: r.stake,
            outcome: r.outcome,
            payout: r.payout,
        })
    }

    fn draw(&mut self) -> Symbol {
        ALL_SYMBOLS[self.rng.random_range(0..ALL_SYMBOLS.len())]
    }
}
