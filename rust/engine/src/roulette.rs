use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::history::{GameKind, Outcome, RoundSummary};
use crate::wallet::Wallet;

/// Red pockets of a European wheel. 0 is green; every other pocket in 1-36
/// is black. Together the three sets cover the wheel exactly once.
pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PocketColor {
    Green,
    Red,
    Black,
}

pub fn pocket_color(pocket: u8) -> PocketColor {
    if pocket == 0 {
        PocketColor::Green
    } else if RED_NUMBERS.contains(&pocket) {
        PocketColor::Red
    } else {
        PocketColor::Black
    }
}

/// A bet category on the felt. Straight-up bets pay 35:1; color and parity
/// bets pay 1:1. Winning bets also get their stake back.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BetKind {
    Straight { number: u8 },
    Red,
    Black,
    Even,
    Odd,
}

impl BetKind {
    pub fn multiplier(self) -> u64 {
        match self {
            BetKind::Straight { .. } => 35,
            _ => 1,
        }
    }

    /// Whether this bet's number set contains the pocket. Even and odd
    /// exclude the zero pocket.
    pub fn covers(self, pocket: u8) -> bool {
        match self {
            BetKind::Straight { number } => pocket == number,
            BetKind::Red => pocket_color(pocket) == PocketColor::Red,
            BetKind::Black => pocket_color(pocket) == PocketColor::Black,
            BetKind::Even => pocket != 0 && pocket % 2 == 0,
            BetKind::Odd => pocket % 2 == 1,
        }
    }
}

/// A bet sitting on the felt: its category and the accumulated amount.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlacedBet {
    pub kind: BetKind,
    pub amount: u64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoulettePhase {
    Betting,
    Settled,
}

/// Everything one spin resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinReport {
    pub pocket: u8,
    pub color: PocketColor,
    pub total_staked: u64,
    pub winnings: u64,
    pub outcome: Outcome,
    pub winning_bets: Vec<PlacedBet>,
}

/// European roulette table.
///
/// Bets accumulate per category and stay on the felt across spins, the way
/// chips are left on a real layout. Each spin is one complete ledger round:
/// the total stake is debited once, the pocket drawn, and the combined
/// winnings credited once (zero when nothing covers the pocket).
#[derive(Debug)]
pub struct RouletteRound {
    rng: ChaCha20Rng,
    phase: RoulettePhase,
    bets: Vec<PlacedBet>,
    last_spin: Option<SpinReport>,
}

impl RouletteRound {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            phase: RoulettePhase::Betting,
            bets: Vec::new(),
            last_spin: None,
        }
    }

    pub fn phase(&self) -> RoulettePhase {
        self.phase
    }

    pub fn bets(&self) -> &[PlacedBet] {
        &self.bets
    }

    pub fn last_spin(&self) -> Option<&SpinReport> {
        self.last_spin.as_ref()
    }

    pub fn total_staked(&self) -> u64 {
        self.bets.iter().map(|b| b.amount).sum()
    }

    /// Places a bet, or tops up an existing bet of the same kind. Requires
    /// a connected wallet and a positive amount; the debit itself happens
    /// at spin time, once, for the whole layout.
    pub fn place_bet(
        &mut self,
        kind: BetKind,
        amount: u64,
        wallet: &dyn Wallet,
    ) -> Result<(), GameError> {
        if !wallet.is_connected() {
            return Err(GameError::NotConnected);
        }
        if amount == 0 {
            return Err(GameError::InvalidStake { stake: amount });
        }
        if let BetKind::Straight { number } = kind {
            if number > 36 {
                return Err(GameError::InvalidPocket { pocket: number });
            }
        }
        if let Some(bet) = self.bets.iter_mut().find(|b| b.kind == kind) {
            bet.amount += amount;
        } else {
            self.bets.push(PlacedBet { kind, amount });
        }
        // placing chips after a settled spin opens the next round
        self.phase = RoulettePhase::Betting;
        Ok(())
    }

    pub fn clear_bets(&mut self) {
        self.bets.clear();
        self.phase = RoulettePhase::Betting;
    }

    /// Spins the wheel. Winnings per covering bet are
    /// `amount * (multiplier + 1)`: profit at the category's odds plus the
    /// returned stake.
    pub fn spin(&mut self, wallet: &mut dyn Wallet) -> Result<SpinReport, GameError> {
        if self.bets.is_empty() {
            return Err(GameError::NoBetsPlaced);
        }
        let total = self.total_staked();
        wallet.debit(total)?;
        let pocket: u8 = self.rng.random_range(0..=36);
        let mut winnings = 0u64;
        let mut winning_bets = Vec::new();
        for bet in &self.bets {
            if bet.kind.covers(pocket) {
                winnings += bet.amount * (bet.kind.multiplier() + 1);
                winning_bets.push(*bet);
            }
        }
        wallet.credit(winnings)?;
        let outcome = if winnings > 0 {
            Outcome::Win
        } else {
            Outcome::Lose
        };
        let report = SpinReport {
            pocket,
            color: pocket_color(pocket),
            total_staked: total,
            winnings,
            outcome,
            winning_bets,
        };
        self.last_spin = Some(report.clone());
        self.phase = RoulettePhase::Settled;
        Ok(report)
    }

    /// Round summary of the most recent spin, for history recording.
    pub fn summary(&self) -> Option<RoundSummary> {
        self.last_spin.as_ref().map(|r| RoundSummary {
            game: GameKind::Roulette,
            stake: r.total_staked,
            outcome: r.outcome,
            payout: r.winnings,
        })
    }

    /// Back to the betting phase; the layout keeps its chips.
    pub fn reset(&mut self) {
        self.phase = RoulettePhase::Betting;
        self.last_spin = None;
    }
}
