//! Rule-based house opponents.
//!
//! One policy drives every named opponent: hole-card strength tiers plus a
//! per-name temperament that scales how often the seat folds under pressure
//! or builds the pot. Randomness comes from a per-brain seeded RNG, so
//! tables replay exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::PokerBrain;
use greenfelt_engine::cards::{Card, Rank, Suit};
use greenfelt_engine::hand::{evaluate_hand, HandCategory};
use greenfelt_engine::poker::{PokerAction, PokerRound, Street, OPENING_BET};

/// How a seat plays the marginal spots. Extreme hands act the same under
/// every temperament; these knobs only shape the middle of the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperament {
    /// Chance scale for raising instead of calling with a strong hand.
    pub aggression: f64,
    /// Chance scale for folding a weak hand that faces a bet.
    pub caution: f64,
}

pub const TIGHT: Temperament = Temperament {
    aggression: 0.08,
    caution: 0.55,
};

pub const AGGRESSIVE: Temperament = Temperament {
    aggression: 0.30,
    caution: 0.12,
};

pub const BALANCED: Temperament = Temperament {
    aggression: 0.15,
    caution: 0.30,
};

/// The house poker policy.
///
/// Strength runs on a 0-10 scale: hole-card tiers preflop, a made-hand
/// estimate on partial boards, and a full 7-card evaluation on the river.
/// The decision layer maps strength against the cost to continue, with the
/// temperament rolling the close calls.
#[derive(Debug, Clone)]
pub struct HouseBrain {
    name: String,
    temperament: Temperament,
    rng: ChaCha20Rng,
}

impl HouseBrain {
    /// Brain for an opponent name: Alice plays tight, Bob aggressive,
    /// anyone else balanced.
    pub fn for_name(name: &str, seed: u64) -> Self {
        let temperament = match name.to_ascii_lowercase().as_str() {
            "alice" => TIGHT,
            "bob" => AGGRESSIVE,
            _ => BALANCED,
        };
        Self::with_temperament(name, temperament, seed)
    }

    pub fn with_temperament(name: &str, temperament: Temperament, seed: u64) -> Self {
        Self {
            name: name.to_string(),
            temperament,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn temperament(&self) -> Temperament {
        self.temperament
    }

    fn roll(&mut self, p: f64) -> bool {
        self.rng.random::<f64>() < p
    }

    /// Picks an action from the strength score and the table numbers.
    fn decide(&mut self, strength: u8, to_call: u64, pot: u64, chips: u64) -> PokerAction {
        if chips == 0 {
            // an empty stack just checks its hand down
            return PokerAction::Call;
        }
        if strength >= 9 {
            return self.raise_or_call(to_call, pot, chips);
        }
        if to_call == 0 {
            // never fold a free look
            if strength >= 6 && self.roll(self.temperament.aggression) {
                return self.raise_or_call(0, pot, chips);
            }
            return PokerAction::Call;
        }
        let weakness = f64::from(6u8.saturating_sub(strength)) / 6.0;
        if self.roll(self.temperament.caution * weakness) {
            return PokerAction::Fold;
        }
        if strength >= 7 && self.roll(self.temperament.aggression) {
            return self.raise_or_call(to_call, pot, chips);
        }
        PokerAction::Call
    }

    /// Raise by half the pot, floored at the opening bet and capped by what
    /// the stack can still add. A seat that cannot raise anything calls.
    fn raise_or_call(&mut self, to_call: u64, pot: u64, chips: u64) -> PokerAction {
        let bump = (pot / 2)
            .max(OPENING_BET)
            .min(chips.saturating_sub(to_call));
        if bump == 0 {
            PokerAction::Call
        } else {
            PokerAction::Raise(bump)
        }
    }
}

impl PokerBrain for HouseBrain {
    fn act(&mut self, round: &PokerRound, seat: usize) -> PokerAction {
        let view = &round.seats()[seat];
        let hole = match view.hole() {
            [Some(a), Some(b)] => [a, b],
            // no cards: check along when free, let the hand go otherwise
            _ => {
                return if round.to_call(seat) == 0 {
                    PokerAction::Call
                } else {
                    PokerAction::Fold
                };
            }
        };
        let strength = match round.street() {
            Street::Preflop => preflop_strength(hole),
            _ => board_strength(hole, round.community()),
        };
        self.decide(strength, round.to_call(seat), round.pot(), view.chips())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Hole-card strength tiers, 0-10.
///
/// Big pairs and ace-king top the scale, broadway and suited connectors
/// sit in the middle, unconnected offsuit rags at the bottom. Suitedness
/// adds one tier to any unpaired hand.
pub fn preflop_strength(hole: [Card; 2]) -> u8 {
    let a = hole[0].rank as u8;
    let b = hole[1].rank as u8;
    let (high, low) = if a > b { (a, b) } else { (b, a) };
    let suited = hole[0].suit == hole[1].suit;

    if a == b {
        return match high {
            14 | 13 => 10,
            12 | 11 => 9,
            10 => 8,
            9 => 7,
            8 => 6,
            7 => 5,
            _ => 4,
        };
    }
    let base = match (high, low) {
        (14, 13) => 8,
        (14, 12) => 7,
        (14, 11) => 6,
        (14, 10) => 5,
        (14, _) => 4,
        (13, 12) => 6,
        (13, 11) | (12, 11) => 5,
        (13, 10) | (12, 10) => 4,
        _ if high - low <= 2 && high >= 9 => 4,
        _ if high >= 11 && low >= 9 => 4,
        _ if high - low <= 2 => 3,
        _ => 2,
    };
    if suited {
        (base + 1).min(10)
    } else {
        base
    }
}

/// Postflop strength, 0-10. With the full board down this is a real 7-card
/// evaluation; on the flop and turn it is a counting estimate.
pub fn board_strength(hole: [Card; 2], community: &[Card]) -> u8 {
    if community.len() >= 5 {
        let mut cards = vec![hole[0], hole[1]];
        cards.extend_from_slice(&community[..5]);
        if let Ok(seven) = <[Card; 7]>::try_from(cards) {
            let strength = evaluate_hand(&seven);
            let base = match strength.category {
                HandCategory::HighCard => 1,
                HandCategory::OnePair => 3,
                HandCategory::TwoPair => 5,
                HandCategory::ThreeOfAKind => 6,
                HandCategory::Straight => 7,
                HandCategory::Flush => 8,
                HandCategory::FullHouse => 9,
                HandCategory::FourOfAKind | HandCategory::StraightFlush => 10,
            };
            let boost = u8::from(strength.kickers[0] >= 12);
            return (base + boost).min(10);
        }
    }
    partial_strength(hole, community)
}

/// Made-hand estimate for a 3 or 4 card board: rank and suit counts over
/// the visible cards. A pair that lives entirely on the board scores low
/// because everyone has it.
fn partial_strength(hole: [Card; 2], community: &[Card]) -> u8 {
    let mut by_rank = [0u8; 15];
    let mut by_suit = [0u8; 4];
    for c in hole.iter().chain(community.iter()) {
        by_rank[c.rank as usize] += 1;
        by_suit[suit_index(c.suit)] += 1;
    }
    let best_group = *by_rank.iter().max().unwrap_or(&0);
    let paired_ranks = by_rank.iter().filter(|&&n| n >= 2).count();
    let flush_cards = *by_suit.iter().max().unwrap_or(&0);
    let hole_pair = hole[0].rank == hole[1].rank;
    let hole_hits = community
        .iter()
        .any(|c| c.rank == hole[0].rank || c.rank == hole[1].rank);

    let mut score = match best_group {
        4 => 10,
        3 if paired_ranks >= 2 => 9,
        _ if flush_cards >= 5 => 8,
        3 => 6,
        _ if paired_ranks >= 2 => 5,
        2 if hole_pair || hole_hits => 4,
        2 => 2,
        _ if hole.iter().any(|c| c.rank == Rank::Ace) => 2,
        _ => 1,
    };
    if flush_cards == 4 {
        // four to a flush keeps the hand alive
        score = score.max(3);
    }
    score
}

fn suit_index(s: Suit) -> usize {
    match s {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}
