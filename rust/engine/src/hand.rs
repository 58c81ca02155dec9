use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Suit};

/// Poker hand categories in ascending strength order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl HandCategory {
    pub fn label(self) -> &'static str {
        match self {
            HandCategory::HighCard => "high card",
            HandCategory::OnePair => "one pair",
            HandCategory::TwoPair => "two pair",
            HandCategory::ThreeOfAKind => "three of a kind",
            HandCategory::Straight => "straight",
            HandCategory::Flush => "flush",
            HandCategory::FullHouse => "full house",
            HandCategory::FourOfAKind => "four of a kind",
            HandCategory::StraightFlush => "straight flush",
        }
    }
}

/// Evaluated strength of a hand: category plus up to five tiebreak ranks,
/// ordered high to low.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HandStrength {
    pub category: HandCategory,
    pub kickers: [u8; 5],
}

/// Evaluates the best 5-card hand out of 7 (two hole cards plus the board).
pub fn evaluate_hand(cards: &[Card; 7]) -> HandStrength {
    let mut count_by_rank = [0u8; 15]; // indices 2..=14
    let mut suit_ranks: [Vec<u8>; 4] = [vec![], vec![], vec![], vec![]];
    for &c in cards.iter() {
        let r = c.rank as u8;
        count_by_rank[r as usize] += 1;
        suit_ranks[suit_index(c.suit)].push(r);
    }

    // Seven cards can contain at most one flush suit.
    let flush_suit = (0..4).find(|&s| suit_ranks[s].len() >= 5);

    if let Some(s) = flush_suit {
        let mut ranks = suit_ranks[s].clone();
        ranks.sort_unstable();
        ranks.dedup();
        if let Some(high) = straight_high(&ranks) {
            return HandStrength {
                category: HandCategory::StraightFlush,
                kickers: [high, 0, 0, 0, 0],
            };
        }
    }

    // Rank groups sorted by count, then rank, both descending. The head of
    // this list drives every made-hand category below.
    let mut groups: Vec<(u8, u8)> = (2u8..=14)
        .filter(|&r| count_by_rank[r as usize] > 0)
        .map(|r| (count_by_rank[r as usize], r))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    if groups[0].0 == 4 {
        let quad = groups[0].1;
        let kicker = best_rank(&groups[1..]);
        return HandStrength {
            category: HandCategory::FourOfAKind,
            kickers: [quad, kicker, 0, 0, 0],
        };
    }

    if groups[0].0 == 3 && groups.len() > 1 && groups[1].0 >= 2 {
        return HandStrength {
            category: HandCategory::FullHouse,
            kickers: [groups[0].1, groups[1].1, 0, 0, 0],
        };
    }

    if let Some(s) = flush_suit {
        let mut ranks = suit_ranks[s].clone();
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        let mut kickers = [0u8; 5];
        kickers.copy_from_slice(&ranks[..5]);
        return HandStrength {
            category: HandCategory::Flush,
            kickers,
        };
    }

    let mut unique: Vec<u8> = (2u8..=14)
        .filter(|&r| count_by_rank[r as usize] > 0)
        .collect();
    unique.sort_unstable();
    if let Some(high) = straight_high(&unique) {
        return HandStrength {
            category: HandCategory::Straight,
            kickers: [high, 0, 0, 0, 0],
        };
    }

    if groups[0].0 == 3 {
        // remaining groups are all singles here
        return HandStrength {
            category: HandCategory::ThreeOfAKind,
            kickers: [
                groups[0].1,
                groups.get(1).map_or(0, |g| g.1),
                groups.get(2).map_or(0, |g| g.1),
                0,
                0,
            ],
        };
    }

    if groups[0].0 == 2 && groups.len() > 1 && groups[1].0 == 2 {
        // a third pair can still supply the kicker, so take the best
        // remaining rank regardless of its group size
        let kicker = best_rank(&groups[2..]);
        return HandStrength {
            category: HandCategory::TwoPair,
            kickers: [groups[0].1, groups[1].1, kicker, 0, 0],
        };
    }

    if groups[0].0 == 2 {
        return HandStrength {
            category: HandCategory::OnePair,
            kickers: [
                groups[0].1,
                groups.get(1).map_or(0, |g| g.1),
                groups.get(2).map_or(0, |g| g.1),
                groups.get(3).map_or(0, |g| g.1),
                0,
            ],
        };
    }

    let mut kickers = [0u8; 5];
    for (slot, group) in kickers.iter_mut().zip(groups.iter()) {
        *slot = group.1;
    }
    HandStrength {
        category: HandCategory::HighCard,
        kickers,
    }
}

/// Total order over evaluated hands: category first, kickers break ties.
pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => a.kickers.cmp(&b.kickers),
        ord => ord,
    }
}

fn suit_index(s: Suit) -> usize {
    match s {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}

fn best_rank(groups: &[(u8, u8)]) -> u8 {
    groups.iter().map(|g| g.1).max().unwrap_or(0)
}

/// Highest straight found in ascending, deduplicated ranks. The ace (14)
/// also plays low, so A-2-3-4-5 reports a high card of 5.
fn straight_high(unique_ascending: &[u8]) -> Option<u8> {
    if unique_ascending.is_empty() {
        return None;
    }
    let mut ranks = unique_ascending.to_vec();
    if ranks.last() == Some(&14) {
        ranks.insert(0, 1);
    }
    let mut best = None;
    let mut run = 1;
    for i in 1..ranks.len() {
        if ranks[i] == ranks[i - 1] + 1 {
            run += 1;
            if run >= 5 {
                best = Some(ranks[i]);
            }
        } else {
            run = 1;
        }
    }
    best
}
