use std::collections::VecDeque;
use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Which casino game a round belongs to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Blackjack,
    Roulette,
    Slots,
    Poker,
}

impl GameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::Blackjack => "blackjack",
            GameKind::Roulette => "roulette",
            GameKind::Slots => "slots",
            GameKind::Poker => "poker",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a settled round.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
    Push,
}

/// Produced by every round settlement; the single source for history
/// entries, round logs, and event payloads.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub game: GameKind,
    /// Chips debited when the round started.
    pub stake: u64,
    pub outcome: Outcome,
    /// Chips credited at resolution (0 on loss, stake on push).
    pub payout: u64,
}

/// One retained history entry. Also the JSONL round-log line format:
/// `ts` and `meta` are optional so old logs without them still parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub id: String,
    pub game: GameKind,
    pub stake: u64,
    pub outcome: Outcome,
    pub payout: u64,
    /// Timestamp when the round settled (RFC3339).
    #[serde(default)]
    pub ts: Option<String>,
    /// Extra game detail (reels, pocket, hands) as free-form JSON.
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

/// Session statistics derived from the history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Percentage of retained rounds that were wins.
    pub win_rate: f64,
    /// Number of retained rounds.
    pub total_games: usize,
    /// Running winnings minus running losses, across the whole session.
    pub net_profit: i64,
}

/// Most recent rounds are retained; older entries fall off the end.
pub const HISTORY_CAP: usize = 100;

/// In-memory, session-scoped round history.
///
/// Holds the newest [`HISTORY_CAP`] records (newest first) plus running
/// win/loss totals that outlive the cap. Never persisted or restored.
#[derive(Debug, Default)]
pub struct SessionHistory {
    rounds: VecDeque<RoundRecord>,
    total_winnings: u64,
    total_losses: u64,
    next_seq: u64,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a settled round, assigning an id and timestamp. Returns the
    /// stored record so callers can log or broadcast it.
    pub fn record(&mut self, summary: RoundSummary) -> RoundRecord {
        self.record_with_meta(summary, None)
    }

    pub fn record_with_meta(
        &mut self,
        summary: RoundSummary,
        meta: Option<serde_json::Value>,
    ) -> RoundRecord {
        self.next_seq += 1;
        let rec = RoundRecord {
            id: format!("{:06}", self.next_seq),
            game: summary.game,
            stake: summary.stake,
            outcome: summary.outcome,
            payout: summary.payout,
            ts: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            meta,
        };
        match summary.outcome {
            Outcome::Win => self.total_winnings += summary.payout,
            Outcome::Lose => self.total_losses += summary.stake,
            Outcome::Push => {}
        }
        self.rounds.push_front(rec.clone());
        self.rounds.truncate(HISTORY_CAP);
        rec
    }

    /// Newest-first iterator over at most `n` retained records.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &RoundRecord> {
        self.rounds.iter().take(n)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoundRecord> {
        self.rounds.iter()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn total_winnings(&self) -> u64 {
        self.total_winnings
    }

    pub fn total_losses(&self) -> u64 {
        self.total_losses
    }

    /// Win rate and game count cover the retained window; net profit uses
    /// the running totals so it survives the cap.
    pub fn stats(&self) -> SessionStats {
        let total_games = self.rounds.len();
        let wins = self
            .rounds
            .iter()
            .filter(|r| r.outcome == Outcome::Win)
            .count();
        let win_rate = if total_games > 0 {
            wins as f64 / total_games as f64 * 100.0
        } else {
            0.0
        };
        SessionStats {
            win_rate,
            total_games,
            net_profit: self.total_winnings as i64 - self.total_losses as i64,
        }
    }
}
