use greenfelt_engine::history::{
    GameKind, Outcome, RoundSummary, SessionHistory, HISTORY_CAP,
};

fn win(stake: u64, payout: u64) -> RoundSummary {
    RoundSummary {
        game: GameKind::Slots,
        stake,
        outcome: Outcome::Win,
        payout,
    }
}

fn lose(stake: u64) -> RoundSummary {
    RoundSummary {
        game: GameKind::Slots,
        stake,
        outcome: Outcome::Lose,
        payout: 0,
    }
}

fn push(stake: u64) -> RoundSummary {
    RoundSummary {
        game: GameKind::Blackjack,
        stake,
        outcome: Outcome::Push,
        payout: stake,
    }
}

#[test]
fn records_are_kept_newest_first() {
    let mut history = SessionHistory::new();
    history.record(lose(1));
    history.record(win(2, 4));
    history.record(lose(3));
    let stakes: Vec<u64> = history.iter().map(|r| r.stake).collect();
    assert_eq!(stakes, vec![3, 2, 1]);
    assert_eq!(history.recent(2).count(), 2);
    assert_eq!(history.recent(99).count(), 3);
}

#[test]
fn record_ids_are_sequential_and_zero_padded() {
    let mut history = SessionHistory::new();
    let first = history.record(lose(1));
    let second = history.record(lose(1));
    assert_eq!(first.id, "000001");
    assert_eq!(second.id, "000002");
    assert!(first.ts.is_some(), "records are stamped at insertion");
}

#[test]
fn history_is_capped_at_one_hundred_rounds() {
    let mut history = SessionHistory::new();
    for i in 0..150u64 {
        history.record(lose(i + 1));
    }
    assert_eq!(history.len(), HISTORY_CAP);
    // newest first: the latest stake leads, the earliest fifty are gone
    assert_eq!(history.iter().next().unwrap().stake, 150);
    assert_eq!(history.iter().last().unwrap().stake, 51);
}

#[test]
fn totals_survive_the_cap_but_the_window_does_not() {
    let mut history = SessionHistory::new();
    // 120 losses of 10 each, then 30 wins of 20 each
    for _ in 0..120 {
        history.record(lose(10));
    }
    for _ in 0..30 {
        history.record(win(10, 20));
    }
    let stats = history.stats();
    assert_eq!(stats.total_games, HISTORY_CAP, "window is capped");
    // 30 wins out of the retained 100
    assert!((stats.win_rate - 30.0).abs() < 1e-9);
    // running totals count all 150 rounds: 30*20 won, 120*10 lost
    assert_eq!(history.total_winnings(), 600);
    assert_eq!(history.total_losses(), 1200);
    assert_eq!(stats.net_profit, -600);
}

#[test]
fn pushes_move_neither_running_total() {
    let mut history = SessionHistory::new();
    history.record(push(50));
    assert_eq!(history.total_winnings(), 0);
    assert_eq!(history.total_losses(), 0);
    let stats = history.stats();
    assert_eq!(stats.total_games, 1);
    assert_eq!(stats.win_rate, 0.0, "a push is not a win");
    assert_eq!(stats.net_profit, 0);
}

#[test]
fn empty_history_reports_zeroed_stats() {
    let history = SessionHistory::new();
    assert!(history.is_empty());
    let stats = history.stats();
    assert_eq!(stats.total_games, 0);
    assert_eq!(stats.win_rate, 0.0);
    assert_eq!(stats.net_profit, 0);
}

#[test]
fn meta_rides_along_with_the_record() {
    let mut history = SessionHistory::new();
    let rec = history.record_with_meta(
        win(10, 1000),
        Some(serde_json::json!({ "reels": ["diamond", "diamond", "diamond"] })),
    );
    assert_eq!(rec.payout, 1000);
    let stored = history.iter().next().unwrap();
    assert_eq!(stored.meta.as_ref().unwrap()["reels"][0], "diamond");
}

#[test]
fn round_records_serialize_to_stable_json() {
    let mut history = SessionHistory::new();
    let rec = history.record(win(10, 25));
    let line = serde_json::to_string(&rec).unwrap();
    assert!(line.contains("\"game\":\"slots\""));
    assert!(line.contains("\"outcome\":\"win\""));
    // old log lines without ts/meta still parse
    let legacy: greenfelt_engine::history::RoundRecord = serde_json::from_str(
        r#"{"id":"000009","game":"roulette","stake":5,"outcome":"lose","payout":0}"#,
    )
    .unwrap();
    assert_eq!(legacy.game, GameKind::Roulette);
    assert!(legacy.ts.is_none());
    assert!(legacy.meta.is_none());
}
