/// Concurrency tests over the session layer
///
/// Multiple tasks share one SessionManager; these verify isolation between
/// sessions, consistency of a single shared session, and broadcast fan-out.
use greenfelt_engine::history::Outcome;
use greenfelt_web::events::GameEvent;
use greenfelt_web::server::AppContext;
use greenfelt_web::session::SessionConfig;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

#[tokio::test]
async fn concurrent_session_creation_yields_unique_ids() {
    let context = Arc::new(AppContext::new_for_tests());

    let mut join_set = JoinSet::new();
    let session_count: usize = 10;

    for i in 0..session_count {
        let ctx = Arc::clone(&context);
        join_set.spawn(async move {
            ctx.sessions()
                .create_session(SessionConfig {
                    seed: Some(1000 + i as u64),
                    ..SessionConfig::default()
                })
                .expect("create session")
        });
    }

    let mut session_ids = Vec::new();
    while let Some(result) = join_set.join_next().await {
        session_ids.push(result.expect("task completed"));
    }

    assert_eq!(session_ids.len(), session_count);
    let unique: HashSet<_> = session_ids.iter().collect();
    assert_eq!(unique.len(), session_count);

    for session_id in &session_ids {
        assert!(context.sessions().session_view(session_id).is_ok());
    }
    assert_eq!(context.sessions().session_count(), session_count);
}

#[tokio::test]
async fn sessions_do_not_share_wallets() {
    let context = Arc::new(AppContext::new_for_tests());

    let mut session_ids = Vec::new();
    for i in 0..5u64 {
        let session_id = context
            .sessions()
            .create_session(SessionConfig {
                seed: Some(2000 + i),
                starting_chips: 1000,
                ..SessionConfig::default()
            })
            .expect("create session");
        session_ids.push(session_id);
    }

    // Spin a different number of rounds in each session concurrently
    let mut join_set = JoinSet::new();
    for (index, session_id) in session_ids.iter().cloned().enumerate() {
        let ctx = Arc::clone(&context);
        join_set.spawn(async move {
            for _ in 0..=index {
                ctx.sessions()
                    .spin_slots(&session_id, 10)
                    .expect("spin slots");
            }
        });
    }
    while let Some(result) = join_set.join_next().await {
        result.expect("task completed");
    }

    // Each wallet reflects only its own session's rounds
    for (index, session_id) in session_ids.iter().enumerate() {
        let stats = context.sessions().stats(session_id).expect("stats");
        assert_eq!(stats.total_games, index + 1);

        let history = context
            .sessions()
            .history(session_id, usize::MAX)
            .expect("history");
        assert_eq!(history.len(), index + 1);
    }
}

#[tokio::test]
async fn one_session_stays_consistent_under_parallel_spins() {
    let context = Arc::new(AppContext::new_for_tests());
    let session_id = context
        .sessions()
        .create_session(SessionConfig {
            seed: Some(7),
            starting_chips: 100_000,
            ..SessionConfig::default()
        })
        .expect("create session");

    let mut join_set = JoinSet::new();
    for _ in 0..4 {
        let ctx = Arc::clone(&context);
        let id = session_id.clone();
        join_set.spawn(async move {
            for _ in 0..25 {
                ctx.sessions().spin_slots(&id, 10).expect("spin slots");
            }
        });
    }
    while let Some(result) = join_set.join_next().await {
        result.expect("task completed");
    }

    let stats = context.sessions().stats(&session_id).expect("stats");
    assert_eq!(stats.total_games, 100);

    // The balance must equal the opening chips plus the sum of every
    // settlement, with each stake debited exactly once
    let history = context
        .sessions()
        .history(&session_id, usize::MAX)
        .expect("history");
    let expected: i64 = 100_000
        + history
            .iter()
            .map(|record| record.payout as i64 - record.stake as i64)
            .sum::<i64>();
    let balance = context
        .sessions()
        .wallet_view(&session_id)
        .expect("wallet")
        .balance;
    assert_eq!(balance as i64, expected);

    // Running totals: gross payouts on wins, stakes on losses
    let winnings: i64 = history
        .iter()
        .filter(|r| r.outcome == Outcome::Win)
        .map(|r| r.payout as i64)
        .sum();
    let losses: i64 = history
        .iter()
        .filter(|r| r.outcome == Outcome::Lose)
        .map(|r| r.stake as i64)
        .sum();
    assert_eq!(stats.net_profit, winnings - losses);
}

#[tokio::test]
async fn broadcasts_reach_every_subscriber() {
    let context = Arc::new(AppContext::new_for_tests());
    let session_id = context
        .sessions()
        .create_session(SessionConfig {
            seed: Some(11),
            ..SessionConfig::default()
        })
        .expect("create session");

    let bus = context.event_bus();
    let mut subscriptions = Vec::new();
    for _ in 0..3 {
        subscriptions.push(bus.subscribe(session_id.clone()));
    }
    assert_eq!(bus.subscriber_count(), 3);

    context
        .sessions()
        .spin_slots(&session_id, 10)
        .expect("spin slots");

    for subscription in &mut subscriptions {
        let event = tokio::time::timeout(Duration::from_secs(1), subscription.receiver.recv())
            .await
            .expect("event in time")
            .expect("channel open");
        assert!(matches!(event, GameEvent::RoundStarted { .. }));
    }

    drop(subscriptions);
    assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test]
async fn expired_cleanup_leaves_live_sessions_alone() {
    let context = Arc::new(AppContext::new_for_tests());

    for i in 0..3u64 {
        context
            .sessions()
            .create_session(SessionConfig {
                seed: Some(i),
                ..SessionConfig::default()
            })
            .expect("create session");
    }

    // Nothing is older than the TTL yet
    assert_eq!(context.sessions().cleanup_expired_sessions(), 0);
    assert_eq!(context.sessions().session_count(), 3);
}
