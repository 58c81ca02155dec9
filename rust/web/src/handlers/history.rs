use crate::errors::IntoErrorResponse;
use crate::session::{SessionId, SessionManager};
use greenfelt_engine::history::{RoundRecord, HISTORY_CAP};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

/// GET /api/sessions/:session_id/history?limit=N
/// Most recent rounds of one session, newest first.
pub fn session_history(
    sessions: Arc<SessionManager>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "sessions" / String / "history")
        .and(warp::get())
        .and(warp::query::<HistoryQuery>())
        .and(with_sessions(sessions))
        .and_then(handle_session_history)
}

/// GET /api/sessions/:session_id/stats
/// Win rate, retained round count and net profit for one session.
pub fn session_stats(
    sessions: Arc<SessionManager>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "sessions" / String / "stats")
        .and(warp::get())
        .and(with_sessions(sessions))
        .and_then(handle_session_stats)
}

fn with_sessions(
    sessions: Arc<SessionManager>,
) -> impl Filter<Extract = (Arc<SessionManager>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || Arc::clone(&sessions))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Rounds returned plus how many the session retains in total, so a client
/// can render "last N of T".
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryListResponse {
    pub records: Vec<RoundRecord>,
    pub total: usize,
}

async fn handle_session_history(
    session_id: SessionId,
    query: HistoryQuery,
    sessions: Arc<SessionManager>,
) -> Result<Response, Rejection> {
    let limit = query.limit.unwrap_or(HISTORY_CAP);
    let records = match sessions.history(&session_id, limit) {
        Ok(records) => records,
        Err(err) => return Ok(err.into_http_response()),
    };
    let total = match sessions.stats(&session_id) {
        Ok(stats) => stats.total_games,
        Err(err) => return Ok(err.into_http_response()),
    };

    Ok(reply::json(&HistoryListResponse { records, total }).into_response())
}

async fn handle_session_stats(
    session_id: SessionId,
    sessions: Arc<SessionManager>,
) -> Result<Response, Rejection> {
    match sessions.stats(&session_id) {
        Ok(stats) => Ok(reply::json(&stats).into_response()),
        Err(err) => Ok(err.into_http_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::session::SessionConfig;
    use greenfelt_engine::history::SessionStats;
    use warp::http::StatusCode;

    fn seeded_session(spins: &[u64]) -> (Arc<SessionManager>, SessionId) {
        let sessions = Arc::new(SessionManager::new(Arc::new(EventBus::new())));
        let id = sessions
            .create_session(SessionConfig {
                seed: Some(11),
                ..SessionConfig::default()
            })
            .expect("create session");
        for &stake in spins {
            sessions.spin_slots(&id, stake).expect("spin");
        }
        (sessions, id)
    }

    #[tokio::test]
    async fn history_respects_limit() {
        let (sessions, id) = seeded_session(&[1, 1, 1, 1, 1]);
        let filter = session_history(sessions);

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/api/sessions/{id}/history?limit=3"))
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: HistoryListResponse = serde_json::from_slice(response.body()).expect("parse");
        assert_eq!(body.records.len(), 3);
        assert_eq!(body.total, 5);
    }

    #[tokio::test]
    async fn history_defaults_to_everything_retained() {
        let (sessions, id) = seeded_session(&[1, 1]);
        let filter = session_history(sessions);

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/api/sessions/{id}/history"))
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: HistoryListResponse = serde_json::from_slice(response.body()).expect("parse");
        assert_eq!(body.records.len(), 2);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let (sessions, id) = seeded_session(&[1, 2, 3]);
        let filter = session_history(sessions);

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/api/sessions/{id}/history"))
            .reply(&filter)
            .await;

        let body: HistoryListResponse = serde_json::from_slice(response.body()).expect("parse");
        assert_eq!(body.records[0].stake, 3);
        assert_eq!(body.records[2].stake, 1);
    }

    #[tokio::test]
    async fn history_for_unknown_session_is_404() {
        let sessions = Arc::new(SessionManager::new(Arc::new(EventBus::new())));
        let filter = session_history(sessions);

        let response = warp::test::request()
            .method("GET")
            .path("/api/sessions/nope/history")
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stats_count_played_rounds() {
        let (sessions, id) = seeded_session(&[1, 1, 1, 1]);
        let filter = session_stats(sessions);

        let response = warp::test::request()
            .method("GET")
            .path(&format!("/api/sessions/{id}/stats"))
            .reply(&filter)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let stats: SessionStats = serde_json::from_slice(response.body()).expect("parse");
        assert_eq!(stats.total_games, 4);
        assert!((0.0..=100.0).contains(&stats.win_rate));
    }
}
