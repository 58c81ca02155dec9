/// Error handling tests across the web components
///
/// Verifies structured error types, the HTTP status each one maps to,
/// and the JSON error body shape clients rely on.
use greenfelt_engine::errors::GameError;
use greenfelt_web::{
    AppContext, AppSettings, ServerConfig, ServerError, SessionConfig, SessionError, WebServer,
};
use std::net::TcpListener;
use std::time::Duration;
use warp::hyper::{self, Body, Client as HyperClient, Request};

/// Test helper to find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("bind to port")
        .local_addr()
        .expect("local addr")
        .port()
}

#[tokio::test]
async fn session_not_found_is_a_structured_error() {
    let ctx = AppContext::new_for_tests();
    let sessions = ctx.sessions();

    let result = sessions.session_view(&"nonexistent-session-id".to_string());
    match result {
        Err(SessionError::NotFound(id)) => assert_eq!(id, "nonexistent-session-id"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn insufficient_balance_surfaces_the_shortfall() {
    let ctx = AppContext::new_for_tests();
    let sessions = ctx.sessions();

    let session_id = sessions
        .create_session(SessionConfig {
            seed: Some(1),
            starting_chips: 20,
            ..SessionConfig::default()
        })
        .expect("create session");

    let result = sessions.spin_slots(&session_id, 50);
    match result {
        Err(SessionError::Game(GameError::InsufficientBalance {
            required,
            available,
        })) => {
            assert_eq!(required, 50);
            assert_eq!(available, 20);
        }
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }
}

#[tokio::test]
async fn game_errors_map_to_json_bodies_over_http() {
    let server = WebServer::new(ServerConfig::for_tests()).expect("construct server");
    let handle = server.start().await.expect("start server");
    let address = handle.address();
    let client = HyperClient::new();

    tokio::time::sleep(Duration::from_millis(20)).await;

    // Unknown session: 404 with a machine-readable code
    let missing = client
        .get(
            format!("http://{address}/api/sessions/no-such-session")
                .parse()
                .expect("parse uri"),
        )
        .await
        .expect("request missing session");
    assert_eq!(missing.status(), hyper::StatusCode::NOT_FOUND);
    let bytes = hyper::body::to_bytes(missing.into_body())
        .await
        .expect("read body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("parse json");
    assert_eq!(body["error"], "session_not_found");
    assert!(body["message"].as_str().expect("message").contains("no-such-session"));

    // Create a session, then drive it into a rules violation
    let create = Request::builder()
        .method(hyper::Method::POST)
        .uri(format!("http://{address}/api/sessions"))
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "seed": 4 }).to_string()))
        .expect("build create request");
    let created = client.request(create).await.expect("create session");
    let bytes = hyper::body::to_bytes(created.into_body())
        .await
        .expect("read body");
    let created_json: serde_json::Value = serde_json::from_slice(&bytes).expect("parse json");
    let session_id = created_json["session_id"].as_str().expect("id");

    // Hitting before any deal is a 400 with no_round_in_progress
    let hit = Request::builder()
        .method(hyper::Method::POST)
        .uri(format!(
            "http://{address}/api/sessions/{session_id}/blackjack/hit"
        ))
        .body(Body::empty())
        .expect("build hit request");
    let hit_response = client.request(hit).await.expect("issue hit");
    assert_eq!(hit_response.status(), hyper::StatusCode::BAD_REQUEST);
    let bytes = hyper::body::to_bytes(hit_response.into_body())
        .await
        .expect("read body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("parse json");
    assert_eq!(body["error"], "no_round_in_progress");

    // Spinning an empty roulette layout is a 400 with no_bets_placed
    let spin = Request::builder()
        .method(hyper::Method::POST)
        .uri(format!(
            "http://{address}/api/sessions/{session_id}/roulette/spin"
        ))
        .body(Body::empty())
        .expect("build spin request");
    let spin_response = client.request(spin).await.expect("issue spin");
    assert_eq!(spin_response.status(), hyper::StatusCode::BAD_REQUEST);
    let bytes = hyper::body::to_bytes(spin_response.into_body())
        .await
        .expect("read body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("parse json");
    assert_eq!(body["error"], "no_bets_placed");

    // A zero stake is rejected before touching the wallet
    let deal = Request::builder()
        .method(hyper::Method::POST)
        .uri(format!(
            "http://{address}/api/sessions/{session_id}/blackjack/deal"
        ))
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "stake": 0 }).to_string()))
        .expect("build deal request");
    let deal_response = client.request(deal).await.expect("issue deal");
    assert_eq!(deal_response.status(), hyper::StatusCode::BAD_REQUEST);
    let bytes = hyper::body::to_bytes(deal_response.into_body())
        .await
        .expect("read body");
    let body: serde_json::Value = serde_json::from_slice(&bytes).expect("parse json");
    assert_eq!(body["error"], "invalid_stake");

    tokio::time::timeout(Duration::from_secs(2), handle.shutdown())
        .await
        .expect("shutdown timed out")
        .expect("shutdown failed");
}

#[tokio::test]
async fn settings_invalid_value_is_rejected() {
    let ctx = AppContext::new_for_tests();
    let settings = ctx.settings();

    let invalid = AppSettings {
        default_stake: 0,
        starting_chips: 1000,
        unicode_cards: true,
    };
    let result = settings.update(invalid);
    match result {
        Err(greenfelt_web::SettingsError::InvalidValue(msg)) => {
            assert!(msg.contains("default_stake"));
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[tokio::test]
async fn static_handler_refuses_traversal_and_missing_files() {
    use greenfelt_web::{StaticError, StaticHandler};

    let temp_dir = std::env::temp_dir().join("greenfelt_static_error_test");
    std::fs::create_dir_all(&temp_dir).expect("create dir");
    let handler = StaticHandler::new(temp_dir);

    match handler.asset("nonexistent.html").await {
        Err(StaticError::NotFound) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }

    // Parent traversal never escapes the asset root
    match handler.asset("../../../etc/passwd").await {
        Err(StaticError::NotFound) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn server_bind_error_is_reported() {
    let port = get_available_port();

    // Occupy the port so startup must fail
    let _listener = TcpListener::bind(format!("127.0.0.1:{}", port)).expect("bind");

    let config = ServerConfig::new("127.0.0.1", port, std::env::temp_dir());
    let server = WebServer::new(config).expect("create server");

    match server.start().await {
        Err(ServerError::BindError(_)) => {}
        Err(e) => panic!("expected BindError, got: {:?}", e),
        Ok(_) => panic!("expected error, got success"),
    }
}

#[tokio::test]
async fn concurrent_errors_are_independent() {
    use std::sync::Arc;
    use tokio::task::JoinSet;

    let ctx = Arc::new(AppContext::new_for_tests());
    let mut tasks = JoinSet::new();

    for i in 0..10 {
        let ctx = Arc::clone(&ctx);
        tasks.spawn(async move {
            let sessions = ctx.sessions();
            let result = sessions.session_view(&format!("session-{}", i));
            matches!(result, Err(SessionError::NotFound(_)))
        });
    }

    while let Some(result) = tasks.join_next().await {
        assert!(result.expect("task completed"));
    }
}

#[test]
fn session_error_implements_std_error_trait() {
    use std::error::Error;

    let error = SessionError::NotFound("test-session".to_string());
    let _ = error.source();
    let display = format!("{}", error);
    assert!(display.contains("Session not found"));
}

#[test]
fn server_error_converts_from_io_error() {
    use std::io;

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let server_error: ServerError = io_error.into();

    match server_error {
        ServerError::BindError(_) => {}
        _ => panic!("expected BindError"),
    }
}

#[test]
fn error_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<SessionError>();
    assert_send_sync::<ServerError>();
    assert_send_sync::<greenfelt_web::SettingsError>();
    assert_send_sync::<greenfelt_web::StaticError>();
}
