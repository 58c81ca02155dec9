use crate::errors::IntoErrorResponse;
use crate::events::{EventSubscription, GameEvent};
use crate::session::{SessionId, SessionManager};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use warp::http;
use warp::reply::{self, Response};
use warp::sse;
use warp::Reply;

/// GET /api/sessions/:session_id/events
///
/// Streams the session's game events as server-sent events until the client
/// disconnects. Every event arrives as `event: game_event` with a JSON body
/// tagged by `type`.
pub async fn stream_events(session_id: SessionId, sessions: Arc<SessionManager>) -> Response {
    if let Err(err) = sessions.checked_session(&session_id) {
        return err.into_http_response();
    }

    let subscription = sessions.event_bus().subscribe(session_id);
    let stream = subscription_stream(subscription);
    let keep_alive = sse::keep_alive()
        .interval(Duration::from_secs(15))
        .text(":keep-alive\n");

    let reply = sse::reply(keep_alive.stream(stream));
    reply::with_header(reply, http::header::CACHE_CONTROL, "no-cache").into_response()
}

fn subscription_stream(
    subscription: EventSubscription,
) -> impl tokio_stream::Stream<Item = Result<sse::Event, Infallible>> {
    // The subscription unsubscribes from the bus on drop, so the map
    // closure keeps it alive for as long as the client stays connected.
    let mut subscription = subscription;
    let (_tx, placeholder_rx) = mpsc::channel(1);
    let receiver = std::mem::replace(&mut subscription.receiver, placeholder_rx);
    let subscription = Arc::new(subscription);

    ReceiverStream::new(receiver).map(move |event| {
        let _keep_alive = Arc::clone(&subscription);
        Ok(render_event(event))
    })
}

fn render_event(event: GameEvent) -> sse::Event {
    match serde_json::to_string(&event) {
        Ok(json) => sse::Event::default().event("game_event").data(json),
        Err(err) => {
            let fallback = serde_json::json!({
                "type": "error",
                "message": format!("failed to serialize game event: {err}")
            })
            .to_string();
            sse::Event::default().event("game_event").data(fallback)
        }
    }
}
