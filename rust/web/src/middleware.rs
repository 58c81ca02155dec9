use crate::metrics::MetricsCollector;
use std::time::Instant;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::reply::{Reply, Response};
use warp::Filter;

/// Wraps a route tree with request logging and metrics collection.
///
/// Every request is logged on the way in, timed, logged with its status
/// on the way out, and recorded in the shared [`MetricsCollector`].
pub fn with_request_metrics<F, T>(
    filter: F,
    metrics: MetricsCollector,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone
where
    F: Filter<Extract = (T,), Error = Rejection> + Clone + Send + Sync + 'static,
    T: Reply,
{
    warp::any()
        .and(warp::path::full())
        .and(warp::method())
        .map(|path: warp::path::FullPath, method: warp::http::Method| {
            tracing::info!(
                path = %path.as_str(),
                method = %method,
                "incoming request"
            );
            (Instant::now(), path.as_str().to_string(), method.to_string())
        })
        .and(filter)
        .map(
            move |(start, path, method): (Instant, String, String), reply: T| {
                let response = reply.into_response();
                let status = response.status();
                let duration_ms = start.elapsed().as_millis();
                log_response(status, &path, &method, duration_ms);
                if status.is_success() {
                    metrics.record_request_success(duration_ms as u64);
                } else {
                    metrics.record_request_failure(duration_ms as u64);
                }
                response
            },
        )
}

/// Log a finished response at a level matching its status class.
pub fn log_response(status: StatusCode, path: &str, method: &str, duration_ms: u128) {
    if status.is_client_error() {
        tracing::warn!(
            status = %status.as_u16(),
            path = %path,
            method = %method,
            duration_ms = duration_ms,
            "client error"
        );
    } else if status.is_server_error() {
        tracing::error!(
            status = %status.as_u16(),
            path = %path,
            method = %method,
            duration_ms = duration_ms,
            "server error"
        );
    } else {
        tracing::info!(
            status = %status.as_u16(),
            path = %path,
            method = %method,
            duration_ms = duration_ms,
            "response sent"
        );
    }
}
