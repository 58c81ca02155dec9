/// Error handling for the casino web service.
///
/// Every domain error that crosses the HTTP boundary goes through
/// [`IntoErrorResponse`], so clients always see the same JSON shape: a
/// stable machine-readable code, a human-readable message and optional
/// structured details.
use serde::{Deserialize, Serialize};
use std::fmt;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

/// JSON body returned for every failed API request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "session_not_found")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (structured data)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }

    /// Convert to an HTTP response with the given status code.
    pub fn into_response(self, status: StatusCode) -> Response {
        reply::with_status(reply::json(&self), status).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Error classification for logging levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Client errors (4xx): bad stakes, unknown sessions, rule violations.
    Client,
    /// Server errors (5xx): unexpected, needs investigation.
    Server,
    /// Critical errors: lock poisoning and other integrity risks.
    Critical,
}

/// Converts domain errors into HTTP responses with consistent logging.
pub trait IntoErrorResponse {
    /// HTTP status code for this error.
    fn status_code(&self) -> StatusCode;

    /// Stable machine-readable error code.
    fn error_code(&self) -> &'static str;

    /// Human-readable error message.
    fn error_message(&self) -> String;

    /// Optional structured details.
    fn error_details(&self) -> Option<serde_json::Value> {
        None
    }

    /// Severity for logging; defaults from the status code class.
    fn severity(&self) -> ErrorSeverity {
        if self.status_code().is_server_error() {
            ErrorSeverity::Server
        } else {
            ErrorSeverity::Client
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        if let Some(details) = self.error_details() {
            ErrorResponse::with_details(self.error_code(), self.error_message(), details)
        } else {
            ErrorResponse::new(self.error_code(), self.error_message())
        }
    }

    /// Convert to an HTTP response, logging at the severity's level.
    fn into_http_response(self) -> Response
    where
        Self: Sized,
    {
        let status = self.status_code();
        let severity = self.severity();
        let error_response = self.to_error_response();

        match severity {
            ErrorSeverity::Client => {
                tracing::info!(
                    error = %error_response.error,
                    message = %error_response.message,
                    "client error"
                );
            }
            ErrorSeverity::Server => {
                tracing::error!(
                    error = %error_response.error,
                    message = %error_response.message,
                    "server error"
                );
            }
            ErrorSeverity::Critical => {
                tracing::error!(
                    error = %error_response.error,
                    message = %error_response.message,
                    "critical error, system integrity at risk"
                );
            }
        }

        error_response.into_response(status)
    }
}
