use crate::settings::{SettingsError, SettingsStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub default_stake: Option<u64>,
    pub starting_chips: Option<u64>,
    pub unicode_cards: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFieldRequest {
    pub field: String,
    pub value: serde_json::Value,
}

/// Get current settings
pub async fn get_settings(store: Arc<SettingsStore>) -> Response {
    match store.get() {
        Ok(settings) => success_response(StatusCode::OK, settings),
        Err(err) => settings_error(err),
    }
}

/// Update settings
pub async fn update_settings(
    store: Arc<SettingsStore>,
    request: UpdateSettingsRequest,
) -> Response {
    let mut current = match store.get() {
        Ok(s) => s,
        Err(err) => return settings_error(err),
    };

    if let Some(stake) = request.default_stake {
        current.default_stake = stake;
    }

    if let Some(chips) = request.starting_chips {
        current.starting_chips = chips;
    }

    if let Some(unicode) = request.unicode_cards {
        current.unicode_cards = unicode;
    }

    match store.update(current) {
        Ok(settings) => success_response(StatusCode::OK, settings),
        Err(err) => settings_error(err),
    }
}

/// Update a single field
pub async fn update_field(store: Arc<SettingsStore>, request: UpdateFieldRequest) -> Response {
    match store.update_field(&request.field, request.value) {
        Ok(settings) => success_response(StatusCode::OK, settings),
        Err(err) => settings_error(err),
    }
}

/// Reset settings to defaults
pub async fn reset_settings(store: Arc<SettingsStore>) -> Response {
    match store.reset() {
        Ok(settings) => success_response(StatusCode::OK, settings),
        Err(err) => settings_error(err),
    }
}

fn success_response<T>(status: StatusCode, body: T) -> Response
where
    T: Serialize,
{
    reply::with_status(reply::json(&body), status).into_response()
}

fn settings_error(err: SettingsError) -> Response {
    use crate::errors::IntoErrorResponse;
    err.into_http_response()
}
