use crate::session::{SessionConfig, SessionError, SessionId, SessionManager};
use crate::settings::{AppSettings, SettingsStore};
use greenfelt_engine::poker::PokerAction;
use greenfelt_engine::roulette::BetKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::{self, StatusCode};
use warp::reply::{self, Response};
use warp::Reply;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub seed: Option<u64>,
    pub starting_chips: Option<u64>,
    pub opponents: Option<Vec<String>>,
}

impl CreateSessionRequest {
    fn into_config(self, defaults: &AppSettings) -> SessionConfig {
        let mut config = SessionConfig {
            starting_chips: defaults.starting_chips,
            ..SessionConfig::default()
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(chips) = self.starting_chips {
            config.starting_chips = chips;
        }
        if let Some(opponents) = self.opponents {
            config.opponents = opponents;
        }
        config
    }
}

/// Stake for a blackjack deal or a slots spin.
#[derive(Debug, Deserialize)]
pub struct StakeRequest {
    pub stake: u64,
}

/// A roulette bet: `{"kind": "red", "amount": 10}` or
/// `{"kind": "straight", "number": 17, "amount": 5}`.
#[derive(Debug, Deserialize)]
pub struct BetRequest {
    pub kind: String,
    pub number: Option<u8>,
    pub amount: u64,
}

impl BetRequest {
    fn bet_kind(&self) -> Result<BetKind, SessionError> {
        match self.kind.as_str() {
            "straight" => {
                let number = self.number.ok_or_else(|| {
                    SessionError::InvalidRequest("straight bets require a number".to_string())
                })?;
                Ok(BetKind::Straight { number })
            }
            "red" => Ok(BetKind::Red),
            "black" => Ok(BetKind::Black),
            "even" => Ok(BetKind::Even),
            "odd" => Ok(BetKind::Odd),
            other => Err(SessionError::InvalidRequest(format!(
                "unknown bet kind `{other}`"
            ))),
        }
    }
}

/// Chips to bring to the poker table.
#[derive(Debug, Deserialize)]
pub struct BuyInRequest {
    pub buy_in: u64,
}

/// A poker action: `{"action": "fold"}`, `{"action": "call"}` (`"check"`
/// is accepted as an alias) or `{"action": "raise", "amount": 20}`.
#[derive(Debug, Deserialize)]
pub struct PokerActionRequest {
    pub action: String,
    pub amount: Option<u64>,
}

impl PokerActionRequest {
    fn poker_action(&self) -> Result<PokerAction, SessionError> {
        match self.action.as_str() {
            "fold" => Ok(PokerAction::Fold),
            "call" | "check" => Ok(PokerAction::Call),
            "raise" | "bet" => {
                let amount = self.amount.ok_or_else(|| {
                    SessionError::InvalidRequest("raises require an amount".to_string())
                })?;
                Ok(PokerAction::Raise(amount))
            }
            other => Err(SessionError::InvalidRequest(format!(
                "unknown poker action `{other}`"
            ))),
        }
    }
}

/// Creates a new casino session.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/sessions`
///
/// # Purpose
/// Opens a fresh session with its own wallet, game machines and round
/// history, registers it with the session manager and broadcasts a
/// `session_created` event.
///
/// # Request Format
/// JSON body with optional fields:
/// ```json
/// {
///   "seed": 42,
///   "starting_chips": 500,
///   "opponents": ["Dana", "Eve"]
/// }
/// ```
/// Omitted fields fall back to the stored application settings (chips) or
/// built-in defaults (random seed, house opponent roster).
///
/// # Response Format
/// - **Success (201 Created)**: Full session view including the generated
///   session id, wallet balance and the state of every game
/// - **Error (400 Bad Request)**: Rejected configuration (zero chips, empty
///   opponent roster, more than eight opponents)
///
/// # Error Cases
/// - `invalid_request`: The supplied configuration failed validation
///
/// # Arguments
/// * `sessions` - Shared reference to the session manager
/// * `settings` - Shared settings store supplying defaults
/// * `request` - Parsed JSON request body
///
/// # Returns
/// HTTP response with status 201 and the session view on success, or an
/// error response on failure
pub async fn create_session(
    sessions: Arc<SessionManager>,
    settings: Arc<SettingsStore>,
    request: CreateSessionRequest,
) -> Response {
    let defaults = settings.get().unwrap_or_default();
    let config = request.into_config(&defaults);
    let session_id = match sessions.create_session(config) {
        Ok(id) => id,
        Err(err) => return session_error(err),
    };
    match sessions.session_view(&session_id) {
        Ok(view) => success_response(StatusCode::CREATED, view),
        Err(err) => session_error(err),
    }
}

/// Returns the full view of an existing session: wallet, all four game
/// machines and the session statistics.
pub async fn get_session(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.session_view(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Deletes an existing session and notifies its event subscribers.
///
/// # HTTP Method and Path
/// - **Method**: DELETE
/// - **Path**: `/api/sessions/{session_id}`
///
/// # Purpose
/// Ends a session on request, removes it from the session manager's storage
/// and broadcasts a final `session_expired` event so any open event streams
/// know the table closed.
///
/// # Request Format
/// No request body. Session ID is provided as a URL path parameter.
///
/// # Response Format
/// - **Success (204 No Content)**: Empty response body
/// - **Error (404 Not Found)**: Session does not exist
///
/// # Error Cases
/// - `session_not_found`: No session with the given ID exists
///
/// # Arguments
/// * `sessions` - Shared reference to the session manager
/// * `session_id` - Unique identifier for the session to delete
///
/// # Returns
/// HTTP response with status 204 on success, or error response on failure
pub async fn delete_session(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.delete_session(&session_id) {
        Ok(()) => empty_response(StatusCode::NO_CONTENT),
        Err(err) => session_error(err),
    }
}

/// Returns the wallet balance and connection state.
pub async fn get_wallet(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.wallet_view(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Connects the session wallet so stakes can be placed.
pub async fn connect_wallet(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.connect_wallet(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Disconnects the session wallet; every stake is refused until the wallet
/// reconnects.
pub async fn disconnect_wallet(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.disconnect_wallet(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Returns the current blackjack table state.
pub async fn get_blackjack(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.blackjack_view(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Starts a blackjack round.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/sessions/{session_id}/blackjack/deal`
///
/// # Purpose
/// Debits the stake, deals two cards to the player and two to the dealer
/// (hole card hidden) and broadcasts the deal on the event stream. A
/// finished round on the table is cleared automatically first.
///
/// # Request Format
/// ```json
/// { "stake": 10 }
/// ```
///
/// # Response Format
/// - **Success (200 OK)**: Blackjack view; `dealer_value` stays `null` and
///   only the upcard is listed while the round is in the player's hands. A
///   dealt natural settles immediately and the view carries the settlement.
/// - **Error (400 Bad Request)**: Zero stake, or a round already running
/// - **Error (402 Payment Required)**: Wallet disconnected or balance short
///
/// # Error Cases
/// - `invalid_stake`: Stake was zero
/// - `round_in_progress`: The previous round has not finished
/// - `wallet_not_connected`: Wallet is disconnected
/// - `insufficient_balance`: Stake exceeds the wallet balance
///
/// # Arguments
/// * `sessions` - Shared reference to the session manager
/// * `session_id` - Session whose table to deal on
/// * `request` - Parsed JSON request body carrying the stake
///
/// # Returns
/// HTTP response with status 200 and the blackjack view on success, or an
/// error response on failure
pub async fn blackjack_deal(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    request: StakeRequest,
) -> Response {
    match sessions.blackjack_deal(&session_id, request.stake) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Draws one more player card; a bust settles the round on the spot.
pub async fn blackjack_hit(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.blackjack_hit(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Ends the player's turn and plays the dealer out to settlement.
pub async fn blackjack_stand(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.blackjack_stand(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Clears a finished blackjack round back to the idle table.
pub async fn blackjack_reset(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.blackjack_reset(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Returns the current roulette table state, bets on the felt included.
pub async fn get_roulette(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.roulette_view(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Places a roulette bet on the felt.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/sessions/{session_id}/roulette/bets`
///
/// # Purpose
/// Adds chips to a bet category. Bets on the same category merge, stay on
/// the felt across spins and are only debited when the wheel spins.
///
/// # Request Format
/// ```json
/// { "kind": "red", "amount": 10 }
/// ```
/// ```json
/// { "kind": "straight", "number": 17, "amount": 5 }
/// ```
/// Kinds: `straight` (requires `number` 0-36), `red`, `black`, `even`,
/// `odd`.
///
/// # Response Format
/// - **Success (200 OK)**: Roulette view with the updated felt
/// - **Error (400 Bad Request)**: Unknown kind, zero amount, a straight
///   bet without a number or with a pocket above 36
/// - **Error (402 Payment Required)**: Wallet disconnected, or the felt
///   total would exceed the balance
///
/// # Error Cases
/// - `invalid_request`: Unknown kind, or a straight bet without a number
/// - `invalid_stake`: Bet amount was zero
/// - `invalid_pocket`: Straight-up number outside 0-36
/// - `wallet_not_connected`: Wallet is disconnected
/// - `insufficient_balance`: Felt total would exceed the wallet balance
///
/// # Arguments
/// * `sessions` - Shared reference to the session manager
/// * `session_id` - Session whose felt to place on
/// * `request` - Parsed JSON request body carrying kind and amount
///
/// # Returns
/// HTTP response with status 200 and the roulette view on success, or an
/// error response on failure
pub async fn place_roulette_bet(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    request: BetRequest,
) -> Response {
    let kind = match request.bet_kind() {
        Ok(kind) => kind,
        Err(err) => return session_error(err),
    };
    match sessions.place_roulette_bet(&session_id, kind, request.amount) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Takes every bet off the felt without spinning.
pub async fn clear_roulette_bets(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
) -> Response {
    match sessions.clear_roulette_bets(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Spins the wheel: debits the felt total, draws the pocket, credits the
/// combined winnings and returns the spin report.
pub async fn spin_roulette(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.spin_roulette(&session_id) {
        Ok(report) => success_response(StatusCode::OK, report),
        Err(err) => session_error(err),
    }
}

/// Clears the settled spin and leaves the bets on the felt for the next one.
pub async fn reset_roulette(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.reset_roulette(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Returns the slots machine state and its last spin.
pub async fn get_slots(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.slots_view(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Spins the slot machine once for the given stake and returns the reels
/// and payout.
pub async fn spin_slots(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    request: StakeRequest,
) -> Response {
    match sessions.spin_slots(&session_id, request.stake) {
        Ok(result) => success_response(StatusCode::OK, result),
        Err(err) => session_error(err),
    }
}

/// Returns the poker table state. Fails with `no_round_in_progress` until
/// the session has joined a table.
pub async fn get_poker(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.poker_view(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Sits the player down at a poker table and deals the first hand.
///
/// The buy-in is debited from the wallet and becomes the player's chip
/// stack. House opponents act immediately, so the returned view is already
/// at the player's first decision (or at settlement if everyone folded).
pub async fn join_poker(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    request: BuyInRequest,
) -> Response {
    match sessions.join_poker(&session_id, request.buy_in) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Applies the player's poker action and advances the hand.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/sessions/{session_id}/poker/action`
///
/// # Purpose
/// Applies one user decision, then lets the house opponents act until it is
/// the user's turn again or the hand settles. Every action and street
/// advance is broadcast on the event stream.
///
/// # Request Format
/// ```json
/// { "action": "fold" }
/// ```
/// ```json
/// { "action": "call" }
/// ```
/// ```json
/// { "action": "raise", "amount": 20 }
/// ```
/// `check` is an alias for `call` (calling nothing owed checks) and `bet`
/// for `raise`. A raise amount is the new street bet level, not the
/// increment.
///
/// # Response Format
/// - **Success (200 OK)**: Poker view after all automatic play; carries the
///   showdown report once the hand settles
/// - **Error (400 Bad Request)**: Unknown action, no hand running, acting
///   out of turn, acting after folding, or an illegal raise
/// - **Error (402 Payment Required)**: Raise exceeds the seat's chips
///
/// # Error Cases
/// - `invalid_request`: Unknown action, or a raise without an amount
/// - `no_round_in_progress`: No hand is running
/// - `not_your_turn`: Another seat is due to act
/// - `already_folded`: The player already folded this hand
/// - `invalid_stake`: Raise at or below the current bet level
/// - `insufficient_balance`: Raise exceeds the seat's remaining chips
///
/// # Arguments
/// * `sessions` - Shared reference to the session manager
/// * `session_id` - Session whose hand to act in
/// * `request` - Parsed JSON request body carrying the action
///
/// # Returns
/// HTTP response with status 200 and the poker view on success, or an
/// error response on failure
pub async fn poker_action(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    request: PokerActionRequest,
) -> Response {
    let action = match request.poker_action() {
        Ok(action) => action,
        Err(err) => return session_error(err),
    };
    match sessions.poker_action(&session_id, action) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

fn success_response<T>(status: StatusCode, body: T) -> Response
where
    T: Serialize,
{
    reply::with_status(reply::json(&body), status).into_response()
}

fn empty_response(status: StatusCode) -> Response {
    http::Response::builder()
        .status(status)
        .body(warp::hyper::Body::empty())
        .expect("build empty response")
}

fn session_error(err: SessionError) -> Response {
    use crate::errors::IntoErrorResponse;
    err.into_http_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use serde_json::{json, Value};

    fn manager() -> Arc<SessionManager> {
        Arc::new(SessionManager::new(Arc::new(EventBus::new())))
    }

    fn store() -> Arc<SettingsStore> {
        Arc::new(SettingsStore::new())
    }

    async fn body_json(response: Response) -> Value {
        let bytes = warp::hyper::body::to_bytes(response.into_body())
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("parse body")
    }

    #[tokio::test]
    async fn create_session_returns_full_view() {
        let request = CreateSessionRequest {
            seed: Some(42),
            starting_chips: Some(500),
            opponents: None,
        };
        let response = create_session(manager(), store(), request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert!(body["session_id"].as_str().is_some_and(|id| !id.is_empty()));
        assert_eq!(body["balance"], 500);
        assert_eq!(body["connected"], true);
        assert_eq!(body["blackjack"]["phase"], "betting");
    }

    #[tokio::test]
    async fn create_session_rejects_zero_chips() {
        let request = CreateSessionRequest {
            seed: None,
            starting_chips: Some(0),
            opponents: None,
        };
        let response = create_session(manager(), store(), request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_request");
    }

    #[tokio::test]
    async fn create_session_falls_back_to_stored_settings() {
        let store = Arc::new(
            SettingsStore::with_settings(AppSettings {
                starting_chips: 2000,
                ..AppSettings::default()
            })
            .expect("valid settings"),
        );
        let request = CreateSessionRequest {
            seed: None,
            starting_chips: None,
            opponents: None,
        };
        let response = create_session(manager(), store, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["balance"], 2000);
    }

    #[tokio::test]
    async fn unknown_session_returns_not_found() {
        let response = get_session(manager(), "missing".to_string()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "session_not_found");
    }

    #[tokio::test]
    async fn stand_without_deal_is_rejected() {
        let sessions = manager();
        let id = sessions
            .create_session(SessionConfig::default())
            .expect("create");

        let response = blackjack_stand(Arc::clone(&sessions), id).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "no_round_in_progress");
    }

    #[tokio::test]
    async fn deal_returns_player_cards() {
        let sessions = manager();
        let id = sessions
            .create_session(SessionConfig {
                seed: Some(7),
                ..SessionConfig::default()
            })
            .expect("create");

        let response = blackjack_deal(
            Arc::clone(&sessions),
            id,
            StakeRequest { stake: 10 },
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["stake"], 10);
        assert_eq!(body["player_hand"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn roulette_bet_then_spin() {
        let sessions = manager();
        let id = sessions
            .create_session(SessionConfig {
                seed: Some(3),
                ..SessionConfig::default()
            })
            .expect("create");

        let request = BetRequest {
            kind: "red".to_string(),
            number: None,
            amount: 10,
        };
        let response = place_roulette_bet(Arc::clone(&sessions), id.clone(), request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_staked"], 10);

        let response = spin_roulette(Arc::clone(&sessions), id).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["pocket"].as_u64().is_some_and(|p| p <= 36));
    }

    #[tokio::test]
    async fn disconnected_wallet_blocks_slots() {
        let sessions = manager();
        let id = sessions
            .create_session(SessionConfig::default())
            .expect("create");

        let response = disconnect_wallet(Arc::clone(&sessions), id.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = spin_slots(Arc::clone(&sessions), id, StakeRequest { stake: 5 }).await;
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

        let body = body_json(response).await;
        assert_eq!(body["error"], "wallet_not_connected");
    }

    #[tokio::test]
    async fn delete_session_returns_no_content() {
        let sessions = manager();
        let id = sessions
            .create_session(SessionConfig::default())
            .expect("create");

        let response = delete_session(Arc::clone(&sessions), id.clone()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = get_session(sessions, id).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn bet_request_maps_onto_engine_kinds() {
        let red: BetRequest =
            serde_json::from_value(json!({"kind": "red", "amount": 10})).expect("red bet");
        assert_eq!(red.bet_kind().expect("kind"), BetKind::Red);
        assert_eq!(red.amount, 10);

        let straight: BetRequest =
            serde_json::from_value(json!({"kind": "straight", "number": 17, "amount": 5}))
                .expect("straight bet");
        assert_eq!(
            straight.bet_kind().expect("kind"),
            BetKind::Straight { number: 17 }
        );

        let bare_straight: BetRequest =
            serde_json::from_value(json!({"kind": "straight", "amount": 5})).expect("parse");
        assert!(bare_straight.bet_kind().is_err());

        let corner: BetRequest =
            serde_json::from_value(json!({"kind": "corner", "amount": 5})).expect("parse");
        assert!(corner.bet_kind().is_err());
    }

    #[test]
    fn poker_action_request_maps_onto_engine_actions() {
        let fold = PokerActionRequest {
            action: "fold".to_string(),
            amount: None,
        };
        assert_eq!(fold.poker_action().expect("fold"), PokerAction::Fold);

        let check = PokerActionRequest {
            action: "check".to_string(),
            amount: None,
        };
        assert_eq!(check.poker_action().expect("check"), PokerAction::Call);

        let raise = PokerActionRequest {
            action: "raise".to_string(),
            amount: Some(20),
        };
        assert_eq!(raise.poker_action().expect("raise"), PokerAction::Raise(20));

        let bare_raise = PokerActionRequest {
            action: "raise".to_string(),
            amount: None,
        };
        assert!(bare_raise.poker_action().is_err());
    }
}
