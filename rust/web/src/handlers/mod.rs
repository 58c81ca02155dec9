pub mod game;
pub mod health;
pub mod history;
pub mod settings;
pub mod sse;

pub use game::{
    BetRequest, BuyInRequest, CreateSessionRequest, PokerActionRequest, StakeRequest,
    blackjack_deal, blackjack_hit, blackjack_reset, blackjack_stand, clear_roulette_bets,
    connect_wallet, create_session, delete_session, disconnect_wallet, get_blackjack, get_poker,
    get_roulette, get_session, get_slots, get_wallet, join_poker, place_roulette_bet,
    poker_action, reset_roulette, spin_roulette, spin_slots,
};
pub use health::health;
pub use history::{session_history, session_stats};
pub use settings::{
    UpdateFieldRequest, UpdateSettingsRequest, get_settings, reset_settings, update_field,
    update_settings,
};
pub use sse::stream_events;
