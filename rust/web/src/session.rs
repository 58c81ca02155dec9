use crate::events::{DealTarget, EventBus, GameEvent};
use crate::metrics::MetricsCollector;
use greenfelt_ai::{table_brains, PokerBrain};
use greenfelt_engine::blackjack::{BlackjackPhase, BlackjackRound, DealerStep};
use greenfelt_engine::cards::Card;
use greenfelt_engine::errors::GameError;
use greenfelt_engine::hand::HandCategory;
use greenfelt_engine::history::{
    GameKind, RoundRecord, RoundSummary, SessionHistory, SessionStats,
};
use greenfelt_engine::poker::{PokerAction, PokerRound, Street, DEFAULT_OPPONENTS, USER_SEAT};
use greenfelt_engine::roulette::{BetKind, PlacedBet, RoulettePhase, RouletteRound, SpinReport};
use greenfelt_engine::slots::{SlotsMachine, SpinResult};
use greenfelt_engine::wallet::{ChipWallet, Wallet};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

pub type SessionId = String;

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

// Each machine draws from its own lane of the session seed so replays of
// one game are unaffected by how much the others were played.
const BLACKJACK_LANE: u64 = 1;
const ROULETTE_LANE: u64 = 2;
const SLOTS_LANE: u64 = 3;
const POKER_LANE: u64 = 4;
// Every poker join gets its own seed block with room for per-seat brains.
const POKER_STRIDE: u64 = 16;

/// Parameters a client may supply when opening a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub seed: Option<u64>,
    pub starting_chips: u64,
    pub opponents: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            starting_chips: 1000,
            opponents: DEFAULT_OPPONENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SessionConfig {
    fn validate(&self) -> Result<(), SessionError> {
        if self.starting_chips == 0 {
            return Err(SessionError::InvalidRequest(
                "starting_chips must be at least 1".to_string(),
            ));
        }
        if self.opponents.is_empty() || self.opponents.len() > 8 {
            return Err(SessionError::InvalidRequest(
                "between 1 and 8 poker opponents are required".to_string(),
            ));
        }
        if self.opponents.iter().any(|name| name.trim().is_empty()) {
            return Err(SessionError::InvalidRequest(
                "opponent names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletView {
    pub balance: u64,
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackjackView {
    pub phase: BlackjackPhase,
    pub stake: u64,
    pub player_hand: Vec<Card>,
    pub player_value: u16,
    /// Dealer cards the player may see; the hole card is withheld while
    /// the player is still acting.
    pub dealer_hand: Vec<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer_value: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<RoundSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouletteView {
    pub phase: RoulettePhase,
    pub bets: Vec<PlacedBet>,
    pub total_staked: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_spin: Option<SpinReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsView {
    pub spin_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_spin: Option<SpinResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokerSeatView {
    pub name: String,
    pub chips: u64,
    pub folded: bool,
    pub is_user: bool,
    /// Only the user's own hole cards are visible before a showdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<[Card; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowdownView {
    pub winner: String,
    pub winning_seat: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<HandCategory>,
    pub pot: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokerView {
    pub street: Street,
    pub pot: u64,
    pub bet_level: u64,
    pub to_call: u64,
    pub community: Vec<Card>,
    pub seats: Vec<PokerSeatView>,
    pub your_turn: bool,
    pub settled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ShowdownView>,
}

/// Everything a client needs to render the whole floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub balance: u64,
    pub connected: bool,
    pub blackjack: BlackjackView,
    pub roulette: RouletteView,
    pub slots: SlotsView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poker: Option<PokerView>,
    pub stats: SessionStats,
}

/// Owns every session and routes operations to them.
///
/// Sessions expire after thirty minutes of inactivity; expiry is detected
/// lazily on access and eagerly by
/// [`cleanup_expired_sessions`](SessionManager::cleanup_expired_sessions).
#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<CasinoSession>>>,
    event_bus: Arc<EventBus>,
    metrics: MetricsCollector,
    session_ttl: Duration,
}

impl SessionManager {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self::with_metrics(event_bus, MetricsCollector::new())
    }

    pub fn with_metrics(event_bus: Arc<EventBus>, metrics: MetricsCollector) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            event_bus,
            metrics,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_ttl(event_bus: Arc<EventBus>, ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            event_bus,
            metrics: MetricsCollector::new(),
            session_ttl: ttl,
        }
    }

    pub fn create_session(&self, config: SessionConfig) -> Result<SessionId, SessionError> {
        config.validate()?;
        let id = Uuid::new_v4().to_string();

        tracing::info!(
            session_id = %id,
            starting_chips = config.starting_chips,
            seed = ?config.seed,
            "creating casino session"
        );

        let session = Arc::new(CasinoSession::new(id.clone(), config));
        let balance = session.wallet_view()?.balance;

        {
            let mut guard = self
                .sessions
                .write()
                .map_err(|_| SessionError::StoragePoisoned)?;
            guard.insert(id.clone(), Arc::clone(&session));
        }
        self.metrics.increment_active_sessions();

        self.publish(
            &id,
            vec![GameEvent::SessionCreated {
                session_id: id.clone(),
                balance,
            }],
        );

        Ok(id)
    }

    pub fn get_session(&self, id: &SessionId) -> Result<Arc<CasinoSession>, SessionError> {
        let guard = self
            .sessions
            .read()
            .map_err(|_| SessionError::StoragePoisoned)?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    /// Looks a session up, expiring it on the spot if its TTL has lapsed,
    /// and refreshes its activity clock otherwise. Every operation below
    /// goes through here.
    pub fn checked_session(&self, id: &SessionId) -> Result<Arc<CasinoSession>, SessionError> {
        let session = self.get_session(id)?;
        if session.is_expired(self.session_ttl) {
            self.expire_session(id, "expired due to inactivity")?;
            return Err(SessionError::Expired(id.clone()));
        }
        session.touch();
        Ok(session)
    }

    pub fn session_view(&self, id: &SessionId) -> Result<SessionView, SessionError> {
        self.checked_session(id)?.session_view()
    }

    pub fn wallet_view(&self, id: &SessionId) -> Result<WalletView, SessionError> {
        self.checked_session(id)?.wallet_view()
    }

    pub fn connect_wallet(&self, id: &SessionId) -> Result<WalletView, SessionError> {
        let session = self.checked_session(id)?;
        let mut events = Vec::new();
        let view = session.connect_wallet(&mut events)?;
        self.publish(id, events);
        Ok(view)
    }

    pub fn disconnect_wallet(&self, id: &SessionId) -> Result<WalletView, SessionError> {
        let session = self.checked_session(id)?;
        let mut events = Vec::new();
        let view = session.disconnect_wallet(&mut events)?;
        self.publish(id, events);
        Ok(view)
    }

    pub fn blackjack_view(&self, id: &SessionId) -> Result<BlackjackView, SessionError> {
        self.checked_session(id)?.blackjack_view()
    }

    pub fn blackjack_deal(
        &self,
        id: &SessionId,
        stake: u64,
    ) -> Result<BlackjackView, SessionError> {
        let session = self.checked_session(id)?;
        let mut events = Vec::new();
        let view = session.blackjack_deal(stake, &mut events)?;
        self.publish(id, events);
        Ok(view)
    }

    pub fn blackjack_hit(&self, id: &SessionId) -> Result<BlackjackView, SessionError> {
        let session = self.checked_session(id)?;
        let mut events = Vec::new();
        let view = session.blackjack_hit(&mut events)?;
        self.publish(id, events);
        Ok(view)
    }

    pub fn blackjack_stand(&self, id: &SessionId) -> Result<BlackjackView, SessionError> {
        let session = self.checked_session(id)?;
        let mut events = Vec::new();
        let view = session.blackjack_stand(&mut events)?;
        self.publish(id, events);
        Ok(view)
    }

    pub fn blackjack_reset(&self, id: &SessionId) -> Result<BlackjackView, SessionError> {
        self.checked_session(id)?.blackjack_reset()
    }

    pub fn roulette_view(&self, id: &SessionId) -> Result<RouletteView, SessionError> {
        self.checked_session(id)?.roulette_view()
    }

    pub fn place_roulette_bet(
        &self,
        id: &SessionId,
        kind: BetKind,
        amount: u64,
    ) -> Result<RouletteView, SessionError> {
        self.checked_session(id)?.place_roulette_bet(kind, amount)
    }

    pub fn clear_roulette_bets(&self, id: &SessionId) -> Result<RouletteView, SessionError> {
        self.checked_session(id)?.clear_roulette_bets()
    }

    pub fn spin_roulette(&self, id: &SessionId) -> Result<SpinReport, SessionError> {
        let session = self.checked_session(id)?;
        let mut events = Vec::new();
        let report = session.spin_roulette(&mut events)?;
        self.publish(id, events);
        Ok(report)
    }

    pub fn reset_roulette(&self, id: &SessionId) -> Result<RouletteView, SessionError> {
        self.checked_session(id)?.reset_roulette()
    }

    pub fn slots_view(&self, id: &SessionId) -> Result<SlotsView, SessionError> {
        self.checked_session(id)?.slots_view()
    }

    pub fn spin_slots(&self, id: &SessionId, stake: u64) -> Result<SpinResult, SessionError> {
        let session = self.checked_session(id)?;
        let mut events = Vec::new();
        let result = session.spin_slots(stake, &mut events)?;
        self.publish(id, events);
        Ok(result)
    }

    pub fn poker_view(&self, id: &SessionId) -> Result<PokerView, SessionError> {
        self.checked_session(id)?.poker_view()
    }

    pub fn join_poker(&self, id: &SessionId, buy_in: u64) -> Result<PokerView, SessionError> {
        let session = self.checked_session(id)?;
        let mut events = Vec::new();
        let view = session.join_poker(buy_in, &mut events)?;
        self.publish(id, events);
        Ok(view)
    }

    pub fn poker_action(
        &self,
        id: &SessionId,
        action: PokerAction,
    ) -> Result<PokerView, SessionError> {
        let session = self.checked_session(id)?;
        let mut events = Vec::new();
        let view = session.poker_action(action, &mut events)?;
        self.publish(id, events);
        Ok(view)
    }

    pub fn history(
        &self,
        id: &SessionId,
        limit: usize,
    ) -> Result<Vec<RoundRecord>, SessionError> {
        self.checked_session(id)?.history(limit)
    }

    pub fn stats(&self, id: &SessionId) -> Result<SessionStats, SessionError> {
        self.checked_session(id)?.stats()
    }

    pub fn delete_session(&self, id: &SessionId) -> Result<(), SessionError> {
        match self.remove_session(id)? {
            Some(_) => {
                self.metrics.decrement_active_sessions();
                self.publish(
                    id,
                    vec![GameEvent::SessionExpired {
                        session_id: id.clone(),
                        reason: "ended by request".to_string(),
                    }],
                );
                self.event_bus.drop_session(id);
                Ok(())
            }
            None => Err(SessionError::NotFound(id.clone())),
        }
    }

    /// Sweeps out every session past its TTL and reports how many went.
    /// Runs on a poisoned map too since a stale entry is removable
    /// regardless of what a writer was doing when it panicked.
    pub fn cleanup_expired_sessions(&self) -> usize {
        let mut expired = Vec::new();
        {
            let mut guard = match self.sessions.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.retain(|id, session| {
                if session.is_expired(self.session_ttl) {
                    expired.push(id.clone());
                    false
                } else {
                    true
                }
            });
        }

        let count = expired.len();
        for id in expired {
            self.metrics.decrement_active_sessions();
            self.publish(
                &id,
                vec![GameEvent::SessionExpired {
                    session_id: id.clone(),
                    reason: "expired due to inactivity".to_string(),
                }],
            );
            self.event_bus.drop_session(&id);
        }
        count
    }

    pub fn active_sessions(&self) -> Vec<SessionId> {
        match self.sessions.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn session_count(&self) -> usize {
        match self.sessions.read() {
            Ok(guard) => guard.len(),
            Err(_) => 0,
        }
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    fn publish(&self, id: &SessionId, events: Vec<GameEvent>) {
        for event in events {
            self.metrics.record_event_broadcast();
            if matches!(event, GameEvent::RoundSettled { .. }) {
                self.metrics.record_round_settled();
            }
            self.event_bus.broadcast(id, event);
        }
    }

    fn expire_session(&self, id: &SessionId, reason: &str) -> Result<(), SessionError> {
        if self.remove_session(id)?.is_some() {
            self.metrics.decrement_active_sessions();
            self.publish(
                id,
                vec![GameEvent::SessionExpired {
                    session_id: id.clone(),
                    reason: reason.to_string(),
                }],
            );
            self.event_bus.drop_session(id);
        }
        Ok(())
    }

    fn remove_session(
        &self,
        id: &SessionId,
    ) -> Result<Option<Arc<CasinoSession>>, SessionError> {
        match self.sessions.write() {
            Ok(mut guard) => Ok(guard.remove(id)),
            Err(_) => Err(SessionError::StoragePoisoned),
        }
    }
}

/// One client's private casino floor: a chip wallet, the four machines,
/// and the round history. Nothing here is shared across sessions.
///
/// Lock order when an operation needs more than one field: game machine,
/// then wallet, then history. Every method keeps to it.
pub struct CasinoSession {
    id: SessionId,
    config: SessionConfig,
    rng_base: u64,
    created_at: Instant,
    wallet: Mutex<ChipWallet>,
    blackjack: Mutex<BlackjackRound>,
    roulette: Mutex<RouletteRound>,
    slots: Mutex<SlotsMachine>,
    poker: Mutex<Option<PokerTable>>,
    poker_joins: Mutex<u64>,
    history: Mutex<SessionHistory>,
    last_active: Mutex<Instant>,
}

struct PokerTable {
    round: PokerRound,
    brains: Vec<Box<dyn PokerBrain>>,
}

impl std::fmt::Debug for CasinoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CasinoSession")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("created_at", &self.created_at)
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, SessionError> {
    mutex.lock().map_err(|_| SessionError::StoragePoisoned)
}

impl CasinoSession {
    fn new(id: SessionId, config: SessionConfig) -> Self {
        // Unseeded sessions derive their base from the session id, so the
        // whole floor still replays within one session's lifetime.
        let rng_base = config.seed.unwrap_or_else(|| {
            let mut hasher = DefaultHasher::new();
            id.hash(&mut hasher);
            hasher.finish()
        });
        let now = Instant::now();
        Self {
            wallet: Mutex::new(ChipWallet::new(config.starting_chips)),
            blackjack: Mutex::new(BlackjackRound::new(Some(
                rng_base.wrapping_add(BLACKJACK_LANE),
            ))),
            roulette: Mutex::new(RouletteRound::new(Some(
                rng_base.wrapping_add(ROULETTE_LANE),
            ))),
            slots: Mutex::new(SlotsMachine::new(Some(rng_base.wrapping_add(SLOTS_LANE)))),
            poker: Mutex::new(None),
            poker_joins: Mutex::new(0),
            history: Mutex::new(SessionHistory::new()),
            last_active: Mutex::new(now),
            created_at: now,
            id,
            config,
            rng_base,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn touch(&self) {
        if let Ok(mut guard) = self.last_active.lock() {
            *guard = Instant::now();
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        match self.last_active.lock() {
            Ok(last) => last.elapsed() >= ttl,
            Err(_) => false,
        }
    }

    #[cfg(test)]
    fn force_last_active(&self, instant: Instant) {
        if let Ok(mut guard) = self.last_active.lock() {
            *guard = instant;
        }
    }

    pub fn wallet_view(&self) -> Result<WalletView, SessionError> {
        let wallet = lock(&self.wallet)?;
        Ok(WalletView {
            balance: wallet.balance(),
            connected: wallet.is_connected(),
        })
    }

    fn connect_wallet(&self, events: &mut Vec<GameEvent>) -> Result<WalletView, SessionError> {
        let mut wallet = lock(&self.wallet)?;
        wallet.connect();
        let view = WalletView {
            balance: wallet.balance(),
            connected: true,
        };
        events.push(GameEvent::WalletConnected {
            session_id: self.id.clone(),
            balance: view.balance,
        });
        Ok(view)
    }

    fn disconnect_wallet(&self, events: &mut Vec<GameEvent>) -> Result<WalletView, SessionError> {
        let mut wallet = lock(&self.wallet)?;
        wallet.disconnect();
        events.push(GameEvent::WalletDisconnected {
            session_id: self.id.clone(),
        });
        Ok(WalletView {
            balance: wallet.balance(),
            connected: false,
        })
    }

    pub fn session_view(&self) -> Result<SessionView, SessionError> {
        let blackjack = self.blackjack_view()?;
        let roulette = self.roulette_view()?;
        let slots = self.slots_view()?;
        let poker = {
            let table = lock(&self.poker)?;
            table.as_ref().map(|t| Self::snapshot_poker(&t.round))
        };
        let (balance, connected) = {
            let wallet = lock(&self.wallet)?;
            (wallet.balance(), wallet.is_connected())
        };
        let stats = lock(&self.history)?.stats();
        Ok(SessionView {
            session_id: self.id.clone(),
            balance,
            connected,
            blackjack,
            roulette,
            slots,
            poker,
            stats,
        })
    }

    pub fn blackjack_view(&self) -> Result<BlackjackView, SessionError> {
        let round = lock(&self.blackjack)?;
        Ok(Self::snapshot_blackjack(&round))
    }

    fn snapshot_blackjack(round: &BlackjackRound) -> BlackjackView {
        let dealer_hand = round.visible_dealer_cards().to_vec();
        let dealer_value = match round.phase() {
            BlackjackPhase::PlayerTurn => None,
            _ if dealer_hand.is_empty() => None,
            _ => Some(round.dealer_value()),
        };
        BlackjackView {
            phase: round.phase(),
            stake: round.stake(),
            player_hand: round.player_hand().to_vec(),
            player_value: round.player_value(),
            dealer_hand,
            dealer_value,
            settlement: round.settlement(),
        }
    }

    fn blackjack_deal(
        &self,
        stake: u64,
        events: &mut Vec<GameEvent>,
    ) -> Result<BlackjackView, SessionError> {
        let mut round = lock(&self.blackjack)?;
        let mut wallet = lock(&self.wallet)?;
        if round.phase() == BlackjackPhase::Finished {
            round.reset()?;
        }
        round.deal(stake, &mut *wallet)?;

        events.push(GameEvent::RoundStarted {
            session_id: self.id.clone(),
            game: GameKind::Blackjack,
            stake,
        });
        for card in round.player_hand() {
            events.push(GameEvent::CardDealt {
                session_id: self.id.clone(),
                to: DealTarget::Player,
                card: Some(*card),
            });
        }
        match round.settlement() {
            // a natural settles on the deal and flips the hole card
            Some(summary) => {
                for card in round.dealer_hand() {
                    events.push(GameEvent::CardDealt {
                        session_id: self.id.clone(),
                        to: DealTarget::Dealer,
                        card: Some(*card),
                    });
                }
                self.record_settlement(summary, blackjack_meta(&round), wallet.balance(), events)?;
            }
            None => {
                events.push(GameEvent::CardDealt {
                    session_id: self.id.clone(),
                    to: DealTarget::Dealer,
                    card: round.visible_dealer_cards().first().copied(),
                });
                events.push(GameEvent::CardDealt {
                    session_id: self.id.clone(),
                    to: DealTarget::Dealer,
                    card: None,
                });
            }
        }
        Ok(Self::snapshot_blackjack(&round))
    }

    fn blackjack_hit(&self, events: &mut Vec<GameEvent>) -> Result<BlackjackView, SessionError> {
        let mut round = lock(&self.blackjack)?;
        let mut wallet = lock(&self.wallet)?;
        let card = round.hit(&mut *wallet)?;
        events.push(GameEvent::CardDealt {
            session_id: self.id.clone(),
            to: DealTarget::Player,
            card: Some(card),
        });
        if let Some(summary) = round.settlement() {
            self.record_settlement(summary, blackjack_meta(&round), wallet.balance(), events)?;
        }
        Ok(Self::snapshot_blackjack(&round))
    }

    /// Stands, then runs the dealer to completion one explicit step at a
    /// time so every draw lands on the event stream in order.
    fn blackjack_stand(&self, events: &mut Vec<GameEvent>) -> Result<BlackjackView, SessionError> {
        let mut round = lock(&self.blackjack)?;
        let mut wallet = lock(&self.wallet)?;
        round.stand()?;
        if let Some(hole) = round.dealer_hand().get(1).copied() {
            events.push(GameEvent::CardDealt {
                session_id: self.id.clone(),
                to: DealTarget::Dealer,
                card: Some(hole),
            });
        }
        let summary = loop {
            match round.dealer_step(&mut *wallet)? {
                DealerStep::Drew(card) => {
                    events.push(GameEvent::DealerDrew {
                        session_id: self.id.clone(),
                        card,
                        dealer_value: round.dealer_value(),
                    });
                }
                DealerStep::Settled(summary) => break summary,
            }
        };
        self.record_settlement(summary, blackjack_meta(&round), wallet.balance(), events)?;
        Ok(Self::snapshot_blackjack(&round))
    }

    fn blackjack_reset(&self) -> Result<BlackjackView, SessionError> {
        let mut round = lock(&self.blackjack)?;
        round.reset()?;
        Ok(Self::snapshot_blackjack(&round))
    }

    pub fn roulette_view(&self) -> Result<RouletteView, SessionError> {
        let round = lock(&self.roulette)?;
        Ok(Self::snapshot_roulette(&round))
    }

    fn snapshot_roulette(round: &RouletteRound) -> RouletteView {
        RouletteView {
            phase: round.phase(),
            bets: round.bets().to_vec(),
            total_staked: round.total_staked(),
            last_spin: round.last_spin().cloned(),
        }
    }

    fn place_roulette_bet(
        &self,
        kind: BetKind,
        amount: u64,
    ) -> Result<RouletteView, SessionError> {
        let mut round = lock(&self.roulette)?;
        let wallet = lock(&self.wallet)?;
        round.place_bet(kind, amount, &*wallet)?;
        Ok(Self::snapshot_roulette(&round))
    }

    fn clear_roulette_bets(&self) -> Result<RouletteView, SessionError> {
        let mut round = lock(&self.roulette)?;
        round.clear_bets();
        Ok(Self::snapshot_roulette(&round))
    }

    fn spin_roulette(&self, events: &mut Vec<GameEvent>) -> Result<SpinReport, SessionError> {
        let mut round = lock(&self.roulette)?;
        let mut wallet = lock(&self.wallet)?;
        let stake = round.total_staked();
        let report = round.spin(&mut *wallet)?;

        events.push(GameEvent::RoundStarted {
            session_id: self.id.clone(),
            game: GameKind::Roulette,
            stake,
        });
        events.push(GameEvent::RouletteSpun {
            session_id: self.id.clone(),
            pocket: report.pocket,
            color: report.color,
            winnings: report.winnings,
        });
        let summary = RoundSummary {
            game: GameKind::Roulette,
            stake: report.total_staked,
            outcome: report.outcome,
            payout: report.winnings,
        };
        self.record_settlement(summary, roulette_meta(&report), wallet.balance(), events)?;
        Ok(report)
    }

    fn reset_roulette(&self) -> Result<RouletteView, SessionError> {
        let mut round = lock(&self.roulette)?;
        round.reset();
        Ok(Self::snapshot_roulette(&round))
    }

    pub fn slots_view(&self) -> Result<SlotsView, SessionError> {
        let slots = lock(&self.slots)?;
        Ok(SlotsView {
            spin_count: slots.spin_count(),
            last_spin: slots.last_spin(),
        })
    }

    fn spin_slots(
        &self,
        stake: u64,
        events: &mut Vec<GameEvent>,
    ) -> Result<SpinResult, SessionError> {
        let mut slots = lock(&self.slots)?;
        let mut wallet = lock(&self.wallet)?;
        let result = slots.spin(stake, &mut *wallet)?;

        events.push(GameEvent::RoundStarted {
            session_id: self.id.clone(),
            game: GameKind::Slots,
            stake,
        });
        events.push(GameEvent::SlotsSpun {
            session_id: self.id.clone(),
            reels: result.reels,
            payout: result.payout,
        });
        let summary = RoundSummary {
            game: GameKind::Slots,
            stake,
            outcome: result.outcome,
            payout: result.payout,
        };
        self.record_settlement(summary, slots_meta(&result), wallet.balance(), events)?;
        Ok(result)
    }

    pub fn poker_view(&self) -> Result<PokerView, SessionError> {
        let table = lock(&self.poker)?;
        match table.as_ref() {
            Some(t) => Ok(Self::snapshot_poker(&t.round)),
            None => Err(GameError::NoRoundInProgress.into()),
        }
    }

    fn snapshot_poker(round: &PokerRound) -> PokerView {
        let reveal_all = round.report().map_or(false, |r| r.category.is_some());
        let seats = round
            .seats()
            .iter()
            .map(|seat| {
                let hole = if seat.is_user() || (reveal_all && !seat.folded()) {
                    match seat.hole() {
                        [Some(a), Some(b)] => Some([a, b]),
                        _ => None,
                    }
                } else {
                    None
                };
                PokerSeatView {
                    name: seat.name().to_string(),
                    chips: seat.chips(),
                    folded: seat.folded(),
                    is_user: seat.is_user(),
                    hole,
                }
            })
            .collect();
        PokerView {
            street: round.street(),
            pot: round.pot(),
            bet_level: round.bet_level(),
            to_call: round.to_call(USER_SEAT),
            community: round.community().to_vec(),
            seats,
            your_turn: round.current_seat() == Some(USER_SEAT),
            settled: round.is_settled(),
            report: round.report().map(|r| ShowdownView {
                winner: r.winner.clone(),
                winning_seat: r.winning_seat,
                category: r.category,
                pot: r.pot,
            }),
        }
    }

    fn join_poker(
        &self,
        buy_in: u64,
        events: &mut Vec<GameEvent>,
    ) -> Result<PokerView, SessionError> {
        let mut table = lock(&self.poker)?;
        if let Some(existing) = table.as_ref() {
            if !existing.round.is_settled() {
                return Err(GameError::RoundInProgress.into());
            }
        }
        let mut wallet = lock(&self.wallet)?;
        let mut joins = lock(&self.poker_joins)?;
        *joins += 1;
        let seed = self
            .rng_base
            .wrapping_add(POKER_LANE)
            .wrapping_add(joins.wrapping_mul(POKER_STRIDE));

        let names: Vec<&str> = self.config.opponents.iter().map(String::as_str).collect();
        let round = PokerRound::new(buy_in, &names, Some(seed), &mut *wallet)?;
        let brains = table_brains(&names, seed);

        events.push(GameEvent::RoundStarted {
            session_id: self.id.clone(),
            game: GameKind::Poker,
            stake: buy_in,
        });
        events.push(GameEvent::BalanceChanged {
            session_id: self.id.clone(),
            balance: wallet.balance(),
        });

        let view = Self::snapshot_poker(&round);
        *table = Some(PokerTable { round, brains });
        Ok(view)
    }

    /// Applies the user's action, then steps the house seats until it is
    /// the user's turn again or the round settles.
    fn poker_action(
        &self,
        action: PokerAction,
        events: &mut Vec<GameEvent>,
    ) -> Result<PokerView, SessionError> {
        let mut slot = lock(&self.poker)?;
        let table = slot.as_mut().ok_or(GameError::NoRoundInProgress)?;
        let mut wallet = lock(&self.wallet)?;
        let PokerTable { round, brains } = table;

        let seat = round.current_seat().ok_or(GameError::NoRoundInProgress)?;
        if seat != USER_SEAT {
            return Err(GameError::NotPlayersTurn {
                expected: seat,
                actual: USER_SEAT,
            }
            .into());
        }

        let before = round.street();
        round.apply_action(USER_SEAT, action, &mut *wallet)?;
        self.push_poker_action(round, USER_SEAT, action, events);
        self.note_street_change(round, before, events);

        while let Some(seat) = round.current_seat() {
            if seat == USER_SEAT {
                break;
            }
            // one brain per opponent, in seat order after the user
            let chosen = brains[seat - 1].act(round, seat);
            let before = round.street();
            round.apply_action(seat, chosen, &mut *wallet)?;
            self.push_poker_action(round, seat, chosen, events);
            self.note_street_change(round, before, events);
        }

        if let Some(summary) = round.settlement() {
            self.record_settlement(summary, poker_meta(round), wallet.balance(), events)?;
        }
        Ok(Self::snapshot_poker(round))
    }

    fn push_poker_action(
        &self,
        round: &PokerRound,
        seat: usize,
        action: PokerAction,
        events: &mut Vec<GameEvent>,
    ) {
        let name = round
            .seats()
            .get(seat)
            .map(|s| s.name().to_string())
            .unwrap_or_default();
        events.push(GameEvent::PokerAction {
            session_id: self.id.clone(),
            seat,
            name,
            action,
        });
    }

    fn note_street_change(&self, round: &PokerRound, before: Street, events: &mut Vec<GameEvent>) {
        let after = round.street();
        // the showdown transition is reported as the settlement instead
        if after != before && after != Street::Showdown {
            events.push(GameEvent::StreetAdvanced {
                session_id: self.id.clone(),
                street: after,
                community: round.community().to_vec(),
            });
        }
    }

    pub fn history(&self, limit: usize) -> Result<Vec<RoundRecord>, SessionError> {
        let history = lock(&self.history)?;
        Ok(history.recent(limit).cloned().collect())
    }

    pub fn stats(&self) -> Result<SessionStats, SessionError> {
        Ok(lock(&self.history)?.stats())
    }

    fn record_settlement(
        &self,
        summary: RoundSummary,
        meta: Option<serde_json::Value>,
        balance: u64,
        events: &mut Vec<GameEvent>,
    ) -> Result<RoundRecord, SessionError> {
        let mut history = lock(&self.history)?;
        let record = history.record_with_meta(summary, meta);
        tracing::debug!(
            session_id = %self.id,
            round_id = %record.id,
            game = %record.game,
            payout = record.payout,
            "round settled"
        );
        events.push(GameEvent::RoundSettled {
            session_id: self.id.clone(),
            record: record.clone(),
        });
        events.push(GameEvent::BalanceChanged {
            session_id: self.id.clone(),
            balance,
        });
        Ok(record)
    }
}

fn blackjack_meta(round: &BlackjackRound) -> Option<serde_json::Value> {
    Some(serde_json::json!({
        "player_value": round.player_value(),
        "dealer_value": round.dealer_value(),
    }))
}

fn roulette_meta(report: &SpinReport) -> Option<serde_json::Value> {
    Some(serde_json::json!({
        "pocket": report.pocket,
        "color": report.color,
    }))
}

fn slots_meta(result: &SpinResult) -> Option<serde_json::Value> {
    Some(serde_json::json!({ "reels": result.reels }))
}

fn poker_meta(round: &PokerRound) -> Option<serde_json::Value> {
    round.report().map(|r| {
        serde_json::json!({
            "winner": r.winner,
            "category": r.category,
            "pot": r.pot,
        })
    })
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
    #[error("Session expired: {0}")]
    Expired(SessionId),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Session storage poisoned")]
    StoragePoisoned,
}

impl crate::errors::IntoErrorResponse for SessionError {
    fn status_code(&self) -> warp::http::StatusCode {
        use warp::http::StatusCode;
        match self {
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::Expired(_) => StatusCode::GONE,
            SessionError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SessionError::Game(err) => match err {
                GameError::NotConnected | GameError::InsufficientBalance { .. } => {
                    StatusCode::PAYMENT_REQUIRED
                }
                GameError::DeckExhausted => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            SessionError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SessionError::NotFound(_) => "session_not_found",
            SessionError::Expired(_) => "session_expired",
            SessionError::InvalidRequest(_) => "invalid_request",
            SessionError::Game(err) => match err {
                GameError::NotConnected => "wallet_not_connected",
                GameError::InsufficientBalance { .. } => "insufficient_balance",
                GameError::InvalidStake { .. } => "invalid_stake",
                GameError::InvalidPocket { .. } => "invalid_pocket",
                GameError::NoBetsPlaced => "no_bets_placed",
                GameError::RoundInProgress => "round_in_progress",
                GameError::NoRoundInProgress => "no_round_in_progress",
                GameError::NotPlayersTurn { .. } => "not_your_turn",
                GameError::PlayerAlreadyFolded => "already_folded",
                GameError::DeckExhausted => "deck_exhausted",
            },
            SessionError::StoragePoisoned => "session_storage_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            SessionError::NotFound(id) => Some(serde_json::json!({ "session_id": id })),
            SessionError::Expired(id) => Some(serde_json::json!({
                "session_id": id,
                "reason": "Session expired due to inactivity"
            })),
            SessionError::Game(GameError::InsufficientBalance {
                required,
                available,
            }) => Some(serde_json::json!({
                "required": required,
                "available": available,
            })),
            _ => None,
        }
    }

    fn severity(&self) -> crate::errors::ErrorSeverity {
        use crate::errors::ErrorSeverity;
        match self {
            SessionError::StoragePoisoned => ErrorSeverity::Critical,
            _ if self.status_code().is_server_error() => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }
}
