use crate::session::SessionId;
use greenfelt_engine::cards::Card;
use greenfelt_engine::history::{GameKind, RoundRecord};
use greenfelt_engine::poker::{PokerAction, Street};
use greenfelt_engine::roulette::PocketColor;
use greenfelt_engine::slots::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

// Bounded channel so a stalled SSE client cannot grow memory without limit;
// events for a full channel are dropped and the subscriber pruned.
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<GameEvent>;
pub type EventReceiver = mpsc::Receiver<GameEvent>;

/// A live subscription to one session's event stream. Dropping it
/// unsubscribes from the bus.
pub struct EventSubscription {
    bus: EventBus,
    session_id: SessionId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.session_id, self.subscriber_id);
    }
}

/// Per-session event fan-out: every event broadcast for a session id is
/// delivered to all of that session's live subscribers, in order.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<HashMap<SessionId, Vec<(usize, EventSender)>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, session_id: SessionId) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(session_id.clone());
        EventSubscription {
            bus: self.clone(),
            session_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, session_id: SessionId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        guard.entry(session_id.clone()).or_default().push((id, tx));

        tracing::info!(
            session_id = %session_id,
            subscriber_id = id,
            "client subscribed to game events"
        );

        (id, rx)
    }

    pub fn broadcast(&self, session_id: &SessionId, event: GameEvent) {
        tracing::debug!(
            session_id = %session_id,
            event = ?event,
            "broadcasting game event"
        );

        let subscribers = {
            let guard = self
                .inner
                .subscribers
                .read()
                .expect("subscriber lock poisoned");
            guard.get(session_id).cloned()
        };

        if let Some(list) = subscribers {
            let mut failed = Vec::new();
            for (id, sender) in list {
                // try_send keeps the broadcast non-blocking; a full or
                // closed channel marks the subscriber for removal
                if let Err(e) = sender.try_send(event.clone()) {
                    tracing::warn!(
                        session_id = %session_id,
                        subscriber_id = id,
                        error = ?e,
                        "failed to send event to subscriber"
                    );
                    failed.push(id);
                }
            }
            if !failed.is_empty() {
                self.remove_subscribers(session_id, &failed);
            }
        }
    }

    pub fn unsubscribe(&self, session_id: &SessionId, subscriber_id: usize) {
        self.remove_subscribers(session_id, &[subscriber_id]);
    }

    /// Drops every subscriber of a session; used when the session ends.
    pub fn drop_session(&self, session_id: &SessionId) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        guard.remove(session_id);
    }

    pub fn subscriber_count(&self) -> usize {
        let guard = self
            .inner
            .subscribers
            .read()
            .expect("subscriber lock poisoned");
        guard.values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, session_id: &SessionId, ids: &[usize]) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .expect("subscriber lock poisoned");
        if let Some(list) = guard.get_mut(session_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(session_id);
            }
        }
    }
}

/// Who a blackjack card went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealTarget {
    Player,
    Dealer,
}

/// Everything the SSE stream can carry. One event per observable table
/// change, tagged so the front-end can switch on `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    SessionCreated {
        session_id: SessionId,
        balance: u64,
    },
    WalletConnected {
        session_id: SessionId,
        balance: u64,
    },
    WalletDisconnected {
        session_id: SessionId,
    },
    RoundStarted {
        session_id: SessionId,
        game: GameKind,
        stake: u64,
    },
    /// A card dealt face-up (`card` present) or face-down (`None`, the
    /// dealer's hole card).
    CardDealt {
        session_id: SessionId,
        to: DealTarget,
        card: Option<Card>,
    },
    DealerDrew {
        session_id: SessionId,
        card: Card,
        dealer_value: u16,
    },
    RouletteSpun {
        session_id: SessionId,
        pocket: u8,
        color: PocketColor,
        winnings: u64,
    },
    SlotsSpun {
        session_id: SessionId,
        reels: [Symbol; 3],
        payout: u64,
    },
    PokerAction {
        session_id: SessionId,
        seat: usize,
        name: String,
        action: PokerAction,
    },
    StreetAdvanced {
        session_id: SessionId,
        street: Street,
        community: Vec<Card>,
    },
    RoundSettled {
        session_id: SessionId,
        record: RoundRecord,
    },
    BalanceChanged {
        session_id: SessionId,
        balance: u64,
    },
    SessionExpired {
        session_id: SessionId,
        reason: String,
    },
}
