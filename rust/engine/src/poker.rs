use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::hand::{compare_hands, evaluate_hand, HandCategory, HandStrength};
use crate::history::{GameKind, Outcome, RoundSummary};
use crate::wallet::Wallet;

/// Betting street of a hold'em round.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

/// Actions a seat can take when it is their turn.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PokerAction {
    Fold,
    Call,
    Raise(u64),
}

/// Bet level posted at the start of every preflop.
pub const OPENING_BET: u64 = 10;
/// Chips each house opponent sits down with.
pub const AI_STACK: u64 = 1000;
/// The user always occupies the first seat.
pub const USER_SEAT: usize = 0;

pub const DEFAULT_OPPONENTS: [&str; 3] = ["Alice", "Bob", "Charlie"];

/// One seat at the table.
#[derive(Debug, Clone)]
pub struct PokerSeat {
    name: String,
    chips: u64,
    hole: [Option<Card>; 2],
    street_bet: u64,
    folded: bool,
    is_user: bool,
    acted: bool,
}

impl PokerSeat {
    fn new(name: &str, chips: u64, is_user: bool) -> Self {
        Self {
            name: name.to_string(),
            chips,
            hole: [None, None],
            street_bet: 0,
            folded: false,
            is_user,
            acted: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chips(&self) -> u64 {
        self.chips
    }

    pub fn hole(&self) -> [Option<Card>; 2] {
        self.hole
    }

    /// Chips committed on the current street.
    pub fn street_bet(&self) -> u64 {
        self.street_bet
    }

    pub fn folded(&self) -> bool {
        self.folded
    }

    pub fn is_user(&self) -> bool {
        self.is_user
    }
}

/// How a round ended: who took the pot and with what, if a showdown
/// happened (`category` is `None` when everyone else folded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowdownReport {
    pub winner: String,
    pub winning_seat: usize,
    pub category: Option<HandCategory>,
    pub pot: u64,
}

/// Simplified Texas hold'em round: the user against house opponents.
///
/// The machine is seat-agnostic: it validates turn order and applies
/// whatever action the caller supplies, whether the user chose it or an AI
/// policy did. Each active seat acts once per street; a raise lifts the bet
/// level without reopening the round. The buy-in is debited once at
/// creation and the resolution credits the pot on a user win, zero
/// otherwise. Showdown ranks real 7-card hands.
///
/// # Examples
///
/// ```
/// use greenfelt_engine::poker::{PokerAction, PokerRound, DEFAULT_OPPONENTS};
/// use greenfelt_engine::wallet::ChipWallet;
///
/// let mut wallet = ChipWallet::new(500);
/// let mut round =
///     PokerRound::new(100, &DEFAULT_OPPONENTS, Some(42), &mut wallet).unwrap();
/// // everyone calls down to showdown
/// while let Some(seat) = round.current_seat() {
///     round.apply_action(seat, PokerAction::Call, &mut wallet).unwrap();
/// }
/// let report = round.report().unwrap();
/// assert!(report.category.is_some());
/// ```
#[derive(Debug)]
pub struct PokerRound {
    deck: Deck,
    seats: Vec<PokerSeat>,
    community: Vec<Card>,
    street: Street,
    pot: u64,
    bet_level: u64,
    to_act: usize,
    buy_in: u64,
    settlement: Option<RoundSummary>,
    report: Option<ShowdownReport>,
}

impl PokerRound {
    /// Debits the buy-in, seats the user (first) and the named opponents,
    /// deals two hole cards per seat, and opens the preflop betting.
    pub fn new(
        buy_in: u64,
        opponents: &[&str],
        seed: Option<u64>,
        wallet: &mut dyn Wallet,
    ) -> Result<Self, GameError> {
        if buy_in == 0 {
            return Err(GameError::InvalidStake { stake: buy_in });
        }
        wallet.debit(buy_in)?;
        let seed = seed.unwrap_or_else(rand::random);
        let mut deck = Deck::new_with_seed(seed);
        deck.shuffle();

        let mut seats = Vec::with_capacity(opponents.len() + 1);
        seats.push(PokerSeat::new("You", buy_in, true));
        for name in opponents {
            seats.push(PokerSeat::new(name, AI_STACK, false));
        }
        for seat in &mut seats {
            let first = deck.deal_card().ok_or(GameError::DeckExhausted)?;
            let second = deck.deal_card().ok_or(GameError::DeckExhausted)?;
            seat.hole = [Some(first), Some(second)];
        }

        Ok(Self {
            deck,
            seats,
            community: Vec::with_capacity(5),
            street: Street::Preflop,
            pot: 0,
            bet_level: OPENING_BET,
            to_act: USER_SEAT,
            buy_in,
            settlement: None,
            report: None,
        })
    }

    pub fn street(&self) -> Street {
        self.street
    }

    pub fn seats(&self) -> &[PokerSeat] {
        &self.seats
    }

    pub fn community(&self) -> &[Card] {
        &self.community
    }

    pub fn pot(&self) -> u64 {
        self.pot
    }

    pub fn bet_level(&self) -> u64 {
        self.bet_level
    }

    pub fn buy_in(&self) -> u64 {
        self.buy_in
    }

    pub fn is_settled(&self) -> bool {
        self.settlement.is_some()
    }

    pub fn settlement(&self) -> Option<RoundSummary> {
        self.settlement
    }

    pub fn report(&self) -> Option<&ShowdownReport> {
        self.report.as_ref()
    }

    /// Whose turn it is, or `None` once the round has settled.
    pub fn current_seat(&self) -> Option<usize> {
        if self.settlement.is_some() {
            None
        } else {
            Some(self.to_act)
        }
    }

    /// Chips `seat` must put in to match the current bet level.
    pub fn to_call(&self, seat: usize) -> u64 {
        self.bet_level
            .saturating_sub(self.seats.get(seat).map_or(0, |s| s.street_bet))
    }

    /// Applies one action for the seat whose turn it is, then advances the
    /// turn, the street, or the settlement as the table state requires.
    pub fn apply_action(
        &mut self,
        seat: usize,
        action: PokerAction,
        wallet: &mut dyn Wallet,
    ) -> Result<(), GameError> {
        if self.settlement.is_some() {
            return Err(GameError::NoRoundInProgress);
        }
        if seat != self.to_act {
            return Err(GameError::NotPlayersTurn {
                expected: self.to_act,
                actual: seat,
            });
        }
        if self.seats[seat].folded {
            return Err(GameError::PlayerAlreadyFolded);
        }

        match action {
            PokerAction::Fold => {
                self.seats[seat].folded = true;
                self.seats[seat].acted = true;
                if self.seats[seat].is_user {
                    // the user cannot win after folding, so the round
                    // settles now; the pot goes to the next live seat
                    let next = self.first_active().ok_or(GameError::NoRoundInProgress)?;
                    return self.award_pot(next, None, wallet);
                }
            }
            PokerAction::Call => {
                let owed = self.to_call(seat);
                self.commit_chips(seat, owed);
                self.seats[seat].acted = true;
            }
            PokerAction::Raise(amount) => {
                if amount == 0 {
                    return Err(GameError::InvalidStake { stake: amount });
                }
                self.bet_level += amount;
                let owed = self.to_call(seat);
                self.commit_chips(seat, owed);
                self.seats[seat].acted = true;
            }
        }

        if self.active_count() == 1 {
            let last = self.first_active().ok_or(GameError::NoRoundInProgress)?;
            return self.award_pot(last, None, wallet);
        }
        if self.street_complete() {
            self.advance_street(wallet)
        } else {
            if let Some(next) = self.next_unacted(seat) {
                self.to_act = next;
            }
            Ok(())
        }
    }

    fn commit_chips(&mut self, seat: usize, owed: u64) {
        // no side pots: a short stack just puts in what it has
        let pay = owed.min(self.seats[seat].chips);
        self.seats[seat].chips -= pay;
        self.seats[seat].street_bet += pay;
        self.pot += pay;
    }

    fn active_count(&self) -> usize {
        self.seats.iter().filter(|s| !s.folded).count()
    }

    fn first_active(&self) -> Option<usize> {
        self.seats.iter().position(|s| !s.folded)
    }

    fn next_unacted(&self, from: usize) -> Option<usize> {
        let n = self.seats.len();
        (1..n)
            .map(|step| (from + step) % n)
            .find(|&i| !self.seats[i].folded && !self.seats[i].acted)
    }

    fn street_complete(&self) -> bool {
        self.seats.iter().all(|s| s.folded || s.acted)
    }

    fn advance_street(&mut self, wallet: &mut dyn Wallet) -> Result<(), GameError> {
        for seat in &mut self.seats {
            seat.street_bet = 0;
            seat.acted = false;
        }
        self.bet_level = 0;
        match self.street {
            Street::Preflop => {
                for _ in 0..3 {
                    let c = self.deck.deal_card().ok_or(GameError::DeckExhausted)?;
                    self.community.push(c);
                }
                self.street = Street::Flop;
            }
            Street::Flop => {
                let c = self.deck.deal_card().ok_or(GameError::DeckExhausted)?;
                self.community.push(c);
                self.street = Street::Turn;
            }
            Street::Turn => {
                let c = self.deck.deal_card().ok_or(GameError::DeckExhausted)?;
                self.community.push(c);
                self.street = Street::River;
            }
            Street::River => {
                self.street = Street::Showdown;
                return self.resolve_showdown(wallet);
            }
            Street::Showdown => return Err(GameError::NoRoundInProgress),
        }
        self.to_act = self.first_active().ok_or(GameError::NoRoundInProgress)?;
        Ok(())
    }

    fn resolve_showdown(&mut self, wallet: &mut dyn Wallet) -> Result<(), GameError> {
        let mut best: Option<(usize, HandStrength)> = None;
        for (i, seat) in self.seats.iter().enumerate() {
            if seat.folded {
                continue;
            }
            let mut cards: Vec<Card> = seat.hole.iter().flatten().copied().collect();
            cards.extend_from_slice(&self.community);
            let cards: [Card; 7] = cards
                .try_into()
                .map_err(|_| GameError::DeckExhausted)?;
            let strength = evaluate_hand(&cards);
            let stronger = match &best {
                None => true,
                Some((_, current)) => {
                    compare_hands(&strength, current) == std::cmp::Ordering::Greater
                }
            };
            if stronger {
                best = Some((i, strength));
            }
        }
        let (winner, strength) = best.ok_or(GameError::NoRoundInProgress)?;
        self.award_pot(winner, Some(strength.category), wallet)
    }

    fn award_pot(
        &mut self,
        winner: usize,
        category: Option<HandCategory>,
        wallet: &mut dyn Wallet,
    ) -> Result<(), GameError> {
        let pot = self.pot;
        self.seats[winner].chips += pot;
        let user_won = self.seats[winner].is_user;
        let payout = if user_won { pot } else { 0 };
        wallet.credit(payout)?;
        self.settlement = Some(RoundSummary {
            game: GameKind::Poker,
            stake: self.buy_in,
            outcome: if user_won { Outcome::Win } else { Outcome::Lose },
            payout,
        });
        self.report = Some(ShowdownReport {
            winner: self.seats[winner].name.clone(),
            winning_seat: winner,
            category,
            pot,
        });
        self.street = Street::Showdown;
        Ok(())
    }
}
