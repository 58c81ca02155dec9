use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::history::{GameKind, Outcome, RoundSummary};
use crate::wallet::Wallet;

/// Phase of a blackjack round.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlackjackPhase {
    /// Waiting for a stake; no cards dealt.
    Betting,
    /// Player may hit or stand.
    PlayerTurn,
    /// Player stood; dealer draws via explicit steps.
    DealerTurn,
    /// Round settled; reset to play again.
    Finished,
}

/// What a single dealer step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerStep {
    Drew(Card),
    Settled(RoundSummary),
}

/// Blackjack hand value: face cards count 10; each ace counts 11, reduced
/// to 1 while the total is over 21. `[A, 6, 5]` scores 12, not 22.
pub fn hand_value(hand: &[Card]) -> u16 {
    let mut value: u16 = 0;
    let mut aces = 0u16;
    for card in hand {
        value += u16::from(card.blackjack_value());
        if card.rank == crate::cards::Rank::Ace {
            aces += 1;
        }
    }
    while value > 21 && aces > 0 {
        value -= 10;
        aces -= 1;
    }
    value
}

/// Single-seat blackjack round against the house.
///
/// Phase-checked state machine; the dealer plays out through explicit
/// [`dealer_step`](BlackjackRound::dealer_step) calls so the whole round is
/// deterministic under a fixed seed.
///
/// # Examples
///
/// ```
/// use greenfelt_engine::blackjack::{BlackjackPhase, BlackjackRound};
/// use greenfelt_engine::wallet::ChipWallet;
///
/// let mut wallet = ChipWallet::new(100);
/// let mut round = BlackjackRound::new(Some(7));
/// round.deal(10, &mut wallet).unwrap();
/// if round.phase() == BlackjackPhase::PlayerTurn {
///     round.stand().unwrap();
///     let summary = round.play_dealer(&mut wallet).unwrap();
///     println!("outcome: {:?}", summary.outcome);
/// }
/// ```
#[derive(Debug)]
pub struct BlackjackRound {
    deck: Deck,
    phase: BlackjackPhase,
    player_hand: Vec<Card>,
    dealer_hand: Vec<Card>,
    stake: u64,
    settlement: Option<RoundSummary>,
}

impl BlackjackRound {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            deck: Deck::new_with_seed(seed),
            phase: BlackjackPhase::Betting,
            player_hand: Vec::with_capacity(8),
            dealer_hand: Vec::with_capacity(8),
            stake: 0,
            settlement: None,
        }
    }

    pub fn phase(&self) -> BlackjackPhase {
        self.phase
    }

    pub fn stake(&self) -> u64 {
        self.stake
    }

    pub fn player_hand(&self) -> &[Card] {
        &self.player_hand
    }

    pub fn dealer_hand(&self) -> &[Card] {
        &self.dealer_hand
    }

    /// Dealer cards a player is allowed to see: only the upcard while the
    /// player is still acting, the full hand once the dealer plays.
    pub fn visible_dealer_cards(&self) -> &[Card] {
        match self.phase {
            BlackjackPhase::PlayerTurn => &self.dealer_hand[..self.dealer_hand.len().min(1)],
            _ => &self.dealer_hand,
        }
    }

    pub fn player_value(&self) -> u16 {
        hand_value(&self.player_hand)
    }

    pub fn dealer_value(&self) -> u16 {
        hand_value(&self.dealer_hand)
    }

    pub fn settlement(&self) -> Option<RoundSummary> {
        self.settlement
    }

    /// Debits the stake and deals player/dealer/player/dealer from a fresh
    /// shuffle. Naturals settle immediately: a two-card 21 pays 2.5x unless
    /// the dealer also holds 21 (push).
    pub fn deal(&mut self, stake: u64, wallet: &mut dyn Wallet) -> Result<(), GameError> {
        if self.phase != BlackjackPhase::Betting {
            return Err(GameError::RoundInProgress);
        }
        if stake == 0 {
            return Err(GameError::InvalidStake { stake });
        }
        wallet.debit(stake)?;
        self.stake = stake;
        self.settlement = None;
        self.player_hand.clear();
        self.dealer_hand.clear();
        self.deck.shuffle();
        for _ in 0..2 {
            let p = self.draw()?;
            self.player_hand.push(p);
            let d = self.draw()?;
            self.dealer_hand.push(d);
        }
        let player = hand_value(&self.player_hand);
        let dealer = hand_value(&self.dealer_hand);
        if player == 21 {
            if dealer == 21 {
                self.settle(Outcome::Push, self.stake, wallet)?;
            } else {
                self.settle(Outcome::Win, self.stake * 5 / 2, wallet)?;
            }
        } else {
            self.phase = BlackjackPhase::PlayerTurn;
        }
        Ok(())
    }

    /// Deals one card to the player. Busting over 21 settles the round as a
    /// loss on the spot.
    pub fn hit(&mut self, wallet: &mut dyn Wallet) -> Result<Card, GameError> {
        if self.phase != BlackjackPhase::PlayerTurn {
            return Err(GameError::NoRoundInProgress);
        }
        let card = self.draw()?;
        self.player_hand.push(card);
        if hand_value(&self.player_hand) > 21 {
            self.settle(Outcome::Lose, 0, wallet)?;
        }
        Ok(card)
    }

    /// Ends the player's turn; the hole card is revealed and the dealer
    /// takes over.
    pub fn stand(&mut self) -> Result<(), GameError> {
        if self.phase != BlackjackPhase::PlayerTurn {
            return Err(GameError::NoRoundInProgress);
        }
        self.phase = BlackjackPhase::DealerTurn;
        Ok(())
    }

    /// One dealer step: draws while the dealer's value is under 17,
    /// otherwise compares hands and settles. Dealer bust or a higher player
    /// hand pays 2x; a higher dealer hand loses; a tie pushes.
    pub fn dealer_step(&mut self, wallet: &mut dyn Wallet) -> Result<DealerStep, GameError> {
        if self.phase != BlackjackPhase::DealerTurn {
            return Err(GameError::NoRoundInProgress);
        }
        if hand_value(&self.dealer_hand) < 17 {
            let card = self.draw()?;
            self.dealer_hand.push(card);
            return Ok(DealerStep::Drew(card));
        }
        let player = hand_value(&self.player_hand);
        let dealer = hand_value(&self.dealer_hand);
        let summary = if dealer > 21 || player > dealer {
            self.settle(Outcome::Win, self.stake * 2, wallet)?
        } else if player < dealer {
            self.settle(Outcome::Lose, 0, wallet)?
        } else {
            self.settle(Outcome::Push, self.stake, wallet)?
        };
        Ok(DealerStep::Settled(summary))
    }

    /// Runs the dealer to completion and returns the settlement.
    pub fn play_dealer(&mut self, wallet: &mut dyn Wallet) -> Result<RoundSummary, GameError> {
        loop {
            if let DealerStep::Settled(summary) = self.dealer_step(wallet)? {
                return Ok(summary);
            }
        }
    }

    /// Clears the table for the next round. Only legal between rounds; a
    /// live round must settle first so the debit/credit pairing holds.
    pub fn reset(&mut self) -> Result<(), GameError> {
        match self.phase {
            BlackjackPhase::PlayerTurn | BlackjackPhase::DealerTurn => {
                Err(GameError::RoundInProgress)
            }
            BlackjackPhase::Betting | BlackjackPhase::Finished => {
                self.phase = BlackjackPhase::Betting;
                self.player_hand.clear();
                self.dealer_hand.clear();
                self.stake = 0;
                self.settlement = None;
                Ok(())
            }
        }
    }

    fn draw(&mut self) -> Result<Card, GameError> {
        self.deck.deal_card().ok_or(GameError::DeckExhausted)
    }

    fn settle(
        &mut self,
        outcome: Outcome,
        payout: u64,
        wallet: &mut dyn Wallet,
    ) -> Result<RoundSummary, GameError> {
        wallet.credit(payout)?;
        let summary = RoundSummary {
            game: GameKind::Blackjack,
            stake: self.stake,
            outcome,
            payout,
        };
        self.settlement = Some(summary);
        self.phase = BlackjackPhase::Finished;
        Ok(summary)
    }
}
