//! # greenfelt-engine: Casino Round Logic Core
//!
//! Deterministic round state machines for four casino games (blackjack,
//! roulette, slots, simplified Texas Hold'em) over a simulated chip wallet.
//! Every source of randomness is a seeded RNG, every phase transition is an
//! explicit call, and every round debits its stake exactly once and credits
//! its payout exactly once.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and deck construction
//! - [`deck`] - Deterministic deck shuffling with ChaCha20 RNG
//! - [`blackjack`] - Blackjack round machine with stepwise dealer play
//! - [`roulette`] - European roulette table and bet resolution
//! - [`slots`] - Three-reel slot machine and paytable
//! - [`poker`] - Simplified hold'em round against house opponents
//! - [`hand`] - 7-card poker hand evaluation and comparison
//! - [`wallet`] - The debit/credit ledger contract and chip wallet
//! - [`history`] - Capped session history and statistics
//! - [`logger`] - JSONL round-record logging
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use greenfelt_engine::blackjack::{BlackjackPhase, BlackjackRound};
//! use greenfelt_engine::wallet::ChipWallet;
//!
//! let mut wallet = ChipWallet::new(1000);
//! let mut round = BlackjackRound::new(Some(42));
//!
//! round.deal(25, &mut wallet).unwrap();
//! if round.phase() == BlackjackPhase::PlayerTurn {
//!     round.stand().unwrap();
//!     let summary = round.play_dealer(&mut wallet).unwrap();
//!     println!("{:?}: paid {}", summary.outcome, summary.payout);
//! }
//! ```
//!
//! ## Deterministic Gameplay
//!
//! All round outcomes are reproducible using seeded RNG:
//!
//! ```rust
//! use greenfelt_engine::deck::Deck;
//!
//! // Same seed produces same shuffle
//! let deck1 = Deck::new_with_seed(42);
//! let deck2 = Deck::new_with_seed(42);
//! // deck1 and deck2 will have identical card order
//! ```
//!
//! ## The Ledger Contract
//!
//! Round machines never touch a balance directly; they go through the
//! [`wallet::Wallet`] trait, which refuses debits past zero and anything at
//! all while disconnected:
//!
//! ```rust
//! use greenfelt_engine::errors::GameError;
//! use greenfelt_engine::wallet::{ChipWallet, Wallet};
//!
//! let mut wallet = ChipWallet::new(20);
//! assert_eq!(
//!     wallet.debit(50),
//!     Err(GameError::InsufficientBalance { required: 50, available: 20 })
//! );
//! ```

pub mod blackjack;
pub mod cards;
pub mod deck;
pub mod errors;
pub mod hand;
pub mod history;
pub mod logger;
pub mod poker;
pub mod roulette;
pub mod slots;
pub mod wallet;
