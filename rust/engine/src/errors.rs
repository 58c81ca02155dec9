use thiserror::Error;

/// Errors produced by the round state machines and the wallet contract.
/// All variants are recoverable input-validation failures; none are fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Wallet is not connected")]
    NotConnected,
    #[error("Insufficient balance: need {required} chips, have {available}")]
    InsufficientBalance { required: u64, available: u64 },
    #[error("Invalid stake: {stake}")]
    InvalidStake { stake: u64 },
    #[error("Invalid pocket number: {pocket} (wheel is 0-36)")]
    InvalidPocket { pocket: u8 },
    #[error("No bets placed")]
    NoBetsPlaced,
    #[error("A round is already in progress")]
    RoundInProgress,
    #[error("No round in progress")]
    NoRoundInProgress,
    #[error("It's not seat {actual}'s turn (expected seat {expected})")]
    NotPlayersTurn { expected: usize, actual: usize },
    #[error("Player already folded")]
    PlayerAlreadyFolded,
    #[error("Deck exhausted")]
    DeckExhausted,
}
