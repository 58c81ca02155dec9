//! Card, reel, and table formatters for terminal display.
//!
//! This module provides pure functions for formatting casino game elements
//! (cards, slot reels, roulette pockets, poker actions) for terminal output.
//! It supports Unicode symbols with ASCII fallback for terminal environments
//! that don't support Unicode rendering.
//!
//! ## Unicode vs ASCII Fallback
//!
//! The module automatically detects whether the terminal supports Unicode
//! symbols by checking environment variables on Windows (WT_SESSION, TERM_PROGRAM,
//! VSCODE_INJECTION) and assumes Unicode support on Unix-like systems.
//!
//! - **Unicode mode**: Uses ♥ ♦ ♣ ♠ symbols and emoji slot reels
//! - **ASCII mode**: Uses h d c s letters and symbol names
//!
//! ## Example
//!
//! ```rust
//! use greenfelt_engine::cards::{Card, Rank, Suit};
//! use greenfelt_cli::formatters::{format_card, format_board};
//!
//! let ace_spades = Card { rank: Rank::Ace, suit: Suit::Spades };
//! assert!(format_card(&ace_spades) == "A♠" || format_card(&ace_spades) == "As");
//!
//! let board = vec![ace_spades];
//! assert!(format_board(&board).starts_with("[A"));
//! ```

use greenfelt_engine::cards::{Card, Rank, Suit};
use greenfelt_engine::history::Outcome;
use greenfelt_engine::poker::PokerAction;
use greenfelt_engine::roulette::{BetKind, PocketColor};
use greenfelt_engine::slots::Symbol;

/// Check if the terminal supports Unicode symbols by detecting modern terminal environments.
///
/// On Windows, checks for Windows Terminal (WT_SESSION), modern terminals (TERM_PROGRAM),
/// or VS Code (VSCODE_INJECTION). On Unix-like systems, assumes Unicode support.
///
/// # Returns
///
/// `true` if Unicode symbols are supported, `false` for ASCII fallback
pub fn supports_unicode() -> bool {
    if cfg!(windows) {
        std::env::var("WT_SESSION").is_ok()
            || std::env::var("TERM_PROGRAM").is_ok()
            || std::env::var("VSCODE_INJECTION").is_ok()
    } else {
        true
    }
}

/// Format a Suit as a string using Unicode symbols with ASCII fallback.
///
/// # Unicode symbols
/// - Hearts: ♥
/// - Diamonds: ♦
/// - Clubs: ♣
/// - Spades: ♠
///
/// # ASCII fallback
/// - Hearts: h
/// - Diamonds: d
/// - Clubs: c
/// - Spades: s
pub fn format_suit(suit: &Suit) -> String {
    if supports_unicode() {
        match suit {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
        .to_string()
    } else {
        match suit {
            Suit::Hearts => "h",
            Suit::Diamonds => "d",
            Suit::Clubs => "c",
            Suit::Spades => "s",
        }
        .to_string()
    }
}

/// Format a Rank as a string (2-9, T, J, Q, K, A).
pub fn format_rank(rank: &Rank) -> String {
    match rank {
        Rank::Two => "2",
        Rank::Three => "3",
        Rank::Four => "4",
        Rank::Five => "5",
        Rank::Six => "6",
        Rank::Seven => "7",
        Rank::Eight => "8",
        Rank::Nine => "9",
        Rank::Ten => "T",
        Rank::Jack => "J",
        Rank::Queen => "Q",
        Rank::King => "K",
        Rank::Ace => "A",
    }
    .to_string()
}

/// Format a Card as a string combining rank and suit.
///
/// # Example
///
/// ```rust
/// use greenfelt_engine::cards::{Card, Rank, Suit};
/// # use greenfelt_cli::formatters::format_card;
///
/// let ace_spades = Card { rank: Rank::Ace, suit: Suit::Spades };
/// let formatted = format_card(&ace_spades);
/// assert!(formatted == "A♠" || formatted == "As");
/// ```
pub fn format_card(card: &Card) -> String {
    format!("{}{}", format_rank(&card.rank), format_suit(&card.suit))
}

/// Format a list of cards as a string in bracket notation.
///
/// Used for blackjack hands and the poker community board alike.
///
/// # Example
///
/// ```rust
/// use greenfelt_engine::cards::{Card, Rank, Suit};
/// # use greenfelt_cli::formatters::format_board;
///
/// let flop = vec![
///     Card { rank: Rank::Ace, suit: Suit::Spades },
///     Card { rank: Rank::King, suit: Suit::Hearts },
///     Card { rank: Rank::Queen, suit: Suit::Diamonds },
/// ];
/// let formatted = format_board(&flop);
/// assert!(formatted.starts_with("[A"));
/// assert!(formatted.ends_with("]"));
/// ```
pub fn format_board(cards: &[Card]) -> String {
    if cards.is_empty() {
        "[]".to_string()
    } else {
        let formatted_cards: Vec<String> = cards.iter().map(format_card).collect();
        format!("[{}]", formatted_cards.join(" "))
    }
}

/// Format a slot symbol, falling back to its name where emoji won't render.
pub fn format_symbol(symbol: &Symbol) -> String {
    if supports_unicode() {
        symbol.glyph().to_string()
    } else {
        match symbol {
            Symbol::Cherry => "cherry",
            Symbol::Lemon => "lemon",
            Symbol::Orange => "orange",
            Symbol::Grape => "grape",
            Symbol::Bell => "bell",
            Symbol::Star => "star",
            Symbol::Seven => "seven",
            Symbol::Diamond => "diamond",
        }
        .to_string()
    }
}

/// Format a slots payline in bracket notation, e.g. "[🍒 🍒 🔔]".
pub fn format_reels(reels: &[Symbol; 3]) -> String {
    let formatted: Vec<String> = reels.iter().map(format_symbol).collect();
    format!("[{}]", formatted.join(" "))
}

/// Format a roulette pocket with its color, e.g. "14 (red)" or "0 (green)".
pub fn format_pocket(pocket: u8, color: PocketColor) -> String {
    let color_name = match color {
        PocketColor::Red => "red",
        PocketColor::Black => "black",
        PocketColor::Green => "green",
    };
    format!("{} ({})", pocket, color_name)
}

/// Format a roulette bet kind as the word a player would say at the table.
pub fn format_bet_kind(kind: &BetKind) -> String {
    match kind {
        BetKind::Straight { number } => format!("straight {}", number),
        BetKind::Red => "red".to_string(),
        BetKind::Black => "black".to_string(),
        BetKind::Even => "even".to_string(),
        BetKind::Odd => "odd".to_string(),
    }
}

/// Format a round outcome as an uppercase table call.
pub fn format_outcome(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "WIN",
        Outcome::Lose => "LOSE",
        Outcome::Push => "PUSH",
    }
}

/// Format a PokerAction as a human-readable string.
///
/// # Example
///
/// ```rust
/// use greenfelt_engine::poker::PokerAction;
/// # use greenfelt_cli::formatters::format_action;
///
/// assert_eq!(format_action(&PokerAction::Fold), "fold");
/// assert_eq!(format_action(&PokerAction::Raise(100)), "raise 100");
/// ```
pub fn format_action(action: &PokerAction) -> String {
    match action {
        PokerAction::Fold => "fold".to_string(),
        PokerAction::Call => "call".to_string(),
        PokerAction::Raise(amount) => format!("raise {}", amount),
    }
}
