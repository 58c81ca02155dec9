//! Input parsing and validation for interactive commands.
//!
//! This module provides functions for parsing and validating user input in
//! the interactive `play` command. It handles:
//! - Lobby navigation (choosing a table, balance, history, quitting)
//! - Stake entry with a default amount
//! - Per-table actions (blackjack, roulette, poker)
//!
//! ## Error Handling
//!
//! Each parser returns a small enum with an `Invalid(String)` variant so the
//! caller can re-prompt with a clear message instead of exiting.

use greenfelt_engine::poker::PokerAction;
use greenfelt_engine::roulette::BetKind;

/// A choice made at the casino lobby prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyChoice {
    Blackjack,
    Roulette,
    Slots,
    Poker,
    Balance,
    History,
    Stats,
    Quit,
}

/// Parse a lobby prompt line into a [`LobbyChoice`].
///
/// Accepts full names and single-letter shortcuts (case-insensitive):
/// `b`/`blackjack`, `r`/`roulette`, `s`/`slots`, `p`/`poker`,
/// `balance`, `history`, `stats`, `q`/`quit`.
///
/// # Example
///
/// ```rust
/// # use greenfelt_cli::validation::{parse_lobby_choice, LobbyChoice};
/// assert_eq!(parse_lobby_choice("blackjack"), Ok(LobbyChoice::Blackjack));
/// assert_eq!(parse_lobby_choice("  Q "), Ok(LobbyChoice::Quit));
/// assert!(parse_lobby_choice("craps").is_err());
/// ```
pub fn parse_lobby_choice(input: &str) -> Result<LobbyChoice, String> {
    match input.trim().to_lowercase().as_str() {
        "b" | "bj" | "blackjack" => Ok(LobbyChoice::Blackjack),
        "r" | "roulette" => Ok(LobbyChoice::Roulette),
        "s" | "slots" => Ok(LobbyChoice::Slots),
        "p" | "poker" => Ok(LobbyChoice::Poker),
        "balance" => Ok(LobbyChoice::Balance),
        "history" => Ok(LobbyChoice::History),
        "stats" => Ok(LobbyChoice::Stats),
        "q" | "quit" => Ok(LobbyChoice::Quit),
        "" => Err("Empty input".to_string()),
        other => Err(format!(
            "Unrecognized choice '{}'. Valid choices: blackjack, roulette, slots, poker, balance, history, stats, q",
            other
        )),
    }
}

/// Result of parsing a stake prompt line.
#[derive(Debug, PartialEq, Eq)]
pub enum StakeParse {
    /// A stake amount, either typed or the default on an empty line
    Amount(u64),
    /// Return to the lobby (back/b)
    Back,
    /// Leave the casino entirely (q/quit)
    Quit,
    /// Invalid input with error message
    Invalid(String),
}

/// Parse a stake entry, substituting `default` for an empty line.
///
/// # Example
///
/// ```rust
/// # use greenfelt_cli::validation::{parse_stake, StakeParse};
/// assert_eq!(parse_stake("25", 10), StakeParse::Amount(25));
/// assert_eq!(parse_stake("", 10), StakeParse::Amount(10));
/// assert_eq!(parse_stake("back", 10), StakeParse::Back);
/// ```
pub fn parse_stake(input: &str, default: u64) -> StakeParse {
    let input = input.trim();
    if input.is_empty() {
        return StakeParse::Amount(default);
    }
    match input.to_lowercase().as_str() {
        "b" | "back" => return StakeParse::Back,
        "q" | "quit" => return StakeParse::Quit,
        _ => {}
    }
    match input.parse::<u64>() {
        Ok(amount) if amount > 0 => StakeParse::Amount(amount),
        Ok(_) => StakeParse::Invalid("Stake must be positive".to_string()),
        Err(_) => StakeParse::Invalid(format!("Invalid stake '{}'", input)),
    }
}

/// Result of parsing a blackjack table action.
#[derive(Debug, PartialEq, Eq)]
pub enum BlackjackParse {
    Hit,
    Stand,
    Quit,
    Invalid(String),
}

/// Parse a blackjack action: `h`/`hit`, `s`/`stand`, `q`/`quit`.
pub fn parse_blackjack_action(input: &str) -> BlackjackParse {
    match input.trim().to_lowercase().as_str() {
        "h" | "hit" => BlackjackParse::Hit,
        "s" | "stand" => BlackjackParse::Stand,
        "q" | "quit" => BlackjackParse::Quit,
        "" => BlackjackParse::Invalid("Empty input".to_string()),
        other => BlackjackParse::Invalid(format!(
            "Unrecognized action '{}'. Valid actions: hit, stand, q",
            other
        )),
    }
}

/// Result of parsing a roulette table line.
#[derive(Debug, PartialEq, Eq)]
pub enum RouletteParse {
    /// Place (or top up) a bet of this kind and amount
    Bet { kind: BetKind, amount: u64 },
    /// Spin the wheel with the bets on the felt
    Spin,
    /// Take all bets off the felt
    Clear,
    /// Return to the lobby
    Back,
    /// Leave the casino entirely
    Quit,
    /// Invalid input with error message
    Invalid(String),
}

/// Parse a roulette table line.
///
/// Accepts the following input formats (case-insensitive):
/// - "red X" / "black X" / "even X" / "odd X" → color and parity bets
/// - "straight N X" or bare "N X" → straight bet on pocket N
/// - "spin" → spin the wheel
/// - "clear" → clear the layout
/// - "b" or "back" → back to the lobby
/// - "q" or "quit" → quit
///
/// # Example
///
/// ```rust
/// # use greenfelt_cli::validation::{parse_roulette_input, RouletteParse};
/// use greenfelt_engine::roulette::BetKind;
///
/// assert_eq!(
///     parse_roulette_input("red 5"),
///     RouletteParse::Bet { kind: BetKind::Red, amount: 5 }
/// );
/// assert_eq!(
///     parse_roulette_input("14 5"),
///     RouletteParse::Bet { kind: BetKind::Straight { number: 14 }, amount: 5 }
/// );
/// assert_eq!(parse_roulette_input("spin"), RouletteParse::Spin);
/// ```
pub fn parse_roulette_input(input: &str) -> RouletteParse {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();

    if parts.is_empty() {
        return RouletteParse::Invalid("Empty input".to_string());
    }

    match parts[0] {
        "q" | "quit" => return RouletteParse::Quit,
        "b" | "back" => return RouletteParse::Back,
        "spin" => return RouletteParse::Spin,
        "clear" => return RouletteParse::Clear,
        _ => {}
    }

    let kind = match parts[0] {
        "red" => Some(BetKind::Red),
        "black" => Some(BetKind::Black),
        "even" => Some(BetKind::Even),
        "odd" => Some(BetKind::Odd),
        _ => None,
    };

    if let Some(kind) = kind {
        if parts.len() < 2 {
            return RouletteParse::Invalid(format!(
                "{} requires an amount (e.g., '{} 5')",
                parts[0], parts[0]
            ));
        }
        return match parts[1].parse::<u64>() {
            Ok(amount) if amount > 0 => RouletteParse::Bet { kind, amount },
            Ok(_) => RouletteParse::Invalid("Bet amount must be positive".to_string()),
            Err(_) => RouletteParse::Invalid(format!("Invalid bet amount '{}'", parts[1])),
        };
    }

    // "straight N X" or bare "N X"
    let (number_str, amount_str) = if parts[0] == "straight" {
        if parts.len() < 3 {
            return RouletteParse::Invalid(
                "straight requires a pocket and an amount (e.g., 'straight 14 5')".to_string(),
            );
        }
        (parts[1], parts[2])
    } else {
        if parts.len() < 2 {
            return RouletteParse::Invalid(format!(
                "Unrecognized bet '{}'. Valid bets: red, black, even, odd, straight <pocket>, or '<pocket> <amount>'",
                parts[0]
            ));
        }
        (parts[0], parts[1])
    };

    let number = match number_str.parse::<u8>() {
        Ok(n) if n <= 36 => n,
        Ok(n) => {
            return RouletteParse::Invalid(format!("Pocket {} is off the wheel (0-36)", n));
        }
        Err(_) => {
            return RouletteParse::Invalid(format!("Invalid pocket '{}'", number_str));
        }
    };
    match amount_str.parse::<u64>() {
        Ok(amount) if amount > 0 => RouletteParse::Bet {
            kind: BetKind::Straight { number },
            amount,
        },
        Ok(_) => RouletteParse::Invalid("Bet amount must be positive".to_string()),
        Err(_) => RouletteParse::Invalid(format!("Invalid bet amount '{}'", amount_str)),
    }
}

/// Result of parsing a poker table action.
#[derive(Debug, PartialEq)]
pub enum PokerParse {
    /// Valid player action parsed from input
    Action(PokerAction),
    /// User entered quit command (q or quit)
    Quit,
    /// Invalid input with error message
    Invalid(String),
}

/// Parse user input string into a PokerAction or special commands.
///
/// Accepts the following input formats (case-insensitive):
/// - "f" or "fold" → Fold
/// - "c" or "call" or "check" → Call (calling nothing is a check)
/// - "raise X" or "r X" → Raise by amount X
/// - "q" or "quit" → Quit command
///
/// # Example
///
/// ```rust
/// # use greenfelt_cli::validation::{parse_poker_action, PokerParse};
/// use greenfelt_engine::poker::PokerAction;
///
/// assert_eq!(
///     parse_poker_action("fold"),
///     PokerParse::Action(PokerAction::Fold)
/// );
/// assert_eq!(
///     parse_poker_action("raise 50"),
///     PokerParse::Action(PokerAction::Raise(50))
/// );
/// assert_eq!(parse_poker_action("q"), PokerParse::Quit);
/// ```
pub fn parse_poker_action(input: &str) -> PokerParse {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();

    if parts.is_empty() {
        return PokerParse::Invalid("Empty input".to_string());
    }

    // Check for quit commands first
    if parts[0] == "q" || parts[0] == "quit" {
        return PokerParse::Quit;
    }

    match parts[0] {
        "fold" | "f" => PokerParse::Action(PokerAction::Fold),
        "call" | "check" | "c" => PokerParse::Action(PokerAction::Call),
        "raise" | "r" => {
            if parts.len() < 2 {
                return PokerParse::Invalid(
                    "Raise requires an amount (e.g., 'raise 50')".to_string(),
                );
            }
            match parts[1].parse::<u64>() {
                Ok(amount) if amount > 0 => PokerParse::Action(PokerAction::Raise(amount)),
                Ok(_) => PokerParse::Invalid("Raise amount must be positive".to_string()),
                Err(_) => PokerParse::Invalid("Invalid raise amount".to_string()),
            }
        }
        _ => PokerParse::Invalid(format!(
            "Unrecognized action '{}'. Valid actions: fold, call, raise <amount>, q",
            parts[0]
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lobby_choice_accepts_shortcuts() {
        assert_eq!(parse_lobby_choice("b"), Ok(LobbyChoice::Blackjack));
        assert_eq!(parse_lobby_choice("r"), Ok(LobbyChoice::Roulette));
        assert_eq!(parse_lobby_choice("s"), Ok(LobbyChoice::Slots));
        assert_eq!(parse_lobby_choice("p"), Ok(LobbyChoice::Poker));
        assert_eq!(parse_lobby_choice("q"), Ok(LobbyChoice::Quit));
    }

    #[test]
    fn test_parse_lobby_choice_case_insensitive() {
        assert_eq!(parse_lobby_choice("BLACKJACK"), Ok(LobbyChoice::Blackjack));
        assert_eq!(parse_lobby_choice("Stats"), Ok(LobbyChoice::Stats));
    }

    #[test]
    fn test_parse_lobby_choice_rejects_unknown_game() {
        let result = parse_lobby_choice("craps");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("craps"));
    }

    #[test]
    fn test_parse_stake_empty_uses_default() {
        assert_eq!(parse_stake("", 10), StakeParse::Amount(10));
        assert_eq!(parse_stake("   ", 25), StakeParse::Amount(25));
    }

    #[test]
    fn test_parse_stake_rejects_zero_and_garbage() {
        assert_eq!(
            parse_stake("0", 10),
            StakeParse::Invalid("Stake must be positive".to_string())
        );
        assert!(matches!(parse_stake("ten", 10), StakeParse::Invalid(_)));
        assert!(matches!(parse_stake("-5", 10), StakeParse::Invalid(_)));
    }

    #[test]
    fn test_parse_stake_back_and_quit() {
        assert_eq!(parse_stake("back", 10), StakeParse::Back);
        assert_eq!(parse_stake("q", 10), StakeParse::Quit);
    }

    #[test]
    fn test_parse_blackjack_action() {
        assert_eq!(parse_blackjack_action("hit"), BlackjackParse::Hit);
        assert_eq!(parse_blackjack_action("h"), BlackjackParse::Hit);
        assert_eq!(parse_blackjack_action("STAND"), BlackjackParse::Stand);
        assert_eq!(parse_blackjack_action("q"), BlackjackParse::Quit);
        assert!(matches!(
            parse_blackjack_action("double"),
            BlackjackParse::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_roulette_color_bets() {
        assert_eq!(
            parse_roulette_input("red 5"),
            RouletteParse::Bet {
                kind: BetKind::Red,
                amount: 5
            }
        );
        assert_eq!(
            parse_roulette_input("ODD 12"),
            RouletteParse::Bet {
                kind: BetKind::Odd,
                amount: 12
            }
        );
    }

    #[test]
    fn test_parse_roulette_straight_bets() {
        assert_eq!(
            parse_roulette_input("straight 14 5"),
            RouletteParse::Bet {
                kind: BetKind::Straight { number: 14 },
                amount: 5
            }
        );
        assert_eq!(
            parse_roulette_input("0 3"),
            RouletteParse::Bet {
                kind: BetKind::Straight { number: 0 },
                amount: 3
            }
        );
    }

    #[test]
    fn test_parse_roulette_rejects_pocket_off_the_wheel() {
        match parse_roulette_input("37 5") {
            RouletteParse::Invalid(msg) => assert!(msg.contains("37")),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_roulette_table_verbs() {
        assert_eq!(parse_roulette_input("spin"), RouletteParse::Spin);
        assert_eq!(parse_roulette_input("clear"), RouletteParse::Clear);
        assert_eq!(parse_roulette_input("back"), RouletteParse::Back);
        assert_eq!(parse_roulette_input("quit"), RouletteParse::Quit);
    }

    #[test]
    fn test_parse_roulette_requires_amounts() {
        assert!(matches!(
            parse_roulette_input("red"),
            RouletteParse::Invalid(_)
        ));
        assert!(matches!(
            parse_roulette_input("straight 14"),
            RouletteParse::Invalid(_)
        ));
        assert!(matches!(
            parse_roulette_input("red 0"),
            RouletteParse::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_poker_action() {
        assert_eq!(
            parse_poker_action("fold"),
            PokerParse::Action(PokerAction::Fold)
        );
        assert_eq!(
            parse_poker_action("c"),
            PokerParse::Action(PokerAction::Call)
        );
        assert_eq!(
            parse_poker_action("raise 50"),
            PokerParse::Action(PokerAction::Raise(50))
        );
        assert_eq!(parse_poker_action("quit"), PokerParse::Quit);
    }

    #[test]
    fn test_parse_poker_action_rejects_bad_raises() {
        assert!(matches!(parse_poker_action("raise"), PokerParse::Invalid(_)));
        assert!(matches!(
            parse_poker_action("raise 0"),
            PokerParse::Invalid(_)
        ));
        assert!(matches!(
            parse_poker_action("raise ten"),
            PokerParse::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_poker_action_rejects_unknown() {
        match parse_poker_action("bluff") {
            PokerParse::Invalid(msg) => assert!(msg.contains("bluff")),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }
}
