//! Error types for the CLI application.
//!
//! This module defines the error types used throughout the CLI for better
//! error propagation and handling.
//!
//! ## Batch Validation Errors
//!
//! The `BatchValidationError<T>` type provides a reusable pattern for commands
//! that process multiple items and need to collect errors with context. It is
//! used by the verify and stats commands for structured error reporting.

use std::fmt;

/// Custom error type for CLI operations.
///
/// This enum encompasses all error types that can occur during CLI execution,
/// allowing for proper error propagation using the `?` operator.
#[derive(Debug)]
pub enum CliError {
    /// I/O error (file operations, stdout/stderr writes, etc.)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// Error surfaced by a game round or the wallet
    Game(String),

    /// Operation was interrupted (e.g., by user with Ctrl+C)
    Interrupted(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Game(msg) => write!(f, "Game error: {}", msg),
            CliError::Interrupted(msg) => write!(f, "Interrupted: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

// Automatic conversion from std::io::Error to CliError
impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

// Conversion from engine errors (wallet refusals, phase violations)
impl From<greenfelt_engine::errors::GameError> for CliError {
    fn from(error: greenfelt_engine::errors::GameError) -> Self {
        CliError::Game(error.to_string())
    }
}

// Conversion from String to CliError (io_utils helpers report errors as strings)
impl From<String> for CliError {
    fn from(error: String) -> Self {
        CliError::Game(error)
    }
}

// Conversion from &str to CliError (for convenience)
impl From<&str> for CliError {
    fn from(error: &str) -> Self {
        CliError::Game(error.to_string())
    }
}

/// Generic error type for batch validation operations.
///
/// Used by commands that process multiple items and need to collect errors
/// with context for user-friendly error reporting. Each error tracks the item
/// that failed and a descriptive error message.
///
/// # Type Parameters
///
/// * `T` - Context type identifying the failed item (e.g., `usize` for index,
///   `String` for file path, etc.). Must implement `Display` for error formatting.
///
/// # Examples
///
/// ```rust
/// use greenfelt_cli::BatchValidationError;
///
/// // Round validation error (by line index)
/// let error = BatchValidationError {
///     item_context: 5,
///     message: "Invalid round state".to_string(),
/// };
/// assert_eq!(error.to_string(), "5: Invalid round state");
///
/// // File validation error (by path)
/// let error = BatchValidationError {
///     item_context: "rounds.jsonl".to_string(),
///     message: "Corrupted file".to_string(),
/// };
/// assert_eq!(error.to_string(), "rounds.jsonl: Corrupted file");
/// ```
#[derive(Debug)]
pub struct BatchValidationError<T> {
    /// Context identifying the item that failed validation
    pub item_context: T,
    /// Descriptive error message
    pub message: String,
}

impl<T: std::fmt::Display> std::fmt::Display for BatchValidationError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_context, self.message)
    }
}
