//! Error types for sql-desk.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for sql-desk operations.
#[derive(Error, Debug)]
pub enum DeskError {
    /// Local input errors (blank submission, unknown schema, etc.)
    /// These never reach the network.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend call failures (network failure, non-success status,
    /// malformed response). Recoverable; the session surfaces them and
    /// the user can retry with a fresh submit.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration errors (invalid config file, bad endpoint URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeskError {
    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::Transport(_) => "Transport Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true if this error came from a backend call rather than
    /// local validation.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result type alias using DeskError.
pub type Result<T> = std::result::Result<T, DeskError>;
