//! Error types for sqlite-lens.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Main error type for sqlite-lens operations.
#[derive(Error, Debug)]
pub enum LensError {
    /// The sqlite binary could not be launched, or no command is configured.
    #[error("Command error: {0}")]
    Command(String),

    /// A query failed while running (timeout, schema query error, etc.).
    ///
    /// SQL errors reported by the subprocess on stderr are *not* raised as
    /// this variant; they travel inside `QueryResult` so callers can show
    /// partial results alongside the error.
    #[error("Query error: {0}")]
    Query(String),

    /// The subprocess emitted output that violates the expected protocol
    /// (e.g. a header or data line with no preceding statement echo).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration errors (invalid config file, missing query, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (broken pipes, unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LensError {
    /// Creates a command error with the given message.
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a parse error with the given message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
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
            Self::Command(_) => "Command Error",
            Self::Query(_) => "Query Error",
            Self::Parse(_) => "Parse Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using LensError.
pub type Result<T> = std::result::Result<T, LensError>;
