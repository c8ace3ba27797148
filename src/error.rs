//! Error types for range-bar

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid date error
    pub fn invalid_date(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDate {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a navigation error
    pub fn navigation(msg: impl Into<String>) -> Self {
        Self::Navigation(msg.into())
    }

    /// Create an "other" error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
