//! Error types for CISEval
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for CISEval operations
///
/// This enum encompasses all possible errors that can occur during
/// authentication, session management, API calls, evaluation submission,
/// and configuration loading.
#[derive(Error, Debug)]
pub enum CisError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Login rejected or the auth endpoint was unreachable
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The session token aged out or the server returned 401
    #[error("Session expired")]
    SessionExpired,

    /// Local precondition failure before a network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Server-side or transport-level failure on a data fetch
    #[error("API error: {0}")]
    Api(String),

    /// Fetch aborted because the consuming view was torn down
    #[error("Request cancelled")]
    Cancelled,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl CisError {
    /// Returns `true` when the error represents an expired or rejected
    /// session (forced logout, never surfaced as a raw error).
    pub fn is_session_expired(&self) -> bool {
        matches!(self, CisError::SessionExpired)
    }

    /// Returns `true` when the error is a silent cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CisError::Cancelled)
    }
}

/// Result type alias for CISEval operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
