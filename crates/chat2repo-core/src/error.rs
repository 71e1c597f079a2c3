//! Error types for the chat2repo client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Text shown when the backend fails without a usable `detail`.
pub const GENERIC_FAILURE: &str = "Request failed";

/// A shared error type for the whole client.
///
/// Variants follow the failure taxonomy of the widget: local validation,
/// transport/backend failures on a chat call, and everything the session
/// operations swallow after logging.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatError {
    /// Input rejected before any network call was attempted
    #[error("{0}")]
    Validation(String),

    /// A mode name outside the closed set of modes
    #[error("Unknown mode: '{0}'")]
    UnknownMode(String),

    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Transport(String),

    /// The request exceeded its deadline
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The request was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,

    /// The backend answered with a non-success status
    #[error("{detail}")]
    Api { status: u16, detail: String },

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },
}

impl ChatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates an Api error, falling back to the generic text for a blank detail
    pub fn api(status: u16, detail: Option<String>) -> Self {
        let detail = detail
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        Self::Api { status, detail }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this error was raised locally, before any network call
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnknownMode(_))
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if the backend reported that the entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// The sentence appended to the conversation when a chat call fails.
    pub fn user_message(&self) -> String {
        format!("Sorry, something went wrong while handling your request: {self}")
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<toml::de::Error> for ChatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A type alias for `Result<T, ChatError>`.
pub type Result<T> = std::result::Result<T, ChatError>;
