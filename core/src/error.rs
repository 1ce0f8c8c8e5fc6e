//! Structured error types for Itinera
//!
//! One error enum for the whole session core, with helpers the CLI uses to
//! decide how to report a failure.

use thiserror::Error;

/// Primary error type for Itinera operations
#[derive(Error, Debug)]
pub enum ItineraError {
    // =========================================================================
    // Input Errors
    // =========================================================================
    /// A caller-supplied field failed validation before any connection attempt
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    // =========================================================================
    // Connection Errors
    // =========================================================================
    /// Connecting (or the start handshake) failed
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    /// The server went away mid-session
    #[error("stream disconnected: {reason}")]
    StreamDisconnected { reason: String },

    /// WebSocket protocol violation
    #[error("protocol error: {message}")]
    Protocol { message: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    // =========================================================================
    // External Error Wrappers
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl ItineraError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Check if error is retryable (transient)
    ///
    /// Sessions are never reconnected automatically, so connection errors
    /// count as final here; a fresh `start` is the only way back.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Io(io_err) => matches!(
                io_err.kind(),
                std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock
            ),
            Self::Validation { .. }
            | Self::ConnectionFailed { .. }
            | Self::StreamDisconnected { .. }
            | Self::Protocol { .. }
            | Self::InvalidConfig { .. }
            | Self::Json(_)
            | Self::TomlParse(_)
            | Self::TomlSerialize(_) => false,
        }
    }

    /// Check if error requires user action
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::InvalidConfig { .. } | Self::TomlParse(_)
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { field, .. } => {
                format!("Please provide a {}.", field)
            }
            Self::ConnectionFailed { .. } => {
                "Could not reach the itinerary server. Check the server URL and try again.".to_string()
            }
            Self::StreamDisconnected { .. } | Self::Protocol { .. } => {
                "The connection to the itinerary server was lost. Start a new session to try again."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias using ItineraError
pub type Result<T> = std::result::Result<T, ItineraError>;
