//! Result and error types for Warden.

use thiserror::Error;

/// Result type for Warden operations
pub type WardenResult<T> = Result<T, WardenError>;

/// Errors that can occur in Warden
#[derive(Debug, Error)]
pub enum WardenError {
    /// No free identity left in the user pool
    #[error("User pool exhausted: all {total} users are in use (requested by {worker})")]
    PoolExhausted {
        /// Worker that asked for a user
        worker: String,
        /// Configured pool size
        total: usize,
    },

    /// A tracked resource could not be deleted after all retries
    #[error("Cleanup of {kind} '{id}' failed after {attempts} attempts: {message}")]
    CleanupDeleteFailed {
        /// Resource kind
        kind: String,
        /// Resource identifier
        id: String,
        /// Attempts made
        attempts: u32,
        /// Last error message
        message: String,
    },

    /// Response did not match its contract
    #[error("{0}")]
    ContractValidationFailed(#[from] crate::contract::ContractViolation),

    /// Contract schema itself is not a valid JSON Schema
    #[error("Invalid schema for contract '{contract}': {message}")]
    InvalidSchema {
        /// Contract name
        contract: String,
        /// Error message
        message: String,
    },

    /// API answered with a non-success status
    #[error("API error {status} for {verb} {path}: {body}")]
    Api {
        /// HTTP verb
        verb: String,
        /// Request path
        path: String,
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Transport-level HTTP failure
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message
        message: String,
    },

    /// Browser-driven deletion failed
    #[error("UI deletion failed: {message}")]
    UiDeletion {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WardenError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a UI deletion error
    #[must_use]
    pub fn ui(message: impl Into<String>) -> Self {
        Self::UiDeletion {
            message: message.into(),
        }
    }

    /// Create a transport error
    #[must_use]
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for WardenError {
    fn from(err: reqwest::Error) -> Self {
        Self::http(err.to_string())
    }
}
