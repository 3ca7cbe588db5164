//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Data failed its contract
    #[error("Contract check failed: {message}")]
    ContractFailed {
        /// Error message
        message: String,
    },

    /// Some ledger resources could not be deleted
    #[error("{failed} resource(s) could not be cleaned up")]
    CleanupIncomplete {
        /// Number of failures
        failed: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Warden library error
    #[error("{0}")]
    Warden(#[from] warden::WardenError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a contract failure
    #[must_use]
    pub fn contract_failed(message: impl Into<String>) -> Self {
        Self::ContractFailed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad size");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad size"));
    }

    #[test]
    fn test_cleanup_incomplete() {
        let err = CliError::CleanupIncomplete { failed: 2 };
        assert_eq!(err.to_string(), "2 resource(s) could not be cleaned up");
    }

    #[test]
    fn test_warden_error_from() {
        let err: CliError = warden::WardenError::config("x").into();
        assert!(err.to_string().contains("Configuration error: x"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
