//! Error types for the token sweeper

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the token sweeper
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Network errors (indexer, price API, RPC)
    #[error("Network error: {0}")]
    Network(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    // Validation errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Wallet errors
    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("Delegation authorization unsupported: {0}")]
    AuthorizationUnsupported(String),

    /// Wallet rejection or send failure; the message is shown to the user as-is
    #[error("{0}")]
    Submission(String),

    // Serialization errors
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Check if this error came from a failed fetch (load-level failures)
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Rpc(_) | Error::Deserialization(_)
        )
    }

    /// Check if this error blocked a submission before any wallet call
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
