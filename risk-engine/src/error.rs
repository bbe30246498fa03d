//! Error types for risk engine

use thiserror::Error;

/// Intent field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Chain identifier is empty or malformed
    #[error("malformed chain identifier: {0:?}")]
    Chain(String),

    /// Address is empty or malformed
    #[error("malformed address: {0:?}")]
    Address(String),

    /// Amount is zero or negative
    #[error("amount must be positive, got {0}")]
    Amount(String),
}

/// Risk engine error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Intent rejected before evaluation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// List kind outside {BLACKLIST, WHITELIST}
    #[error("Invalid list kind: {0:?} (expected BLACKLIST or WHITELIST)")]
    InvalidListKind(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True when the error came from intent validation
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
