//! Error types for the firewall service

use thiserror::Error;

/// Result type for firewall operations
pub type Result<T> = std::result::Result<T, FirewallError>;

/// Firewall errors
#[derive(Error, Debug)]
pub enum FirewallError {
    /// Intent validation, list kind or engine configuration
    #[error(transparent)]
    Engine(#[from] risk_engine::Error),

    /// Unknown request id
    #[error("request_id not found: {0}")]
    NotFound(String),

    /// List store rejected the request
    #[error(transparent)]
    Lists(#[from] list_store::ListStoreError),

    /// Ledger failure other than a missing record
    #[error(transparent)]
    Ledger(ledger_core::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl From<ledger_core::Error> for FirewallError {
    fn from(err: ledger_core::Error) -> Self {
        match err {
            ledger_core::Error::NotFound(id) => FirewallError::NotFound(id),
            other => FirewallError::Ledger(other),
        }
    }
}

impl FirewallError {
    /// Caller sent a malformed intent
    pub fn is_validation(&self) -> bool {
        matches!(self, FirewallError::Engine(e) if e.is_validation())
    }

    /// Caller asked for a request id the ledger does not know
    pub fn is_not_found(&self) -> bool {
        matches!(self, FirewallError::NotFound(_))
    }

    /// Caller named a list kind other than BLACKLIST/WHITELIST
    pub fn is_invalid_list_kind(&self) -> bool {
        matches!(
            self,
            FirewallError::Lists(list_store::ListStoreError::InvalidListKind(_))
                | FirewallError::Engine(risk_engine::Error::InvalidListKind(_))
        )
    }
}
