use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListStoreError {
    #[error("Invalid list kind: {0:?} (expected BLACKLIST or WHITELIST)")]
    InvalidListKind(String),

    #[error("Invalid list entry: {0}")]
    InvalidEntry(String),

    #[error("List journal error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<risk_engine::Error> for ListStoreError {
    fn from(err: risk_engine::Error) -> Self {
        match err {
            risk_engine::Error::InvalidListKind(kind) => ListStoreError::InvalidListKind(kind),
            other => ListStoreError::InvalidEntry(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ListStoreError>;
