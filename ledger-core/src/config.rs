//! Configuration for the ledger

use risk_engine::ForwardingPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Append-only journal file; `None` keeps records in memory only
    pub journal_path: Option<PathBuf>,

    /// Actor mailbox capacity (backpressure bound)
    pub mailbox_capacity: usize,

    /// fsync the journal after every append
    pub sync_writes: bool,

    /// Upper bound for `list_recent`
    pub recent_limit_max: usize,

    /// Forwarding rules applied by `forward`
    pub forwarding: ForwardingPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            journal_path: None,
            mailbox_capacity: 1024,
            sync_writes: true,
            recent_limit_max: 1000,
            forwarding: ForwardingPolicy::default(),
        }
    }
}

impl LedgerConfig {
    /// Check internal consistency
    pub fn validate(&self) -> crate::Result<()> {
        if self.mailbox_capacity == 0 {
            return Err(crate::Error::Config(
                "mailbox_capacity must be positive".to_string(),
            ));
        }
        if self.recent_limit_max == 0 {
            return Err(crate::Error::Config(
                "recent_limit_max must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
