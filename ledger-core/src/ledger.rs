//! Main ledger orchestration layer
//!
//! Ties storage and the actor together into the API the firewall calls.
//!
//! # Example
//!
//! ```no_run
//! use ledger_core::{Ledger, LedgerConfig};
//!
//! #[tokio::main]
//! async fn main() -> ledger_core::Result<()> {
//!     let ledger = Ledger::open(LedgerConfig::default()).await?;
//!
//!     // let record = InterceptRecord::new(intent, result, Utc::now());
//!     // ledger.append_or_update(record).await?;
//!
//!     ledger.shutdown().await
//! }
//! ```

use crate::{
    actor::{spawn_ledger_actor, LedgerHandle},
    storage::Storage,
    types::InterceptRecord,
    Error, LedgerConfig, Result,
};
use chrono::Utc;
use risk_engine::{ForwardReceipt, RequestId};
use tokio::task::JoinHandle;

/// Intercept ledger
pub struct Ledger {
    /// Actor handle for async operations
    handle: LedgerHandle,

    /// Actor task, joined on shutdown
    task: JoinHandle<()>,

    /// Configuration
    config: LedgerConfig,
}

impl Ledger {
    /// Open ledger with configuration, replaying the journal if configured
    pub async fn open(config: LedgerConfig) -> Result<Self> {
        config.validate()?;

        let storage = Storage::open(&config)?;
        let (handle, task) =
            spawn_ledger_actor(storage, config.mailbox_capacity, config.forwarding);

        Ok(Self {
            handle,
            task,
            config,
        })
    }

    /// Record an assessment
    ///
    /// Returns the stored record: the given one, or the existing record when
    /// that one was already forwarded and is therefore frozen.
    pub async fn append_or_update(&self, record: InterceptRecord) -> Result<InterceptRecord> {
        self.handle.upsert(record).await
    }

    /// Get record by request id
    pub async fn get_by_request_id(&self, request_id: &RequestId) -> Result<Option<InterceptRecord>> {
        self.handle.get(request_id.clone()).await
    }

    /// Newest records first; `limit` is clamped to `recent_limit_max`
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<InterceptRecord>> {
        let limit = limit.min(self.config.recent_limit_max);
        self.handle.list_recent(limit).await
    }

    /// Forward a previously assessed transfer
    ///
    /// Fails with [`Error::NotFound`] for unknown request ids. A BLOCK
    /// forwarded without force yields a BLOCKED receipt, not an error.
    pub async fn forward(&self, request_id: &RequestId, forced: bool) -> Result<ForwardReceipt> {
        self.handle
            .forward(request_id.clone(), forced, Utc::now())
            .await
    }

    /// Number of records
    pub async fn len(&self) -> Result<usize> {
        self.handle.len().await
    }

    /// Active configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Shutdown ledger and wait for the actor to stop
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await?;
        self.task
            .await
            .map_err(|e| Error::Concurrency(format!("Ledger actor failed: {}", e)))
    }
}
