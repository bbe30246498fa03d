//! Actor-based concurrency for the ledger
//!
//! Single-writer pattern using a Tokio actor:
//! - One task owns [`Storage`]; every read and write goes through its mailbox
//! - Mutations for a request id are therefore never in flight concurrently
//! - Forwarding (read, decide, write) runs as one message, so an assessment
//!   refresh and a forward for the same id cannot interleave
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │        WalletFirewall (many concurrent callers)       │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (Single Task)                │
//! │                       │                               │
//! │                       ▼                               │
//! │        Storage::put() → journal append + index        │
//! └───────────────────────────────────────────────────────┘
//! ```

use crate::storage::Storage;
use crate::types::InterceptRecord;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use risk_engine::{ForwardReceipt, ForwardStatus, ForwardingPolicy, RequestId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Insert a new record or refresh an unforwarded one
    Upsert {
        /// Freshly assessed record
        record: InterceptRecord,
        /// Stored record after the upsert
        response: oneshot::Sender<Result<InterceptRecord>>,
    },

    /// Get record by request id
    Get {
        /// Key to look up
        request_id: RequestId,
        /// Record, if any
        response: oneshot::Sender<Option<InterceptRecord>>,
    },

    /// Newest records first
    ListRecent {
        /// Maximum number of records
        limit: usize,
        /// Records, newest first
        response: oneshot::Sender<Vec<InterceptRecord>>,
    },

    /// Apply a forwarding request
    Forward {
        /// Record to forward
        request_id: RequestId,
        /// Caller asked to override a blocking decision
        forced: bool,
        /// Request time
        at: DateTime<Utc>,
        /// Receipt, or NotFound
        response: oneshot::Sender<Result<ForwardReceipt>>,
    },

    /// Record count
    Len {
        /// Record count
        response: oneshot::Sender<usize>,
    },

    /// Shutdown actor
    Shutdown {
        /// Acknowledged before the actor stops
        response: oneshot::Sender<()>,
    },
}

/// Actor that processes ledger messages
pub struct LedgerActor {
    /// Storage backend
    storage: Storage,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,

    /// Forwarding rules
    policy: ForwardingPolicy,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(
        storage: Storage,
        mailbox: mpsc::Receiver<LedgerMessage>,
        policy: ForwardingPolicy,
    ) -> Self {
        Self {
            storage,
            mailbox,
            policy,
        }
    }

    /// Run the actor event loop until shutdown or until every handle is dropped
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Shutdown { response } => {
                    tracing::info!("Ledger actor shutting down with {} records", self.storage.len());
                    let _ = response.send(());
                    break;
                }
                msg => self.handle_message(msg),
            }
        }
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::Upsert { record, response } => {
                let _ = response.send(self.upsert(record));
            }

            LedgerMessage::Get {
                request_id,
                response,
            } => {
                let _ = response.send(self.storage.get(&request_id).cloned());
            }

            LedgerMessage::ListRecent { limit, response } => {
                let _ = response.send(self.storage.recent(limit));
            }

            LedgerMessage::Forward {
                request_id,
                forced,
                at,
                response,
            } => {
                let _ = response.send(self.forward(&request_id, forced, at));
            }

            LedgerMessage::Len { response } => {
                let _ = response.send(self.storage.len());
            }

            LedgerMessage::Shutdown { .. } => {
                // Handled in run loop
            }
        }
    }

    fn upsert(&mut self, record: InterceptRecord) -> Result<InterceptRecord> {
        if let Some(existing) = self.storage.get(&record.request_id) {
            if existing.is_forwarded() {
                tracing::debug!(
                    "Record {} already forwarded, keeping stored assessment",
                    record.request_id
                );
                return Ok(existing.clone());
            }
        }

        self.storage.put(record.clone())?;
        Ok(record)
    }

    fn forward(
        &mut self,
        request_id: &RequestId,
        forced: bool,
        at: DateTime<Utc>,
    ) -> Result<ForwardReceipt> {
        let mut record = self
            .storage
            .get(request_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(request_id.to_string()))?;

        let record_decision = record.result.decision;
        let was_forwarded = record.is_forwarded();
        let applied = record.apply_forward(&self.policy, forced, at);
        if applied.changed {
            self.storage.put(record)?;
            if was_forwarded {
                tracing::warn!(
                    request_id = %request_id,
                    forced,
                    status = %applied.receipt.status,
                    "Forwarding re-requested with a different forced flag"
                );
            } else if applied.receipt.status == ForwardStatus::ForcedLogged {
                tracing::warn!(
                    request_id = %request_id,
                    decision = %record_decision,
                    "Forced forward of blocked transfer recorded"
                );
            }
        }
        Ok(applied.receipt)
    }
}

/// Handle to send messages to the ledger actor
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> LedgerMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        rx.await
            .map_err(|_| Error::Concurrency("Actor response channel closed".to_string()))
    }

    /// Insert or refresh a record
    pub async fn upsert(&self, record: InterceptRecord) -> Result<InterceptRecord> {
        self.request(|response| LedgerMessage::Upsert { record, response })
            .await?
    }

    /// Get record by request id
    pub async fn get(&self, request_id: RequestId) -> Result<Option<InterceptRecord>> {
        self.request(|response| LedgerMessage::Get {
            request_id,
            response,
        })
        .await
    }

    /// Newest records first
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<InterceptRecord>> {
        self.request(|response| LedgerMessage::ListRecent { limit, response })
            .await
    }

    /// Apply a forwarding request
    pub async fn forward(
        &self,
        request_id: RequestId,
        forced: bool,
        at: DateTime<Utc>,
    ) -> Result<ForwardReceipt> {
        self.request(|response| LedgerMessage::Forward {
            request_id,
            forced,
            at,
            response,
        })
        .await?
    }

    /// Record count
    pub async fn len(&self) -> Result<usize> {
        self.request(|response| LedgerMessage::Len { response }).await
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|response| LedgerMessage::Shutdown { response })
            .await
    }
}

/// Spawn ledger actor
pub fn spawn_ledger_actor(
    storage: Storage,
    mailbox_capacity: usize,
    policy: ForwardingPolicy,
) -> (LedgerHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(mailbox_capacity);
    let actor = LedgerActor::new(storage, rx, policy);
    let task = tokio::spawn(actor.run());
    (LedgerHandle::new(tx), task)
}
