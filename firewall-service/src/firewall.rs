//! Wallet firewall service
//!
//! The caller around the risk engine: validates intents, takes a list
//! snapshot, assesses, and records the outcome in the intercept ledger.
//! Forwarding and the admin operations go through here as well.

use crate::config::Config;
use crate::metrics::Metrics;
use crate::{FirewallError, Result};
use chrono::{DateTime, Utc};
use ledger_core::{InterceptRecord, Ledger};
use list_store::{AddressListStore, ListEntry, ListKey};
use risk_engine::{
    Decision, ForwardReceipt, RawIntent, RequestId, RiskEngine, RiskResult,
    TransactionIntent,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Liveness summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always `ok` when the ledger actor answers
    pub status: String,

    /// Records in the intercept ledger
    pub ledger_records: usize,

    /// Entries across both lists
    pub list_entries: usize,
}

/// Wallet firewall
pub struct WalletFirewall {
    engine: RiskEngine,
    lists: AddressListStore,
    ledger: Ledger,
    metrics: Metrics,
}

impl WalletFirewall {
    /// Build every component from configuration, replaying journals and
    /// loading the seed lists
    pub async fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let engine = RiskEngine::new(config.engine)?;
        let lists = AddressListStore::open(&config.lists)?;

        let ledger = Ledger::open(config.ledger).await?;
        let metrics = Metrics::new()?;

        info!(
            "{} ready: {} list entries, {} ledger records",
            config.service_name,
            lists.len(),
            ledger.len().await?
        );

        Ok(Self {
            engine,
            lists,
            ledger,
            metrics,
        })
    }

    /// Validate, assess and record a raw transfer request
    pub async fn check(&self, raw: RawIntent) -> Result<RiskResult> {
        self.check_at(raw, Utc::now()).await
    }

    /// [`check`](Self::check) with an explicit assessment time
    pub async fn check_at(&self, raw: RawIntent, at: DateTime<Utc>) -> Result<RiskResult> {
        let intent = TransactionIntent::try_from(raw)?;
        self.check_intent_at(intent, at).await
    }

    /// Assess and record a validated intent
    ///
    /// When the same request id was already forwarded, the stored assessment
    /// is returned so the caller sees what the ledger will act on.
    pub async fn check_intent(&self, intent: TransactionIntent) -> Result<RiskResult> {
        self.check_intent_at(intent, Utc::now()).await
    }

    /// Assess at `at`, which also picks the request id time bucket
    pub async fn check_intent_at(
        &self,
        intent: TransactionIntent,
        at: DateTime<Utc>,
    ) -> Result<RiskResult> {
        let snapshot = self.lists.snapshot();
        let result = self.engine.assess_at(&intent, &snapshot, at);

        if result.decision == Decision::Block {
            warn!(
                request_id = %result.request_id,
                chain = %intent.chain(),
                to = %intent.to_address(),
                reasons = ?result.reason_codes,
                "Transfer blocked"
            );
        }

        let record = InterceptRecord::new(intent, result, at);
        let stored = self.ledger.append_or_update(record).await?;
        self.metrics.record_assessment(stored.result.decision);

        debug!(
            request_id = %stored.request_id,
            lists_version = snapshot.version(),
            "Assessment recorded"
        );
        Ok(stored.result)
    }

    /// Forward a previously assessed transfer
    pub async fn send(&self, request_id: &str, forced: bool) -> Result<ForwardReceipt> {
        let receipt = self
            .ledger
            .forward(&RequestId::from_string(request_id), forced)
            .await?;

        self.metrics.record_forward(receipt.status);
        info!(
            request_id = %receipt.request_id,
            status = %receipt.status,
            forced,
            "Forward request handled"
        );
        Ok(receipt)
    }

    /// Add an address to a list (admin)
    pub fn list_add(&self, kind: &str, chain: &str, address: &str) -> Result<bool> {
        let key = ListKey::parse(kind, chain, address)?;
        let added = self.lists.add(key.kind, &key.chain, &key.address)?;
        if added {
            self.metrics.record_list_mutation(key.kind, "add");
        }
        Ok(added)
    }

    /// Remove an address from a list (admin)
    pub fn list_remove(&self, kind: &str, chain: &str, address: &str) -> Result<bool> {
        let key = ListKey::parse(kind, chain, address)?;
        let removed = self.lists.remove(key.kind, &key.chain, &key.address)?;
        if removed {
            self.metrics.record_list_mutation(key.kind, "remove");
        }
        Ok(removed)
    }

    /// Entries of one list (admin)
    pub fn list_entries(&self, kind: &str) -> Result<Vec<ListEntry>> {
        Ok(self.lists.list_raw(kind)?)
    }

    /// Membership check (admin)
    pub fn list_contains(&self, kind: &str, chain: &str, address: &str) -> Result<bool> {
        let key = ListKey::parse(kind, chain, address)?;
        Ok(self.lists.contains(key.kind, &key.chain, &key.address))
    }

    /// Newest intercept records first (admin)
    pub async fn intercepts(&self, limit: usize) -> Result<Vec<InterceptRecord>> {
        Ok(self.ledger.list_recent(limit).await?)
    }

    /// One intercept record (admin)
    pub async fn intercept(&self, request_id: &str) -> Result<InterceptRecord> {
        self.ledger
            .get_by_request_id(&RequestId::from_string(request_id))
            .await?
            .ok_or_else(|| FirewallError::NotFound(request_id.to_string()))
    }

    /// Liveness summary
    pub async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            status: "ok".to_string(),
            ledger_records: self.ledger.len().await?,
            list_entries: self.lists.len(),
        })
    }

    /// Metrics in Prometheus text format
    pub fn metrics_text(&self) -> Result<String> {
        Ok(self.metrics.render()?)
    }

    /// Address list store
    pub fn lists(&self) -> &AddressListStore {
        &self.lists
    }

    /// Risk engine
    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    /// Stop the ledger actor
    pub async fn shutdown(self) -> Result<()> {
        Ok(self.ledger.shutdown().await?)
    }
}
