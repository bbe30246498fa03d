//! Deterministic request identifiers
//!
//! A request id is derived from `(chain, to_address, amount)` plus a coarse
//! time bucket. Identical requests inside one bucket share an id, which makes
//! the intercept ledger idempotent for retried submissions.

use crate::types::TransactionIntent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

const PREFIX: &str = "req_";
const DIGEST_BYTES: usize = 16;

/// Ledger primary key for an assessed transfer
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Derive the id for `intent` at time `at` with buckets of `bucket_secs`
    pub fn derive(intent: &TransactionIntent, at: DateTime<Utc>, bucket_secs: u64) -> Self {
        let bucket = time_bucket(at, bucket_secs);

        let mut hasher = Sha256::new();
        hasher.update(intent.chain().as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(intent.to_address().as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(intent.amount().normalize().to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(bucket.to_string().as_bytes());
        let digest = hasher.finalize();

        Self(format!("{}{}", PREFIX, hex::encode(&digest[..DIGEST_BYTES])))
    }

    /// Wrap an id received from a caller (lookups only)
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bucket index of `at`. Timestamps before the epoch collapse into bucket 0.
pub fn time_bucket(at: DateTime<Utc>, bucket_secs: u64) -> u64 {
    let secs = u64::try_from(at.timestamp()).unwrap_or(0);
    secs / bucket_secs.max(1)
}
