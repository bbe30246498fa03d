use chrono::{DateTime, Utc};
use risk_engine::{Address, Chain, ListKind};
use serde::{Deserialize, Serialize};

/// Membership key: one address on one chain's list
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListKey {
    pub kind: ListKind,
    pub chain: Chain,
    pub address: Address,
}

impl ListKey {
    pub fn new(kind: ListKind, chain: Chain, address: Address) -> Self {
        Self {
            kind,
            chain,
            address,
        }
    }

    /// Build a key from untrusted strings
    pub fn parse(kind: &str, chain: &str, address: &str) -> crate::Result<Self> {
        Ok(Self {
            kind: kind.parse()?,
            chain: Chain::parse(chain)?,
            address: Address::parse(address)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub kind: ListKind,
    pub chain: Chain,
    pub address: Address,
    pub added_at: DateTime<Utc>,
}

/// Entry as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEntry {
    pub chain: String,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOp {
    Add,
    Remove,
}

/// One journaled list change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMutation {
    pub op: ListOp,
    pub key: ListKey,
    pub at: DateTime<Utc>,
}
