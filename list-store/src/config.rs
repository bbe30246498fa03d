//! Configuration for the address list store

use crate::types::SeedEntry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// List store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListStoreConfig {
    /// Append-only mutation journal; `None` keeps lists in memory only
    pub journal_path: Option<PathBuf>,

    /// fsync the journal after every mutation
    pub sync_writes: bool,

    /// Denied destinations added at every start
    pub blacklist: Vec<SeedEntry>,

    /// Trusted destinations added at every start
    pub whitelist: Vec<SeedEntry>,
}

impl Default for ListStoreConfig {
    fn default() -> Self {
        Self {
            journal_path: None,
            sync_writes: true,
            blacklist: Vec::new(),
            whitelist: Vec::new(),
        }
    }
}
