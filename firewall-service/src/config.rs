//! Configuration for the firewall service

use crate::{FirewallError, Result};
use ledger_core::LedgerConfig;
use list_store::ListStoreConfig;
use risk_engine::{Chain, EngineConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Risk engine tunables
    pub engine: EngineConfig,

    /// Intercept ledger
    pub ledger: LedgerConfig,

    /// Address lists: journal and startup seeds
    pub lists: ListStoreConfig,

    /// Log output
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "wallet-firewall".to_string(),
            engine: EngineConfig::default(),
            ledger: LedgerConfig::default(),
            lists: ListStoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,

    /// Filter directive used when `RUST_LOG` is unset
    pub directive: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            directive: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FirewallError::Config(format!("Failed to read {:?}: {}", path.as_ref(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| FirewallError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay environment variables onto this configuration
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("FIREWALL_JOURNAL_PATH") {
            self.ledger.journal_path = Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("FIREWALL_LISTS_JOURNAL_PATH") {
            self.lists.journal_path = Some(PathBuf::from(path));
        }

        if let Ok(secs) = std::env::var("FIREWALL_BUCKET_SECS") {
            self.engine.request_bucket_secs = secs.parse().map_err(|e| {
                FirewallError::Config(format!("FIREWALL_BUCKET_SECS {:?}: {}", secs, e))
            })?;
        }

        if let Ok(chains) = std::env::var("FIREWALL_SUPPORTED_CHAINS") {
            self.engine.supported_chains = parse_chain_list(&chains)?;
        }

        if let Ok(json) = std::env::var("FIREWALL_LOG_JSON") {
            self.logging.json = matches!(json.trim(), "1" | "true" | "TRUE" | "yes");
        }

        Ok(())
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.ledger.validate()?;
        Ok(())
    }
}

fn parse_chain_list(raw: &str) -> Result<Vec<Chain>> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| Chain::parse(c).map_err(FirewallError::from))
        .collect()
}
