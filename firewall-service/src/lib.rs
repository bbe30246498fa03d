//! Wallet firewall service
//!
//! Composes the risk engine, address lists and intercept ledger into the
//! operations a transport layer exposes: check, send, list admin and ledger
//! reads.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod firewall;
pub mod metrics;
pub mod telemetry;

pub use config::{Config, LoggingConfig};
pub use error::{FirewallError, Result};
pub use firewall::{HealthStatus, WalletFirewall};
pub use metrics::Metrics;
