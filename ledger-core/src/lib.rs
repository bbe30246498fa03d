//! Intercept Ledger
//!
//! Durable record of every assessed and forwarded transfer, keyed by request id.
//!
//! # Architecture
//!
//! - **Single Writer**: one actor task owns storage; all access goes through it
//! - **Journal**: optional append-only JSON-lines file, replayed on open
//!
//! # Invariants
//!
//! - Records are never deleted
//! - Forwarding fields are written at most once per record
//! - At most one mutation per request id is in flight at any time

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod actor;
pub mod config;
pub mod error;
pub mod ledger;
pub mod storage;
pub mod types;

// Re-exports
pub use config::LedgerConfig;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use types::{ForcingEvent, ForwardApplication, Forwarding, InterceptRecord, OverrideEvent};
