//! Risk Engine for the wallet firewall
//!
//! Turns a transfer intent into a score, a risk level, a decision and the
//! votes behind it. Pure: the engine reads a list snapshot and nothing else.
//!
//! # Pipeline
//!
//! ```text
//! TransactionIntent ──► signals (fixed order) ──► Vec<Vote>
//!                                                   │
//!                       VoteAggregator ◄────────────┤
//!                       (score, level)              │
//!                             │                     │
//!                             ▼                     ▼
//!                       DecisionPolicy ──► RiskResult
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod forwarding;
pub mod policy;
pub mod request_id;
pub mod signals;
pub mod types;
pub mod vote;

pub use aggregator::VoteAggregator;
pub use config::{AmountBand, EngineConfig, ScoreThresholds, StructuringConfig};
pub use engine::RiskEngine;
pub use error::{Error, Result, ValidationError};
pub use forwarding::{ForwardReceipt, ForwardStatus, ForwardingPolicy, ReviewPolicy};
pub use policy::DecisionPolicy;
pub use request_id::RequestId;
pub use signals::Signal;
pub use types::*;
pub use vote::{Ballot, Vote};
