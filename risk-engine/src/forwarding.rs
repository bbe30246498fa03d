//! Forwarding decision
//!
//! Runs after assessment, when the caller asks to forward a previously
//! assessed transfer. BLOCK without force is a terminal outcome, not an error.

use crate::request_id::RequestId;
use crate::types::Decision;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a forwarding request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForwardStatus {
    /// Not forwarded, no transaction handle
    Blocked,
    /// Forwarded normally
    Forwarded,
    /// Forwarded through an explicit override of a blocking decision
    ForcedLogged,
}

impl ForwardStatus {
    /// Whether the transfer left the firewall
    pub fn is_forwarded(&self) -> bool {
        !matches!(self, ForwardStatus::Blocked)
    }
}

impl fmt::Display for ForwardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ForwardStatus::Blocked => "BLOCKED",
            ForwardStatus::Forwarded => "FORWARDED",
            ForwardStatus::ForcedLogged => "FORCED_LOGGED",
        };
        f.write_str(s)
    }
}

/// How REVIEW decisions are treated at forwarding time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPolicy {
    /// REVIEW forwards like ALLOW
    #[default]
    Forward,
    /// REVIEW needs an explicit force, like BLOCK
    RequireForce,
}

/// Forwarding rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ForwardingPolicy {
    /// REVIEW handling
    #[serde(default)]
    pub review: ReviewPolicy,
}

impl ForwardingPolicy {
    /// Outcome of forwarding a transfer with `decision`
    pub fn decide(&self, decision: Decision, forced: bool) -> ForwardStatus {
        let needs_force = match decision {
            Decision::Block => true,
            Decision::Review => self.review == ReviewPolicy::RequireForce,
            Decision::Allow => false,
        };

        match (needs_force, forced) {
            (false, _) => ForwardStatus::Forwarded,
            (true, false) => ForwardStatus::Blocked,
            (true, true) => ForwardStatus::ForcedLogged,
        }
    }
}

/// Pseudo transaction handle; nothing is broadcast
pub fn tx_handle_for(request_id: &RequestId) -> String {
    format!("tx_{}", request_id)
}

/// Answer to a forwarding request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardReceipt {
    /// Outcome
    pub status: ForwardStatus,

    /// Request that was forwarded
    pub request_id: RequestId,

    /// Handle of the forwarded transaction, absent when blocked
    pub tx_handle: Option<String>,
}
