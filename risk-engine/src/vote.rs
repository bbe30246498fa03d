//! Signal votes

use crate::types::Decision;
use serde::{Deserialize, Serialize};

/// Reason codes emitted by the built-in signals
pub mod reason {
    /// Destination is on the chain's blacklist
    pub const BLACKLISTED: &str = "BLACKLISTED";
    /// Destination is on the chain's whitelist
    pub const WHITELISTED: &str = "WHITELISTED";
    /// Amount sits just below a band threshold
    pub const NEAR_THRESHOLD: &str = "NEAR_THRESHOLD";
    /// Chain outside the supported set
    pub const UNSUPPORTED_CHAIN: &str = "UNSUPPORTED_CHAIN";
}

/// What a signal voted for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ballot {
    /// Signal did not fire
    Abstain,

    /// Signal adds to the aggregate score
    Weighted {
        /// Signed score contribution
        contribution: i32,
        /// Why the signal fired
        reason_code: String,
    },

    /// Signal forces a decision regardless of score
    Override {
        /// Forced decision
        decision: Decision,
        /// Why the signal fired
        reason_code: String,
    },
}

/// One signal's vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Name of the signal that cast the vote
    pub signal: String,

    /// The vote itself
    pub ballot: Ballot,
}

impl Vote {
    /// Abstaining vote
    pub fn abstain(signal: &str) -> Self {
        Self {
            signal: signal.to_string(),
            ballot: Ballot::Abstain,
        }
    }

    /// Weighted vote
    pub fn weighted(signal: &str, contribution: i32, reason_code: impl Into<String>) -> Self {
        Self {
            signal: signal.to_string(),
            ballot: Ballot::Weighted {
                contribution,
                reason_code: reason_code.into(),
            },
        }
    }

    /// Override vote
    pub fn override_with(signal: &str, decision: Decision, reason_code: impl Into<String>) -> Self {
        Self {
            signal: signal.to_string(),
            ballot: Ballot::Override {
                decision,
                reason_code: reason_code.into(),
            },
        }
    }

    /// Numeric contribution (zero for abstentions and overrides)
    pub fn contribution(&self) -> i32 {
        match &self.ballot {
            Ballot::Weighted { contribution, .. } => *contribution,
            Ballot::Abstain | Ballot::Override { .. } => 0,
        }
    }

    /// Reason code, if the signal fired
    pub fn reason_code(&self) -> Option<&str> {
        match &self.ballot {
            Ballot::Abstain => None,
            Ballot::Weighted { reason_code, .. } | Ballot::Override { reason_code, .. } => {
                Some(reason_code)
            }
        }
    }

    /// Whether this vote forces a decision
    pub fn is_override(&self) -> bool {
        matches!(self.ballot, Ballot::Override { .. })
    }

    /// Forced decision, for override votes
    pub fn forced_decision(&self) -> Option<Decision> {
        match self.ballot {
            Ballot::Override { decision, .. } => Some(decision),
            _ => None,
        }
    }
}
