//! Decision policy
//!
//! Priority order:
//!
//! 1. any BLOCK override → BLOCK (deny wins)
//! 2. any ALLOW override → ALLOW
//! 3. by level: LOW/MEDIUM → ALLOW, HIGH → REVIEW, CRITICAL → BLOCK

use crate::types::{Decision, RiskLevel};
use crate::vote::Vote;

/// Maps votes and level to a decision plus the audit reason codes
#[derive(Debug, Default, Clone, Copy)]
pub struct DecisionPolicy;

impl DecisionPolicy {
    /// Create new policy
    pub fn new() -> Self {
        Self
    }

    /// Final decision
    pub fn decide(&self, votes: &[Vote], level: RiskLevel) -> Decision {
        let forced: Vec<Decision> = votes.iter().filter_map(Vote::forced_decision).collect();

        if forced.contains(&Decision::Block) {
            return Decision::Block;
        }
        if forced.contains(&Decision::Allow) {
            return Decision::Allow;
        }
        // A REVIEW override falls through to the level mapping, escalated to
        // at least REVIEW.
        let by_level = Self::by_level(level);
        if forced.contains(&Decision::Review) && by_level == Decision::Allow {
            return Decision::Review;
        }
        by_level
    }

    /// Every reason code that fired, in evaluation order, duplicates kept
    pub fn reason_codes(&self, votes: &[Vote]) -> Vec<String> {
        votes
            .iter()
            .filter_map(|v| v.reason_code().map(str::to_string))
            .collect()
    }

    fn by_level(level: RiskLevel) -> Decision {
        match level {
            RiskLevel::Low | RiskLevel::Medium => Decision::Allow,
            RiskLevel::High => Decision::Review,
            RiskLevel::Critical => Decision::Block,
        }
    }
}
