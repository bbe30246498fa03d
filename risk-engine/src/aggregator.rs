//! Voting aggregator

use crate::config::ScoreThresholds;
use crate::types::{RiskLevel, RiskScore};
use crate::vote::Vote;

/// Folds weighted votes into a clamped score and its level
#[derive(Debug, Clone, Copy)]
pub struct VoteAggregator {
    thresholds: ScoreThresholds,
    max_score: u32,
}

impl VoteAggregator {
    /// Create new aggregator
    pub fn new(thresholds: ScoreThresholds, max_score: u32) -> Self {
        Self {
            thresholds,
            max_score,
        }
    }

    /// Sum of weighted contributions, clamped to `[0, max_score]`.
    /// Override votes are ignored here.
    pub fn score(&self, votes: &[Vote]) -> RiskScore {
        let total: i64 = votes
            .iter()
            .filter(|v| !v.is_override())
            .map(|v| i64::from(v.contribution()))
            .sum();

        let clamped = total.clamp(0, i64::from(self.max_score));
        RiskScore::new(u32::try_from(clamped).unwrap_or(self.max_score))
    }

    /// Score and level of a vote set
    pub fn aggregate(&self, votes: &[Vote]) -> (RiskScore, RiskLevel) {
        let score = self.score(votes);
        (score, self.thresholds.level_for(score))
    }
}
