//! Engine configuration
//!
//! All tunables are injected through [`EngineConfig`]; nothing is read from
//! ambient state during an assessment.

use crate::types::{Chain, RiskLevel, RiskScore};
use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ascending score thresholds for [`RiskLevel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreThresholds {
    /// Highest score still LOW
    pub low_max: u32,

    /// Highest score still MEDIUM
    pub medium_max: u32,

    /// Highest score still HIGH; anything above is CRITICAL
    pub high_max: u32,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            low_max: 29,
            medium_max: 59,
            high_max: 79,
        }
    }
}

impl ScoreThresholds {
    /// Map a score onto its level
    pub fn level_for(&self, score: RiskScore) -> RiskLevel {
        match score.value() {
            s if s <= self.low_max => RiskLevel::Low,
            s if s <= self.medium_max => RiskLevel::Medium,
            s if s <= self.high_max => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}

/// One amount band of the amount-threshold signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBand {
    /// Amounts at or above this value cross the band
    pub min_amount: Decimal,

    /// Score contribution when this is the highest band crossed
    pub contribution: i32,

    /// Reason code reported for the band
    pub reason_code: String,
}

/// Near-threshold structuring heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuringConfig {
    /// Width of the window just below each band threshold, in percent
    pub margin_percent: Decimal,

    /// Score contribution when the amount lands in a window
    pub contribution: i32,
}

impl Default for StructuringConfig {
    fn default() -> Self {
        Self {
            margin_percent: Decimal::from(5),
            contribution: 15,
        }
    }
}

/// Risk engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chains the firewall knows how to reason about
    pub supported_chains: Vec<Chain>,

    /// Score to level thresholds
    pub thresholds: ScoreThresholds,

    /// Upper clamp of the aggregate score
    pub max_score: u32,

    /// Amount bands, ascending by `min_amount`
    pub amount_bands: Vec<AmountBand>,

    /// Structuring heuristic
    pub structuring: StructuringConfig,

    /// Penalty for chains outside `supported_chains`
    pub unsupported_chain_penalty: i32,

    /// Request id bucket width in seconds
    pub request_bucket_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let supported_chains = ["ETH", "BTC", "TRON", "SOL", "BSC", "POLYGON"]
            .iter()
            .filter_map(|c| Chain::parse(c).ok())
            .collect();

        Self {
            supported_chains,
            thresholds: ScoreThresholds::default(),
            max_score: 100,
            amount_bands: vec![
                AmountBand {
                    min_amount: Decimal::from(10_000), // $10k
                    contribution: 40,
                    reason_code: "LARGE_AMOUNT".to_string(),
                },
                AmountBand {
                    min_amount: Decimal::from(100_000), // $100k
                    contribution: 90,
                    reason_code: "VERY_LARGE_AMOUNT".to_string(),
                },
            ],
            structuring: StructuringConfig::default(),
            unsupported_chain_penalty: 30,
            request_bucket_secs: 60,
        }
    }
}

impl EngineConfig {
    /// Check internal consistency
    ///
    /// Band contributions must climb by at least the structuring contribution
    /// so that raising the amount can never lower the score.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if !(t.low_max < t.medium_max && t.medium_max < t.high_max) {
            return Err(Error::InvalidConfig(format!(
                "thresholds must be strictly ascending, got {}/{}/{}",
                t.low_max, t.medium_max, t.high_max
            )));
        }
        if t.high_max >= self.max_score {
            return Err(Error::InvalidConfig(format!(
                "high_max {} leaves no CRITICAL range below max_score {}",
                t.high_max, self.max_score
            )));
        }

        if self.supported_chains.is_empty() {
            return Err(Error::InvalidConfig("supported_chains is empty".to_string()));
        }

        if self.request_bucket_secs == 0 {
            return Err(Error::InvalidConfig(
                "request_bucket_secs must be positive".to_string(),
            ));
        }

        let s = &self.structuring;
        if s.contribution < 0 {
            return Err(Error::InvalidConfig(
                "structuring contribution must not be negative".to_string(),
            ));
        }
        if s.margin_percent < Decimal::ZERO || s.margin_percent >= Decimal::ONE_HUNDRED {
            return Err(Error::InvalidConfig(format!(
                "structuring margin {}% outside [0, 100)",
                s.margin_percent
            )));
        }

        let mut previous: Option<&AmountBand> = None;
        for band in &self.amount_bands {
            if band.min_amount <= Decimal::ZERO {
                return Err(Error::InvalidConfig(format!(
                    "band {} has non-positive threshold",
                    band.reason_code
                )));
            }
            if band.reason_code.trim().is_empty() {
                return Err(Error::InvalidConfig("band without reason code".to_string()));
            }

            let floor = previous.map_or(0, |p| p.contribution) + s.contribution;
            if band.contribution < floor {
                return Err(Error::InvalidConfig(format!(
                    "band {} contribution {} must be at least {}",
                    band.reason_code, band.contribution, floor
                )));
            }
            if let Some(p) = previous {
                if band.min_amount <= p.min_amount {
                    return Err(Error::InvalidConfig(format!(
                        "band {} threshold must exceed {}",
                        band.reason_code, p.reason_code
                    )));
                }
            }
            previous = Some(band);
        }

        Ok(())
    }

    /// Whether `chain` is in the supported set
    pub fn supports(&self, chain: &Chain) -> bool {
        self.supported_chains.contains(chain)
    }
}
