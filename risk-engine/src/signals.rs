//! Signal evaluators
//!
//! Each signal inspects one intent against a list snapshot and always casts
//! exactly one [`Vote`]. Signals are independent of each other; the engine
//! runs them in a fixed order so reason codes come out reproducibly.

use crate::config::{AmountBand, EngineConfig, StructuringConfig};
use crate::types::{Chain, Decision, ListKind, ListView, TransactionIntent};
use crate::vote::{reason, Vote};
use rust_decimal::Decimal;

/// Independent risk detector
pub trait Signal: Send + Sync {
    /// Stable signal name, used in votes
    fn name(&self) -> &'static str;

    /// Cast a vote for `intent`
    fn evaluate(&self, intent: &TransactionIntent, lists: &dyn ListView) -> Vote;
}

/// Destination on the chain's blacklist forces BLOCK
#[derive(Debug, Default)]
pub struct BlacklistSignal;

impl Signal for BlacklistSignal {
    fn name(&self) -> &'static str {
        "blacklist"
    }

    fn evaluate(&self, intent: &TransactionIntent, lists: &dyn ListView) -> Vote {
        if lists.contains(ListKind::Blacklist, intent.chain(), intent.to_address()) {
            Vote::override_with(self.name(), Decision::Block, reason::BLACKLISTED)
        } else {
            Vote::abstain(self.name())
        }
    }
}

/// Destination on the chain's whitelist forces ALLOW
///
/// Votes independently of the blacklist; the decision policy lets a BLOCK
/// override win over this one.
#[derive(Debug, Default)]
pub struct WhitelistSignal;

impl Signal for WhitelistSignal {
    fn name(&self) -> &'static str {
        "whitelist"
    }

    fn evaluate(&self, intent: &TransactionIntent, lists: &dyn ListView) -> Vote {
        if lists.contains(ListKind::Whitelist, intent.chain(), intent.to_address()) {
            Vote::override_with(self.name(), Decision::Allow, reason::WHITELISTED)
        } else {
            Vote::abstain(self.name())
        }
    }
}

/// Score contribution of the highest amount band crossed
#[derive(Debug)]
pub struct AmountThresholdSignal {
    bands: Vec<AmountBand>,
}

impl AmountThresholdSignal {
    /// Bands must be ascending by `min_amount`
    pub fn new(bands: Vec<AmountBand>) -> Self {
        Self { bands }
    }
}

impl Signal for AmountThresholdSignal {
    fn name(&self) -> &'static str {
        "amount_threshold"
    }

    fn evaluate(&self, intent: &TransactionIntent, _lists: &dyn ListView) -> Vote {
        let crossed = self
            .bands
            .iter()
            .rev()
            .find(|band| intent.amount() >= band.min_amount);

        match crossed {
            Some(band) => Vote::weighted(self.name(), band.contribution, band.reason_code.as_str()),
            None => Vote::abstain(self.name()),
        }
    }
}

/// Amount parked just under a band threshold
#[derive(Debug)]
pub struct StructuringSignal {
    thresholds: Vec<Decimal>,
    config: StructuringConfig,
}

impl StructuringSignal {
    /// Watch the window below each band threshold
    pub fn new(bands: &[AmountBand], config: StructuringConfig) -> Self {
        Self {
            thresholds: bands.iter().map(|b| b.min_amount).collect(),
            config,
        }
    }

    fn in_window(&self, amount: Decimal) -> bool {
        let keep = (Decimal::ONE_HUNDRED - self.config.margin_percent) / Decimal::ONE_HUNDRED;
        self.thresholds
            .iter()
            .any(|&threshold| amount < threshold && amount >= threshold * keep)
    }
}

impl Signal for StructuringSignal {
    fn name(&self) -> &'static str {
        "structuring"
    }

    fn evaluate(&self, intent: &TransactionIntent, _lists: &dyn ListView) -> Vote {
        if self.config.margin_percent > Decimal::ZERO && self.in_window(intent.amount()) {
            Vote::weighted(self.name(), self.config.contribution, reason::NEAR_THRESHOLD)
        } else {
            Vote::abstain(self.name())
        }
    }
}

/// Fixed penalty for chains outside the supported set
#[derive(Debug)]
pub struct UnsupportedChainSignal {
    supported: Vec<Chain>,
    penalty: i32,
}

impl UnsupportedChainSignal {
    /// Penalise anything not in `supported`
    pub fn new(supported: Vec<Chain>, penalty: i32) -> Self {
        Self { supported, penalty }
    }
}

impl Signal for UnsupportedChainSignal {
    fn name(&self) -> &'static str {
        "unsupported_chain"
    }

    fn evaluate(&self, intent: &TransactionIntent, _lists: &dyn ListView) -> Vote {
        if self.supported.contains(intent.chain()) {
            Vote::abstain(self.name())
        } else {
            Vote::weighted(self.name(), self.penalty, reason::UNSUPPORTED_CHAIN)
        }
    }
}

/// Built-in signals in evaluation order
pub fn default_signals(config: &EngineConfig) -> Vec<Box<dyn Signal>> {
    vec![
        Box::new(BlacklistSignal),
        Box::new(WhitelistSignal),
        Box::new(AmountThresholdSignal::new(config.amount_bands.clone())),
        Box::new(StructuringSignal::new(&config.amount_bands, config.structuring)),
        Box::new(UnsupportedChainSignal::new(
            config.supported_chains.clone(),
            config.unsupported_chain_penalty,
        )),
    ]
}
