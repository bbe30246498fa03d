//! Risk assessment engine
//!
//! Composes signals, aggregator and policy into one `assess` call. The engine
//! owns no mutable state and performs no I/O, so one instance can be shared
//! across any number of concurrent callers.

use crate::aggregator::VoteAggregator;
use crate::config::EngineConfig;
use crate::policy::DecisionPolicy;
use crate::request_id::RequestId;
use crate::signals::{default_signals, Signal};
use crate::types::{ListView, RiskResult, TransactionIntent};
use crate::vote::Vote;
use crate::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Risk engine
pub struct RiskEngine {
    config: EngineConfig,
    signals: Vec<Box<dyn Signal>>,
    aggregator: VoteAggregator,
    policy: DecisionPolicy,
}

impl RiskEngine {
    /// Create engine with the built-in signals
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            signals: default_signals(&config),
            aggregator: VoteAggregator::new(config.thresholds, config.max_score),
            policy: DecisionPolicy::new(),
            config,
        })
    }

    /// Append a signal after the built-in ones
    pub fn with_signal(mut self, signal: Box<dyn Signal>) -> Self {
        self.signals.push(signal);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Assess `intent` against a list snapshot, bucketing the id at the current time
    pub fn assess(&self, intent: &TransactionIntent, lists: &dyn ListView) -> RiskResult {
        self.assess_at(intent, lists, Utc::now())
    }

    /// Assess with an explicit clock reading
    pub fn assess_at(
        &self,
        intent: &TransactionIntent,
        lists: &dyn ListView,
        at: DateTime<Utc>,
    ) -> RiskResult {
        let request_id = RequestId::derive(intent, at, self.config.request_bucket_secs);

        let votes: Vec<Vote> = self
            .signals
            .iter()
            .map(|signal| signal.evaluate(intent, lists))
            .collect();

        let (score, level) = self.aggregator.aggregate(&votes);
        let decision = self.policy.decide(&votes, level);
        let reason_codes = self.policy.reason_codes(&votes);

        debug!(
            request_id = %request_id,
            chain = %intent.chain(),
            score = score.value(),
            level = %level,
            decision = %decision,
            reasons = ?reason_codes,
            "assessed intent"
        );

        RiskResult {
            request_id,
            score,
            level,
            decision,
            reason_codes,
            votes,
        }
    }
}

impl std::fmt::Debug for RiskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskEngine")
            .field("config", &self.config)
            .field(
                "signals",
                &self.signals.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
