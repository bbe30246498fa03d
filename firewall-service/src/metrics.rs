//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `firewall_assessments_total{decision}` - Assessments by decision
//! - `firewall_forwards_total{status}` - Forwarding requests by outcome
//! - `firewall_list_mutations_total{kind,op}` - Effective list adds/removes

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use risk_engine::{Decision, ForwardStatus, ListKind};

/// Metrics collector
///
/// Uses a private registry so several firewalls can live in one process.
#[derive(Clone)]
pub struct Metrics {
    /// Assessments by decision
    pub assessments: IntCounterVec,

    /// Forwarding outcomes
    pub forwards: IntCounterVec,

    /// List mutations
    pub list_mutations: IntCounterVec,

    /// Prometheus registry
    pub registry: Registry,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let assessments = IntCounterVec::new(
            Opts::new("firewall_assessments_total", "Assessments by decision"),
            &["decision"],
        )?;
        registry.register(Box::new(assessments.clone()))?;

        let forwards = IntCounterVec::new(
            Opts::new("firewall_forwards_total", "Forwarding requests by outcome"),
            &["status"],
        )?;
        registry.register(Box::new(forwards.clone()))?;

        let list_mutations = IntCounterVec::new(
            Opts::new("firewall_list_mutations_total", "Effective list mutations"),
            &["kind", "op"],
        )?;
        registry.register(Box::new(list_mutations.clone()))?;

        Ok(Self {
            assessments,
            forwards,
            list_mutations,
            registry,
        })
    }

    /// Count an assessment
    pub fn record_assessment(&self, decision: Decision) {
        self.assessments
            .with_label_values(&[decision.to_string().as_str()])
            .inc();
    }

    /// Count a forwarding outcome
    pub fn record_forward(&self, status: ForwardStatus) {
        self.forwards.with_label_values(&[status.to_string().as_str()]).inc();
    }

    /// Count an effective list mutation
    pub fn record_list_mutation(&self, kind: ListKind, op: &str) {
        self.list_mutations
            .with_label_values(&[kind.as_str(), op])
            .inc();
    }

    /// Render in the Prometheus text exposition format
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
