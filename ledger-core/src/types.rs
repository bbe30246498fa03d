//! Core types for the intercept ledger

use chrono::{DateTime, Utc};
use risk_engine::forwarding::tx_handle_for;
use risk_engine::{
    Decision, ForwardReceipt, ForwardStatus, ForwardingPolicy, RequestId, RiskResult,
    TransactionIntent,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Forwarding state, written exactly once per record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forwarding {
    /// FORWARDED or FORCED_LOGGED
    pub status: ForwardStatus,

    /// Whether the caller asked for a forced forward
    pub forced: bool,

    /// Handle of the forwarded transaction
    pub tx_handle: String,

    /// When the transfer was forwarded
    pub forwarded_at: DateTime<Utc>,
}

/// Audit entry for a forwarding that overrode a blocking decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEvent {
    /// Event ID (UUIDv7, time-ordered)
    pub event_id: Uuid,

    /// Decision that was overridden
    pub overridden_decision: Decision,

    /// When the override happened
    pub forced_at: DateTime<Utc>,
}

/// Audit entry for a forwarding request whose `forced` flag differs from the
/// flag the record was last forwarded or re-requested with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcingEvent {
    /// Event ID (UUIDv7, time-ordered)
    pub event_id: Uuid,

    /// `forced` flag of the request
    pub forced: bool,

    /// Decision of the stored assessment
    pub decision: Decision,

    /// When the request arrived
    pub requested_at: DateTime<Utc>,
}

/// Persisted snapshot of one assessment and its forwarding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptRecord {
    /// Primary key
    pub request_id: RequestId,

    /// Intent as submitted
    pub intent: TransactionIntent,

    /// Assessment outcome
    pub result: RiskResult,

    /// When the (latest) assessment was recorded
    pub assessed_at: DateTime<Utc>,

    /// Forwarding state, `None` until forwarded
    pub forwarding: Option<Forwarding>,

    /// Forced overrides applied to this record
    #[serde(default)]
    pub override_events: Vec<OverrideEvent>,

    /// Flag changes on an already forwarded record
    #[serde(default)]
    pub forcing_events: Vec<ForcingEvent>,
}

/// Outcome of applying a forwarding request to a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardApplication {
    /// Receipt for the caller
    pub receipt: ForwardReceipt,

    /// Whether the record was modified (and must be persisted)
    pub changed: bool,
}

impl InterceptRecord {
    /// Fresh record at assessment time
    pub fn new(intent: TransactionIntent, result: RiskResult, assessed_at: DateTime<Utc>) -> Self {
        Self {
            request_id: result.request_id.clone(),
            intent,
            result,
            assessed_at,
            forwarding: None,
            override_events: Vec::new(),
            forcing_events: Vec::new(),
        }
    }

    /// Whether the transfer has left the firewall
    pub fn is_forwarded(&self) -> bool {
        self.forwarding.is_some()
    }

    /// Receipt describing the current forwarding state
    pub fn receipt(&self) -> Option<ForwardReceipt> {
        self.forwarding.as_ref().map(|f| ForwardReceipt {
            status: f.status,
            request_id: self.request_id.clone(),
            tx_handle: Some(f.tx_handle.clone()),
        })
    }

    /// `forced` flag of the latest request that reached the forwarded record
    pub fn last_forced_flag(&self) -> Option<bool> {
        self.forcing_events
            .last()
            .map(|e| e.forced)
            .or_else(|| self.forwarding.as_ref().map(|f| f.forced))
    }

    /// Apply a forwarding request
    ///
    /// Forwarding fields are written at most once. Once forwarded, a later
    /// request returns the stored receipt; if its `forced` flag differs from
    /// the last one seen, a [`ForcingEvent`] is appended so the attempt is
    /// audited. Repeats with the same flag leave the record untouched.
    pub fn apply_forward(
        &mut self,
        policy: &ForwardingPolicy,
        forced: bool,
        now: DateTime<Utc>,
    ) -> ForwardApplication {
        if let Some(receipt) = self.receipt() {
            let flag_changed = self.last_forced_flag() != Some(forced);
            if flag_changed {
                self.forcing_events.push(ForcingEvent {
                    event_id: Uuid::now_v7(),
                    forced,
                    decision: self.result.decision,
                    requested_at: now,
                });
            }
            return ForwardApplication {
                receipt,
                changed: flag_changed,
            };
        }

        let status = policy.decide(self.result.decision, forced);
        if status == ForwardStatus::Blocked {
            return ForwardApplication {
                receipt: ForwardReceipt {
                    status,
                    request_id: self.request_id.clone(),
                    tx_handle: None,
                },
                changed: false,
            };
        }

        if status == ForwardStatus::ForcedLogged {
            self.override_events.push(OverrideEvent {
                event_id: Uuid::now_v7(),
                overridden_decision: self.result.decision,
                forced_at: now,
            });
        }

        let tx_handle = tx_handle_for(&self.request_id);
        self.forwarding = Some(Forwarding {
            status,
            forced,
            tx_handle: tx_handle.clone(),
            forwarded_at: now,
        });

        ForwardApplication {
            receipt: ForwardReceipt {
                status,
                request_id: self.request_id.clone(),
                tx_handle: Some(tx_handle),
            },
            changed: true,
        }
    }
}
