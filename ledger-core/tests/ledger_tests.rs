//! Ledger behaviour through the public async API
//!
//! - Upsert semantics (refresh until forwarded, frozen after)
//! - Forwarding outcomes and idempotency
//! - Serialization of racing forwards for one request id
//! - Journal durability across reopen

use chrono::Utc;
use ledger_core::{Error, InterceptRecord, Ledger, LedgerConfig};
use risk_engine::{
    Decision, ForwardStatus, RequestId, RiskLevel, RiskResult, RiskScore, TransactionIntent,
};
use rust_decimal::Decimal;
use std::sync::Arc;

fn record(id: &str, decision: Decision) -> InterceptRecord {
    let intent = TransactionIntent::new("ETH", "0xfrom", "0xto", Decimal::from(250)).unwrap();
    let result = RiskResult {
        request_id: RequestId::from_string(id),
        score: RiskScore::new(10),
        level: RiskLevel::Low,
        decision,
        reason_codes: vec![],
        votes: vec![],
    };
    InterceptRecord::new(intent, result, Utc::now())
}

async fn memory_ledger() -> Ledger {
    Ledger::open(LedgerConfig::default()).await.unwrap()
}

#[tokio::test]
async fn test_append_and_get() {
    let ledger = memory_ledger().await;
    ledger.append_or_update(record("req_1", Decision::Allow)).await.unwrap();

    let stored = ledger
        .get_by_request_id(&RequestId::from_string("req_1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.result.decision, Decision::Allow);
    assert!(stored.forwarding.is_none());

    assert!(ledger
        .get_by_request_id(&RequestId::from_string("req_missing"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_forward_unknown_is_not_found() {
    let ledger = memory_ledger().await;
    let err = ledger
        .forward(&RequestId::from_string("req_nope"), false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(id) if id == "req_nope"));
}

#[tokio::test]
async fn test_blocked_then_forced() {
    let ledger = memory_ledger().await;
    let id = RequestId::from_string("req_block");
    ledger.append_or_update(record("req_block", Decision::Block)).await.unwrap();

    let blocked = ledger.forward(&id, false).await.unwrap();
    assert_eq!(blocked.status, ForwardStatus::Blocked);
    assert!(blocked.tx_handle.is_none());

    let forced = ledger.forward(&id, true).await.unwrap();
    assert_eq!(forced.status, ForwardStatus::ForcedLogged);
    assert_eq!(forced.tx_handle.as_deref(), Some("tx_req_block"));

    let again = ledger.forward(&id, true).await.unwrap();
    assert_eq!(again, forced);

    let stored = ledger.get_by_request_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.override_events.len(), 1);
    assert_eq!(stored.forwarding.unwrap().status, ForwardStatus::ForcedLogged);
}

#[tokio::test]
async fn test_forcing_after_normal_forward_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let config = LedgerConfig {
        journal_path: Some(dir.path().join("intercepts.jsonl")),
        sync_writes: false,
        ..LedgerConfig::default()
    };
    let id = RequestId::from_string("req_flip");

    let ledger = Ledger::open(config.clone()).await.unwrap();
    ledger.append_or_update(record("req_flip", Decision::Allow)).await.unwrap();

    let first = ledger.forward(&id, false).await.unwrap();
    assert_eq!(first.status, ForwardStatus::Forwarded);

    let second = ledger.forward(&id, true).await.unwrap();
    assert_eq!(second, first);

    // same flag again leaves no second trace
    ledger.forward(&id, true).await.unwrap();

    let stored = ledger.get_by_request_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.forcing_events.len(), 1);
    assert!(stored.forcing_events[0].forced);
    assert_eq!(stored.forwarding.as_ref().map(|f| f.forced), Some(false));
    assert!(stored.override_events.is_empty());
    ledger.shutdown().await.unwrap();

    let reopened = Ledger::open(config).await.unwrap();
    let replayed = reopened.get_by_request_id(&id).await.unwrap().unwrap();
    assert_eq!(replayed.forcing_events, stored.forcing_events);
}

#[tokio::test]
async fn test_reassessment_refreshes_until_forwarded() {
    let ledger = memory_ledger().await;
    let id = RequestId::from_string("req_re");

    ledger.append_or_update(record("req_re", Decision::Allow)).await.unwrap();
    let refreshed = ledger
        .append_or_update(record("req_re", Decision::Review))
        .await
        .unwrap();
    assert_eq!(refreshed.result.decision, Decision::Review);

    ledger.forward(&id, false).await.unwrap();

    // frozen once forwarded
    let kept = ledger
        .append_or_update(record("req_re", Decision::Block))
        .await
        .unwrap();
    assert_eq!(kept.result.decision, Decision::Review);
    assert!(kept.forwarding.is_some());
    assert_eq!(ledger.len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_racing_forced_forwards_log_once() {
    let ledger = Arc::new(memory_ledger().await);
    ledger.append_or_update(record("req_race", Decision::Block)).await.unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                ledger
                    .forward(&RequestId::from_string("req_race"), true)
                    .await
                    .unwrap()
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().status, ForwardStatus::ForcedLogged);
    }

    let stored = ledger
        .get_by_request_id(&RequestId::from_string("req_race"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.override_events.len(), 1);
}

#[tokio::test]
async fn test_list_recent_newest_first_and_clamped() {
    let config = LedgerConfig {
        recent_limit_max: 3,
        ..LedgerConfig::default()
    };
    let ledger = Ledger::open(config).await.unwrap();
    for i in 0..5 {
        ledger
            .append_or_update(record(&format!("req_{}", i), Decision::Allow))
            .await
            .unwrap();
    }

    let recent = ledger.list_recent(200).await.unwrap();
    let ids: Vec<_> = recent.iter().map(|r| r.request_id.as_str()).collect();
    assert_eq!(ids, vec!["req_4", "req_3", "req_2"]);
}

#[tokio::test]
async fn test_journal_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = LedgerConfig {
        journal_path: Some(dir.path().join("ledger").join("intercepts.jsonl")),
        ..LedgerConfig::default()
    };

    let ledger = Ledger::open(config.clone()).await.unwrap();
    ledger.append_or_update(record("req_a", Decision::Block)).await.unwrap();
    ledger.append_or_update(record("req_b", Decision::Allow)).await.unwrap();
    ledger.forward(&RequestId::from_string("req_a"), true).await.unwrap();
    ledger.shutdown().await.unwrap();

    let reopened = Ledger::open(config).await.unwrap();
    assert_eq!(reopened.len().await.unwrap(), 2);

    let a = reopened
        .get_by_request_id(&RequestId::from_string("req_a"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(a.forwarding.as_ref().unwrap().status, ForwardStatus::ForcedLogged);
    assert_eq!(a.override_events.len(), 1);

    // forwarding state is not re-applied after replay
    let receipt = reopened
        .forward(&RequestId::from_string("req_a"), true)
        .await
        .unwrap();
    assert_eq!(receipt.status, ForwardStatus::ForcedLogged);

    let recent = reopened.list_recent(10).await.unwrap();
    assert_eq!(recent[0].request_id.as_str(), "req_b");
}
