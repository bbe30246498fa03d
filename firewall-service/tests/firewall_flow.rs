//! End-to-end flows through the firewall service
//!
//! - check → ledger record → send
//! - blacklist/whitelist administration feeding later assessments
//! - error taxonomy surfaced to callers

use chrono::{DateTime, Duration, TimeZone, Utc};
use firewall_service::{Config, FirewallError, WalletFirewall};
use list_store::SeedEntry;
use risk_engine::{Decision, ForwardStatus, RawIntent, ReviewPolicy, RiskLevel, RiskScore};
use rust_decimal::Decimal;

fn raw(chain: &str, to: &str, amount: i64) -> RawIntent {
    RawIntent {
        chain: chain.to_string(),
        from_address: "0xwallet01".to_string(),
        to_address: to.to_string(),
        amount: Decimal::from(amount),
    }
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

async fn firewall() -> WalletFirewall {
    WalletFirewall::open(Config::default()).await.unwrap()
}

#[tokio::test]
async fn test_blacklisted_transfer_is_blocked_until_forced() {
    let fw = firewall().await;
    assert!(fw.list_add("BLACKLIST", "ETH", "0xBAD").unwrap());

    let result = fw.check(raw("ETH", "0xBAD", 100)).await.unwrap();
    assert_eq!(result.decision, Decision::Block);
    assert!(result.reason_codes.contains(&"BLACKLISTED".to_string()));

    let id = result.request_id.to_string();
    let blocked = fw.send(&id, false).await.unwrap();
    assert_eq!(blocked.status, ForwardStatus::Blocked);
    assert!(blocked.tx_handle.is_none());

    let forced = fw.send(&id, true).await.unwrap();
    assert_eq!(forced.status, ForwardStatus::ForcedLogged);
    assert_eq!(forced.tx_handle, Some(format!("tx_{}", id)));

    let record = fw.intercept(&id).await.unwrap();
    assert_eq!(record.override_events.len(), 1);
    assert!(record.forwarding.unwrap().forced);
}

#[tokio::test]
async fn test_small_clean_transfer_forwards() {
    let fw = firewall().await;

    let result = fw.check(raw("ETH", "0xNEW", 5)).await.unwrap();
    assert_eq!(result.decision, Decision::Allow);
    assert_eq!(result.score, RiskScore::ZERO);
    assert_eq!(result.level, RiskLevel::Low);

    let receipt = fw.send(result.request_id.as_str(), false).await.unwrap();
    assert_eq!(receipt.status, ForwardStatus::Forwarded);

    // repeated send does not change the record
    let again = fw.send(result.request_id.as_str(), false).await.unwrap();
    assert_eq!(again, receipt);
    let record = fw.intercept(result.request_id.as_str()).await.unwrap();
    assert!(record.override_events.is_empty());
}

#[tokio::test]
async fn test_huge_transfer_is_critical() {
    let fw = firewall().await;
    let result = fw.check(raw("ETH", "0xNEW", 25_000_000)).await.unwrap();

    assert_eq!(result.level, RiskLevel::Critical);
    assert_eq!(result.decision, Decision::Block);
    assert!(result.reason_codes.contains(&"VERY_LARGE_AMOUNT".to_string()));
}

#[tokio::test]
async fn test_deny_wins_over_whitelist() {
    let fw = firewall().await;
    fw.list_add("WHITELIST", "ETH", "0xboth").unwrap();
    fw.list_add("BLACKLIST", "ETH", "0xboth").unwrap();

    let result = fw.check(raw("ETH", "0xBOTH", 1)).await.unwrap();
    assert_eq!(result.decision, Decision::Block);

    fw.list_remove("BLACKLIST", "ETH", "0xboth").unwrap();
    let result = fw.check(raw("ETH", "0xBOTH", 2)).await.unwrap();
    assert_eq!(result.decision, Decision::Allow);
    assert_eq!(result.reason_codes, vec!["WHITELISTED"]);
}

#[tokio::test]
async fn test_identical_requests_share_one_record() {
    let fw = firewall().await;
    let t0 = at(1_700_000_000);

    let a = fw.check_at(raw("ETH", "0xdup", 42), t0).await.unwrap();
    let b = fw
        .check_at(raw("eth", "0xDUP", 42), t0 + Duration::seconds(5))
        .await
        .unwrap();

    assert_eq!(a.request_id, b.request_id);
    assert_eq!(fw.intercepts(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_next_bucket_is_a_new_record() {
    let fw = firewall().await;
    let t0 = at(1_700_000_000);

    let a = fw.check_at(raw("ETH", "0xdup", 42), t0).await.unwrap();
    let b = fw
        .check_at(raw("ETH", "0xdup", 42), t0 + Duration::seconds(60))
        .await
        .unwrap();

    assert_ne!(a.request_id, b.request_id);
    assert_eq!(fw.intercepts(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_validation_errors_surface() {
    let fw = firewall().await;

    let err = fw.check(raw("ETH", "0xabc", 0)).await.unwrap_err();
    assert!(err.is_validation());

    let err = fw.check(raw("", "0xabc", 10)).await.unwrap_err();
    assert!(err.is_validation());

    let err = fw.check(raw("ETH", "bad address!", 10)).await.unwrap_err();
    assert!(err.is_validation());

    assert_eq!(fw.health().await.unwrap().ledger_records, 0);
}

#[tokio::test]
async fn test_unknown_request_id_is_not_found() {
    let fw = firewall().await;

    let err = fw.send("req_missing", false).await.unwrap_err();
    assert!(err.is_not_found());

    let err = fw.intercept("req_missing").await.unwrap_err();
    assert!(matches!(err, FirewallError::NotFound(_)));
}

#[tokio::test]
async fn test_invalid_list_kind() {
    let fw = firewall().await;

    assert!(fw.list_add("GREYLIST", "ETH", "0xabc").unwrap_err().is_invalid_list_kind());
    assert!(fw.list_remove("", "ETH", "0xabc").unwrap_err().is_invalid_list_kind());
    assert!(fw.list_entries("nope").unwrap_err().is_invalid_list_kind());
}

#[tokio::test]
async fn test_list_admin_roundtrip() {
    let fw = firewall().await;

    assert!(fw.list_add("WHITELIST", "TRON", "TTreasury01").unwrap());
    assert!(!fw.list_add("whitelist", "tron", "TTreasury01").unwrap());
    assert!(fw.list_contains("WHITELIST", "TRON", "TTreasury01").unwrap());
    // base58 is case-sensitive
    assert!(!fw.list_contains("WHITELIST", "TRON", "ttreasury01").unwrap());

    let entries = fw.list_entries("WHITELIST").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].address.as_str(), "TTreasury01");

    assert!(fw.list_remove("WHITELIST", "TRON", "TTreasury01").unwrap());
    assert!(fw.list_entries("WHITELIST").unwrap().is_empty());
}

#[tokio::test]
async fn test_seed_lists_from_config() {
    let mut config = Config::default();
    config.lists.blacklist.push(SeedEntry {
        chain: "SOL".to_string(),
        address: "So1Drainer9".to_string(),
    });

    let fw = WalletFirewall::open(config).await.unwrap();
    let result = fw.check(raw("SOL", "So1Drainer9", 10)).await.unwrap();
    assert_eq!(result.decision, Decision::Block);
    assert_eq!(fw.health().await.unwrap().list_entries, 1);
}

#[tokio::test]
async fn test_review_requires_force_when_configured() {
    let mut config = Config::default();
    config.ledger.forwarding.review = ReviewPolicy::RequireForce;
    let fw = WalletFirewall::open(config).await.unwrap();

    // LARGE_AMOUNT (40) + UNSUPPORTED_CHAIN (30) = 70 → HIGH → REVIEW
    let result = fw.check(raw("DOGE", "DRecipient1", 20_000)).await.unwrap();
    assert_eq!(result.decision, Decision::Review);

    let held = fw.send(result.request_id.as_str(), false).await.unwrap();
    assert_eq!(held.status, ForwardStatus::Blocked);

    let forced = fw.send(result.request_id.as_str(), true).await.unwrap();
    assert_eq!(forced.status, ForwardStatus::ForcedLogged);
}

#[tokio::test]
async fn test_metrics_and_journal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.ledger.journal_path = Some(dir.path().join("intercepts.jsonl"));

    let fw = WalletFirewall::open(config.clone()).await.unwrap();
    let result = fw.check(raw("ETH", "0xjournal", 7)).await.unwrap();
    fw.send(result.request_id.as_str(), false).await.unwrap();

    let text = fw.metrics_text().unwrap();
    assert!(text.contains("firewall_assessments_total{decision=\"ALLOW\"} 1"));
    assert!(text.contains("firewall_forwards_total{status=\"FORWARDED\"} 1"));
    fw.shutdown().await.unwrap();

    let reopened = WalletFirewall::open(config).await.unwrap();
    let record = reopened.intercept(result.request_id.as_str()).await.unwrap();
    assert_eq!(
        record.forwarding.map(|f| f.status),
        Some(ForwardStatus::Forwarded)
    );
}

#[tokio::test]
async fn test_list_changes_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.lists.journal_path = Some(dir.path().join("lists.jsonl"));
    config.lists.sync_writes = false;

    {
        let fw = WalletFirewall::open(config.clone()).await.unwrap();
        assert!(fw.list_add("BLACKLIST", "ETH", "0xDrainer").unwrap());
        assert!(fw.list_add("WHITELIST", "ETH", "0xTreasury").unwrap());
        assert!(fw.list_add("WHITELIST", "ETH", "0xRetired").unwrap());
        assert!(fw.list_remove("WHITELIST", "ETH", "0xretired").unwrap());
        fw.shutdown().await.unwrap();
    }

    let fw = WalletFirewall::open(config).await.unwrap();
    assert!(fw.list_contains("BLACKLIST", "ETH", "0xdrainer").unwrap());
    assert!(!fw.list_contains("WHITELIST", "ETH", "0xretired").unwrap());
    assert_eq!(fw.health().await.unwrap().list_entries, 2);

    let result = fw.check(raw("ETH", "0xDRAINER", 1)).await.unwrap();
    assert_eq!(result.decision, Decision::Block);
}
