//! Assess transfer intents from stdin
//!
//! Reads one JSON `RawIntent` per line and prints one JSON `RiskResult` per
//! line. Malformed lines produce an `{"error": ...}` line instead.
//!
//! Usage: `firewall-check [config.toml] < intents.jsonl`

use firewall_service::{telemetry::init_tracing, Config, WalletFirewall};
use risk_engine::RawIntent;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env()?;

    init_tracing(&config.logging);
    tracing::info!("Starting {}", config.service_name);

    let firewall = WalletFirewall::open(config).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let output = match serde_json::from_str::<RawIntent>(&line) {
            Ok(raw) => match firewall.check(raw).await {
                Ok(result) => serde_json::to_string(&result)?,
                Err(e) if e.is_validation() => serde_json::json!({ "error": e.to_string() }).to_string(),
                Err(e) => return Err(e.into()),
            },
            Err(e) => {
                tracing::warn!("Unparseable intent: {}", e);
                serde_json::json!({ "error": format!("unparseable intent: {}", e) }).to_string()
            }
        };
        println!("{}", output);
    }

    tracing::info!("Input exhausted, shutting down");
    firewall.shutdown().await?;
    Ok(())
}
