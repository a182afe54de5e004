//! End-to-end demo: seeds an in-memory data source with a handful of wallet
//! fixtures, drives the worker through INIT and a streaming SCORE_BATCH, and
//! prints the narrative for each result.
//!
//! ```sh
//! cargo run -p visionrisk-service --bin demo
//! ```

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc;
use visionrisk_client::StaticRiskSource;
use visionrisk_engine::narrate;
use visionrisk_service::{
    RequestEnvelope, RiskWorker, WorkerRequest, WorkerResponse,
};
use visionrisk_types::{NeighborGraph, NeighborLink, NeighborRecord, ScoreItem, Tone};

const DAY_MS: i64 = 86_400_000;

fn seed_demo_source(now_ms: i64) -> StaticRiskSource {
    let dormant_nodes: Vec<NeighborRecord> = (0..6i64)
        .map(|i| NeighborRecord {
            id: format!("0xdorm{i}"),
            created_at: Some(now_ms - 500 * DAY_MS),
            last_tx_at: Some(now_ms - (120 + i) * DAY_MS),
            tx_count: Some(12.0),
            labels: Vec::new(),
        })
        .collect();
    let dormant_links = dormant_nodes
        .iter()
        .map(|node| NeighborLink {
            a: "0xfresh".to_string(),
            b: node.id.clone(),
            weight: 1.0,
        })
        .collect();

    StaticRiskSource::new()
        .with_policy(
            "0xsanctioned",
            json!({
                "risk_score": 100,
                "block": true,
                "reasons": ["OFAC SDN match"],
            }),
        )
        .with_policy(
            "0xfresh",
            json!({
                "risk_score": 68,
                "reasons": ["fan In High", "burst Anomaly"],
                "feats": { "mixerTaint": 0.4 },
            }),
        )
        .with_policy("0xveteran", json!({ "score": 12 }))
        .with_earliest_tx("0xfresh", now_ms - 20 * DAY_MS)
        .with_earliest_tx("0xveteran", now_ms - 1800 * DAY_MS)
        .with_neighbors(
            "0xfresh",
            NeighborGraph {
                nodes: dormant_nodes,
                links: dormant_links,
            },
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let now_ms = Utc::now().timestamp_millis();
    let mut worker = RiskWorker::new(Arc::new(seed_demo_source(now_ms)));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let init = RequestEnvelope::new(WorkerRequest::Init(Default::default()));
    worker.handle(init.to_value(), &tx).await;

    let batch = RequestEnvelope::new(WorkerRequest::ScoreBatch {
        items: vec![
            ScoreItem::new("0xsanctioned", "eth"),
            ScoreItem::new("0xfresh", "eth"),
            ScoreItem::new("0xveteran", "eth"),
            ScoreItem::new("0xunknown", "eth"),
        ],
    });
    worker.handle(batch.to_value(), &tx).await;
    drop(tx);

    while let Some(envelope) = rx.recv().await {
        match envelope.response {
            WorkerResponse::InitOk {
                capabilities,
                ruleset,
            } => {
                println!("worker ready: ruleset={ruleset} capabilities={capabilities:?}");
            }
            WorkerResponse::ResultStream { data } => {
                let narrative = narrate(&data.explain, Tone::Analyst);
                let verdict = if data.blocked { "BLOCKED" } else { "ok" };
                println!("\n{} [{}] score={} {}", data.id, data.network, data.score, verdict);
                println!("  {}", narrative.text);
                for badge in &narrative.badges {
                    println!("  badge: {} ({:?})", badge.label, badge.level);
                }
                for factor in &narrative.factors {
                    println!("  factor: {} +{}", factor.label, factor.delta);
                }
            }
            WorkerResponse::Error { error } => println!("error: {error}"),
            WorkerResponse::Done => println!("\nbatch complete"),
            other => println!("unexpected frame: {other:?}"),
        }
    }

    Ok(())
}
