//! Scoring orchestrator: per-address fetch sequencing and batch execution.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::warn;
use visionrisk_client::RiskDataSource;
use visionrisk_engine::{reconcile, summarize};
use visionrisk_types::{
    CanonicalResult, Feats, ItemError, NeighborSummary, RawScore, ScoreItem, WorkerConfig,
};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Scoring errors. Only genuinely invalid input fails a request; upstream
/// unavailability degrades silently per the fallback table.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("invalid score item: {0}")]
    InvalidItem(#[from] ItemError),
}

/// Sequences the policy check, age lookup, and neighbor aggregation for one
/// address and reconciles the outputs into a canonical result.
pub struct Orchestrator {
    source: Arc<dyn RiskDataSource>,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn RiskDataSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<dyn RiskDataSource> {
        &self.source
    }

    /// Score a single item under the given configuration snapshot.
    pub async fn score_one(
        &self,
        item: &ScoreItem,
        config: &WorkerConfig,
    ) -> Result<CanonicalResult, ScoreError> {
        item.validate()?;
        let network = if item.network.is_empty() {
            config.network.as_str()
        } else {
            item.network.as_str()
        };
        let now_ms = Utc::now().timestamp_millis();

        let policy_fut = self.source.check(&item.id, network);
        let age_fut = self.source.earliest_tx_ms(&item.id, network);
        let neighbors_fut = async {
            if config.flags.graph_signals {
                Some(
                    self.source
                        .neighbors(&item.id, network, config.neighbor_hop, config.neighbor_limit)
                        .await,
                )
            } else {
                None
            }
        };
        let (policy_res, age_res, neighbors_res) = tokio::join!(policy_fut, age_fut, neighbors_fut);

        let policy = match policy_res {
            Ok(policy) => Some(policy),
            Err(err) => {
                warn!(address = %item.id, %err, "policy check unavailable; scoring without a verdict");
                None
            }
        };
        let earliest_ms = match age_res {
            Ok(earliest) => earliest,
            Err(err) => {
                warn!(address = %item.id, %err, "age lookup unavailable; wallet age unknown");
                None
            }
        };
        let neighbor_summary = match neighbors_res {
            None => None,
            Some(Ok(graph)) => {
                let mut nodes = graph.nodes;
                nodes.truncate(config.neighbor_limit as usize);
                Some(summarize(&nodes, now_ms))
            }
            Some(Err(err)) => {
                warn!(address = %item.id, %err, "neighbor fetch unavailable; no graph signals");
                None
            }
        };

        let raw = self.assemble(item, network, policy, earliest_ms, neighbor_summary, now_ms);
        Ok(reconcile(&raw, config.baseline_score))
    }

    /// Score a batch with bounded concurrency. Item failures never abort
    /// sibling items; completion order is not guaranteed.
    pub async fn score_batch(
        &self,
        items: &[ScoreItem],
        config: &WorkerConfig,
    ) -> Vec<Result<CanonicalResult, ScoreError>> {
        stream::iter(items)
            .map(|item| self.score_one(item, config))
            .buffer_unordered(config.concurrency.max(1))
            .collect()
            .await
    }

    fn assemble(
        &self,
        item: &ScoreItem,
        network: &str,
        policy: Option<visionrisk_types::RawPolicy>,
        earliest_ms: Option<i64>,
        neighbor_summary: Option<NeighborSummary>,
        now_ms: i64,
    ) -> RawScore {
        let mut feats = policy
            .as_ref()
            .and_then(|p| p.feats().map(Feats::from_upstream))
            .unwrap_or_default();

        // Locally derived age wins over whatever the policy payload carried.
        if let Some(earliest) = earliest_ms {
            feats.age_days = Some((((now_ms - earliest) as f64) / MS_PER_DAY).round().max(0.0));
        }
        if let Some(summary) = &neighbor_summary {
            if feats.local.neighbor_avg_tx.is_none() {
                feats.local.neighbor_avg_tx = Some(summary.avg_tx);
            }
            if feats.local.neighbor_avg_age_days.is_none() {
                feats.local.neighbor_avg_age_days = Some(summary.avg_days);
            }
        }

        RawScore {
            id: item.id.clone(),
            network: network.to_string(),
            policy,
            feats,
            neighbor_summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use visionrisk_client::StaticRiskSource;
    use visionrisk_types::{NeighborGraph, NeighborRecord};

    const DAY_MS: i64 = 86_400_000;

    fn orchestrator(source: StaticRiskSource) -> Orchestrator {
        Orchestrator::new(Arc::new(source))
    }

    #[tokio::test]
    async fn scores_with_server_verdict() {
        let orch = orchestrator(
            StaticRiskSource::new().with_policy("0xa", json!({ "risk_score": 72 })),
        );
        let result = orch
            .score_one(&ScoreItem::new("0xa", "eth"), &WorkerConfig::default())
            .await
            .expect("scored");

        assert_eq!(result.score, 72.0);
        assert!(!result.blocked);
        assert_eq!(result.network, "eth");
    }

    #[tokio::test]
    async fn full_outage_degrades_to_baseline() {
        let orch = orchestrator(StaticRiskSource::failing());
        let result = orch
            .score_one(&ScoreItem::new("0xa", "eth"), &WorkerConfig::default())
            .await
            .expect("degraded, not failed");

        assert_eq!(result.score, 55.0);
        assert!(!result.blocked);
        assert!(result.breakdown.is_empty());
        assert_eq!(result.feats.age_days, None);
    }

    #[tokio::test]
    async fn derives_age_from_earliest_transaction() {
        let now_ms = Utc::now().timestamp_millis();
        let orch = orchestrator(
            StaticRiskSource::new().with_earliest_tx("0xa", now_ms - 100 * DAY_MS),
        );
        let result = orch
            .score_one(&ScoreItem::new("0xa", "eth"), &WorkerConfig::default())
            .await
            .expect("scored");

        assert_eq!(result.feats.age_days, Some(100.0));
        let risk = result.explain.wallet_age_risk.expect("derived");
        assert!(risk > 0.8 && risk <= 1.0);
    }

    #[tokio::test]
    async fn neighbor_signals_respect_feature_flag() {
        let nodes = vec![NeighborRecord {
            id: "n0".to_string(),
            created_at: Some(Utc::now().timestamp_millis() - 400 * DAY_MS),
            last_tx_at: Some(Utc::now().timestamp_millis() - 120 * DAY_MS),
            tx_count: Some(10.0),
            labels: Vec::new(),
        }];
        let source = StaticRiskSource::new().with_neighbors(
            "0xa",
            NeighborGraph {
                nodes,
                links: Vec::new(),
            },
        );
        let orch = orchestrator(source);

        let mut config = WorkerConfig::default();
        let with_signals = orch
            .score_one(&ScoreItem::new("0xa", "eth"), &config)
            .await
            .expect("scored");
        assert_eq!(
            with_signals
                .explain
                .neighbors_dormant
                .expect("computed")
                .inactive_ratio,
            1.0
        );

        config.flags.graph_signals = false;
        let without_signals = orch
            .score_one(&ScoreItem::new("0xa", "eth"), &config)
            .await
            .expect("scored");
        assert!(without_signals.explain.neighbors_dormant.is_none());
    }

    #[tokio::test]
    async fn empty_network_falls_back_to_configured_network() {
        let orch = orchestrator(StaticRiskSource::new());
        let result = orch
            .score_one(&ScoreItem::new("0xa", ""), &WorkerConfig::default())
            .await
            .expect("scored");
        assert_eq!(result.network, "eth");
    }

    #[tokio::test]
    async fn batch_isolates_item_failures() {
        let orch = orchestrator(
            StaticRiskSource::new().with_policy("0xa", json!({ "risk_score": 30 })),
        );
        let items = vec![
            ScoreItem::new("0xa", "eth"),
            ScoreItem::new("", "eth"),
            ScoreItem::new("0xb", "eth"),
        ];
        let results = orch.score_batch(&items, &WorkerConfig::default()).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }
}
