//! Deterministic in-memory data source used for tests and demos.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use visionrisk_types::{NeighborGraph, RawPolicy};

use crate::{ClientError, RiskDataSource};

/// In-memory [`RiskDataSource`] with fixed per-address fixtures.
///
/// Addresses without a policy fixture read as a 404 from the check service,
/// which exercises the orchestrator's degradation path. `failing()` builds a
/// source whose every call errors, simulating a full upstream outage.
#[derive(Default)]
pub struct StaticRiskSource {
    policies: RwLock<HashMap<String, RawPolicy>>,
    earliest_txs: RwLock<HashMap<String, i64>>,
    neighbor_graphs: RwLock<HashMap<String, NeighborGraph>>,
    outage: bool,
}

impl StaticRiskSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source where every upstream call fails with a 503.
    pub fn failing() -> Self {
        Self {
            outage: true,
            ..Self::default()
        }
    }

    pub fn with_policy(self, address: impl Into<String>, policy: Value) -> Self {
        if let Ok(mut policies) = self.policies.write() {
            policies.insert(address.into(), RawPolicy::new(policy));
        }
        self
    }

    pub fn with_earliest_tx(self, address: impl Into<String>, timestamp_ms: i64) -> Self {
        if let Ok(mut txs) = self.earliest_txs.write() {
            txs.insert(address.into(), timestamp_ms);
        }
        self
    }

    pub fn with_neighbors(self, address: impl Into<String>, graph: NeighborGraph) -> Self {
        if let Ok(mut graphs) = self.neighbor_graphs.write() {
            graphs.insert(address.into(), graph);
        }
        self
    }

    fn check_outage(&self, endpoint: &str) -> Result<(), ClientError> {
        if self.outage {
            return Err(ClientError::Status {
                endpoint: endpoint.to_string(),
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RiskDataSource for StaticRiskSource {
    async fn check(&self, address: &str, _network: &str) -> Result<RawPolicy, ClientError> {
        self.check_outage("check")?;
        self.policies
            .read()
            .ok()
            .and_then(|policies| policies.get(address).cloned())
            .ok_or_else(|| ClientError::Status {
                endpoint: "check".to_string(),
                status: 404,
            })
    }

    async fn earliest_tx_ms(
        &self,
        address: &str,
        _network: &str,
    ) -> Result<Option<i64>, ClientError> {
        self.check_outage("txs")?;
        Ok(self
            .earliest_txs
            .read()
            .ok()
            .and_then(|txs| txs.get(address).copied()))
    }

    async fn neighbors(
        &self,
        address: &str,
        _network: &str,
        _hop: u32,
        limit: u32,
    ) -> Result<NeighborGraph, ClientError> {
        self.check_outage("neighbors")?;
        let mut graph = self
            .neighbor_graphs
            .read()
            .ok()
            .and_then(|graphs| graphs.get(address).cloned())
            .unwrap_or_default();
        graph.nodes.truncate(limit as usize);
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use visionrisk_types::NeighborRecord;

    #[tokio::test]
    async fn fixtures_round_trip() {
        let source = StaticRiskSource::new()
            .with_policy("0xa", json!({ "risk_score": 20 }))
            .with_earliest_tx("0xa", 1_600_000_000_000);

        let policy = source.check("0xa", "eth").await.expect("policy fixture");
        assert_eq!(policy.risk_score(), Some(20.0));
        assert_eq!(
            source.earliest_tx_ms("0xa", "eth").await.expect("tx fixture"),
            Some(1_600_000_000_000)
        );
        assert!(source.check("0xb", "eth").await.is_err());
    }

    #[tokio::test]
    async fn neighbor_limit_is_enforced() {
        let nodes = (0..10)
            .map(|i| NeighborRecord {
                id: format!("n{i}"),
                ..Default::default()
            })
            .collect();
        let source = StaticRiskSource::new().with_neighbors(
            "0xa",
            NeighborGraph {
                nodes,
                links: Vec::new(),
            },
        );

        let graph = source
            .neighbors("0xa", "eth", 1, 3)
            .await
            .expect("neighbors");
        assert_eq!(graph.nodes.len(), 3);
    }

    #[tokio::test]
    async fn outage_source_fails_every_call() {
        let source = StaticRiskSource::failing();
        assert!(source.check("0xa", "eth").await.is_err());
        assert!(source.earliest_tx_ms("0xa", "eth").await.is_err());
        assert!(source.neighbors("0xa", "eth", 1, 10).await.is_err());
    }
}
