//! HTTP data source over the policy/check, transaction, and neighbor services.

use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use visionrisk_types::{NeighborGraph, NeighborLink, NeighborRecord, RawPolicy, WorkerConfig};

use crate::{ClientError, RiskDataSource};

/// Epoch values below this are seconds-scale and get promoted to ms.
const EPOCH_MS_FLOOR: i64 = 100_000_000_000;

/// Data source backed by the remote HTTP services.
///
/// The API base is held behind a lock so an INIT reconfiguration between
/// requests can repoint the source without rebuilding the worker.
pub struct HttpRiskSource {
    http: reqwest::Client,
    api_base: RwLock<String>,
}

impl HttpRiskSource {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: RwLock::new(api_base.into()),
        }
    }

    async fn get_json(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ClientError> {
        let base = self
            .api_base
            .read()
            .map(|b| b.trim_end_matches('/').to_string())
            .unwrap_or_default();
        let url = format!("{base}/{endpoint}");
        debug!(%url, "fetching");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        response.json().await.map_err(|err| ClientError::Malformed {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        })
    }
}

#[async_trait]
impl RiskDataSource for HttpRiskSource {
    async fn check(&self, address: &str, network: &str) -> Result<RawPolicy, ClientError> {
        let value = self
            .get_json(
                "check",
                &[
                    ("address", address.to_string()),
                    ("network", network.to_string()),
                ],
            )
            .await?;
        Ok(RawPolicy::new(value))
    }

    async fn earliest_tx_ms(
        &self,
        address: &str,
        network: &str,
    ) -> Result<Option<i64>, ClientError> {
        let value = self
            .get_json(
                "txs",
                &[
                    ("address", address.to_string()),
                    ("network", network.to_string()),
                    ("limit", "1".to_string()),
                    ("sort", "asc".to_string()),
                ],
            )
            .await?;
        Ok(parse_earliest_tx_ms(&value))
    }

    async fn neighbors(
        &self,
        address: &str,
        network: &str,
        hop: u32,
        limit: u32,
    ) -> Result<NeighborGraph, ClientError> {
        let value = self
            .get_json(
                "neighbors",
                &[
                    ("address", address.to_string()),
                    ("network", network.to_string()),
                    ("hop", hop.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(parse_neighbor_graph(&value))
    }

    fn reconfigure(&self, config: &WorkerConfig) {
        if let Ok(mut base) = self.api_base.write() {
            *base = config.api_base.clone();
        }
    }
}

/// Pull the earliest transaction timestamp out of a `/txs` response.
///
/// The service has returned both a bare array and `txs`/`items` envelopes;
/// record timestamps have shipped as `timestamp`, `time`, and `ts`, in either
/// seconds or milliseconds. Any unrecognized shape reads as "no data".
pub(crate) fn parse_earliest_tx_ms(value: &Value) -> Option<i64> {
    let records = value
        .as_array()
        .or_else(|| value.get("txs").and_then(Value::as_array))
        .or_else(|| value.get("items").and_then(Value::as_array))?;
    let first = records.first()?;

    let raw = ["timestamp", "time", "ts"]
        .iter()
        .find_map(|key| first.get(*key))
        .and_then(Value::as_f64)
        .filter(|t| t.is_finite() && *t > 0.0)? as i64;

    Some(if raw < EPOCH_MS_FLOOR { raw * 1000 } else { raw })
}

/// Lenient parse of a `/neighbors` response; malformed nodes and links are
/// skipped rather than failing the whole graph.
pub(crate) fn parse_neighbor_graph(value: &Value) -> NeighborGraph {
    let nodes = value
        .get("nodes")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<NeighborRecord>(item.clone()).ok())
                .filter(|record| !record.id.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let links = value
        .get("links")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<NeighborLink>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    NeighborGraph { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn earliest_tx_reads_bare_array() {
        let value = json!([{ "timestamp": 1_600_000_000_000i64 }]);
        assert_eq!(parse_earliest_tx_ms(&value), Some(1_600_000_000_000));
    }

    #[test]
    fn earliest_tx_reads_enveloped_records() {
        let value = json!({ "txs": [{ "time": 1_600_000_000_000i64 }] });
        assert_eq!(parse_earliest_tx_ms(&value), Some(1_600_000_000_000));
        let value = json!({ "items": [{ "ts": 1_600_000_000_000i64 }] });
        assert_eq!(parse_earliest_tx_ms(&value), Some(1_600_000_000_000));
    }

    #[test]
    fn seconds_scale_epochs_are_promoted_to_ms() {
        let value = json!([{ "timestamp": 1_600_000_000 }]);
        assert_eq!(parse_earliest_tx_ms(&value), Some(1_600_000_000_000));
    }

    #[test]
    fn unrecognized_shapes_read_as_no_data() {
        assert_eq!(parse_earliest_tx_ms(&json!({})), None);
        assert_eq!(parse_earliest_tx_ms(&json!([])), None);
        assert_eq!(parse_earliest_tx_ms(&json!([{ "timestamp": "soon" }])), None);
        assert_eq!(parse_earliest_tx_ms(&json!("down for maintenance")), None);
    }

    #[test]
    fn neighbor_graph_skips_malformed_nodes() {
        let graph = parse_neighbor_graph(&json!({
            "nodes": [
                { "id": "0xa", "txCount": 5 },
                { "txCount": "broken" },
                42,
            ],
            "links": [{ "a": "0xa", "b": "0xb", "weight": 1.0 }, "broken"],
        }));

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].id, "0xa");
        assert_eq!(graph.links.len(), 1);
    }

    #[test]
    fn missing_graph_fields_yield_empty_graph() {
        let graph = parse_neighbor_graph(&json!({ "error": "rate limited" }));
        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());
    }
}
