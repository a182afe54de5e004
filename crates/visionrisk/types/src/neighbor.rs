//! One-hop neighbor records and their aggregate summary.

use serde::{Deserialize, Serialize};

/// A single neighbor address as returned by the neighbor-fetch service.
///
/// Timestamps are epoch milliseconds. Every field except the id is optional
/// upstream; lenient defaults keep a partially-populated record usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NeighborRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tx_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_count: Option<f64>,
    pub labels: Vec<String>,
}

/// Edge between two addresses in the neighbor graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborLink {
    pub a: String,
    pub b: String,
    pub weight: f64,
}

/// Result of a NEIGHBORS fetch: nodes plus the edges between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborGraph {
    pub nodes: Vec<NeighborRecord>,
    pub links: Vec<NeighborLink>,
}

/// Aggregate statistics over a neighbor set.
///
/// Recomputed on every scoring request; never cached. All ratios are within
/// `[0, 1]` and no field is ever NaN or infinite. `avg_inactive_age` is `None`
/// only when there were no neighbors at all ("not computed"), and `Some(0.0)`
/// when neighbors exist but none are dormant ("computed but zero").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborSummary {
    pub inactive_ratio: f64,
    pub avg_inactive_age: Option<f64>,
    pub resurrected: u32,
    pub whitelist_pct: f64,
    pub n: u32,
    pub avg_tx: f64,
    pub avg_days: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn neighbor_record_tolerates_sparse_json() {
        let record: NeighborRecord =
            serde_json::from_value(json!({ "id": "0xabc" })).expect("sparse record parses");
        assert_eq!(record.id, "0xabc");
        assert_eq!(record.created_at, None);
        assert_eq!(record.tx_count, None);
        assert!(record.labels.is_empty());
    }

    #[test]
    fn neighbor_record_reads_camel_case_fields() {
        let record: NeighborRecord = serde_json::from_value(json!({
            "id": "0xabc",
            "createdAt": 1_700_000_000_000i64,
            "lastTxAt": 1_701_000_000_000i64,
            "txCount": 12,
            "labels": ["exchange"],
        }))
        .expect("full record parses");
        assert_eq!(record.created_at, Some(1_700_000_000_000));
        assert_eq!(record.tx_count, Some(12.0));
        assert_eq!(record.labels, vec!["exchange".to_string()]);
    }
}
