//! Reconciled explanation structure consumed by the narrative layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::policy::{as_finite_f64, is_truthy, string_list};
use crate::result::BreakdownEntry;

/// Dormant-neighbor cluster statistics.
///
/// When backfilled from a flat proxy ratio rather than computed from real
/// neighbor records, the unknown sub-fields are explicitly null/zero so
/// renderers can tell "computed but zero" from "not computed".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DormantNeighbors {
    pub inactive_ratio: f64,
    pub avg_inactive_age: Option<f64>,
    pub resurrected: u32,
    pub whitelist_pct: f64,
    pub n: Option<u32>,
}

/// Average transaction volume across neighbors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NeighborTxVolume {
    pub avg_tx: f64,
    pub n: Option<u32>,
}

/// Average neighbor wallet age in days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NeighborAge {
    pub avg_days: f64,
    pub n: Option<u32>,
}

/// The canonical explanation attached to every scoring result.
///
/// `ofac_hit` is monotonic: once any contributing signal sets it, no merge
/// step unsets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Explain {
    pub reasons: Vec<String>,
    pub ofac_hit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_age_risk: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbors_dormant: Option<DormantNeighbors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbors_avg_tx_count: Option<NeighborTxVolume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbors_avg_age: Option<NeighborAge>,
    pub mixer_link: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub factor_impacts: Vec<BreakdownEntry>,
}

impl Explain {
    /// Shallow-copy an upstream explain object, reading every field
    /// defensively. Wrong-typed fields read as absent.
    pub fn from_upstream(v: &Value) -> Self {
        Self {
            reasons: string_list(v.get("reasons")).unwrap_or_default(),
            ofac_hit: v.get("ofacHit").map(is_truthy).unwrap_or(false),
            wallet_age_risk: v.get("walletAgeRisk").and_then(as_finite_f64),
            neighbors_dormant: v.get("neighborsDormant").and_then(dormant_from_value),
            neighbors_avg_tx_count: v
                .get("neighborsAvgTxCount")
                .and_then(|v| v.get("avgTx"))
                .and_then(as_finite_f64)
                .map(|avg_tx| NeighborTxVolume {
                    avg_tx,
                    n: count_field(v.get("neighborsAvgTxCount")),
                }),
            neighbors_avg_age: v
                .get("neighborsAvgAge")
                .and_then(|v| v.get("avgDays"))
                .and_then(as_finite_f64)
                .map(|avg_days| NeighborAge {
                    avg_days,
                    n: count_field(v.get("neighborsAvgAge")),
                }),
            mixer_link: v.get("mixerLink").map(is_truthy).unwrap_or(false),
            factor_impacts: factor_impacts_from_value(v.get("factorImpacts")),
        }
    }
}

fn dormant_from_value(v: &Value) -> Option<DormantNeighbors> {
    let inactive_ratio = v.get("inactiveRatio").and_then(as_finite_f64)?;
    Some(DormantNeighbors {
        inactive_ratio: inactive_ratio.clamp(0.0, 1.0),
        avg_inactive_age: v.get("avgInactiveAge").and_then(as_finite_f64),
        resurrected: v
            .get("resurrected")
            .and_then(Value::as_u64)
            .map(|n| n.min(u32::MAX as u64) as u32)
            .unwrap_or(0),
        whitelist_pct: v
            .get("whitelistPct")
            .and_then(as_finite_f64)
            .unwrap_or(0.0)
            .clamp(0.0, 1.0),
        n: count_field(Some(v)),
    })
}

fn count_field(v: Option<&Value>) -> Option<u32> {
    v?.get("n")
        .and_then(Value::as_u64)
        .map(|n| n.min(u32::MAX as u64) as u32)
}

fn factor_impacts_from_value(v: Option<&Value>) -> Vec<BreakdownEntry> {
    let Some(items) = v.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let label = item.get("label")?.as_str()?.to_owned();
            let delta = item
                .get("delta")
                .and_then(as_finite_f64)
                .unwrap_or(0.0)
                .round() as i64;
            Some(BreakdownEntry { label, delta })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_upstream_reads_structured_fields() {
        let explain = Explain::from_upstream(&json!({
            "reasons": ["fan In High"],
            "ofacHit": true,
            "walletAgeRisk": 0.8,
            "neighborsDormant": { "inactiveRatio": 0.7, "resurrected": 2, "n": 40 },
            "neighborsAvgTxCount": { "avgTx": 250.0, "n": 40 },
            "mixerLink": true,
        }));

        assert_eq!(explain.reasons, vec!["fan In High".to_string()]);
        assert!(explain.ofac_hit);
        assert_eq!(explain.wallet_age_risk, Some(0.8));
        let dormant = explain.neighbors_dormant.expect("dormant parsed");
        assert_eq!(dormant.inactive_ratio, 0.7);
        assert_eq!(dormant.resurrected, 2);
        assert_eq!(dormant.n, Some(40));
        assert!(explain.mixer_link);
    }

    #[test]
    fn from_upstream_drops_malformed_fields() {
        let explain = Explain::from_upstream(&json!({
            "walletAgeRisk": "high",
            "neighborsDormant": { "inactiveRatio": "lots" },
            "factorImpacts": [{ "label": "x", "delta": 3.4 }, { "delta": 1 }],
        }));

        assert_eq!(explain.wallet_age_risk, None);
        assert!(explain.neighbors_dormant.is_none());
        assert_eq!(explain.factor_impacts.len(), 1);
        assert_eq!(explain.factor_impacts[0].delta, 3);
    }

    #[test]
    fn dormant_ratio_is_clamped() {
        let explain = Explain::from_upstream(&json!({
            "neighborsDormant": { "inactiveRatio": 3.5 },
        }));
        assert_eq!(
            explain.neighbors_dormant.expect("parsed").inactive_ratio,
            1.0
        );
    }
}
