//! Score request items, raw scoring payloads, and the canonical result.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::explain::Explain;
use crate::neighbor::NeighborSummary;
use crate::policy::{as_finite_f64, RawPolicy};

/// One address to score. Created per graph node when a scoring pass is
/// triggered; immutable; discarded after use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreItem {
    pub id: String,
    #[serde(default)]
    pub network: String,
}

impl ScoreItem {
    pub fn new(id: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            network: network.into(),
        }
    }

    /// Reject items without a usable address id.
    pub fn validate(&self) -> Result<(), ItemError> {
        if self.id.trim().is_empty() {
            return Err(ItemError::EmptyAddress);
        }
        Ok(())
    }
}

/// Score item validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemError {
    #[error("address id must be non-empty")]
    EmptyAddress,
}

/// Flattened local heuristic proxies, used when the structured neighbor
/// summary is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalFeats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risky_neighbor_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbor_avg_tx: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbor_avg_age_days: Option<f64>,
}

/// Per-address feature bag.
///
/// `age_days` is `None` when the age lookup failed or returned nothing, which
/// keeps the wallet-age heuristic from treating an unknown wallet as
/// brand-new.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Feats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_days: Option<f64>,
    pub mixer_taint: f64,
    pub local: LocalFeats,
}

impl Feats {
    /// Defensive read of an upstream `feats` object.
    pub fn from_upstream(v: &Value) -> Self {
        let local = v.get("local");
        Self {
            age_days: v
                .get("ageDays")
                .and_then(as_finite_f64)
                .filter(|d| *d >= 0.0),
            mixer_taint: v
                .get("mixerTaint")
                .and_then(as_finite_f64)
                .unwrap_or(0.0)
                .clamp(0.0, 1.0),
            local: LocalFeats {
                risky_neighbor_ratio: local
                    .and_then(|l| l.get("riskyNeighborRatio"))
                    .and_then(as_finite_f64),
                neighbor_avg_tx: local
                    .and_then(|l| l.get("neighborAvgTx"))
                    .and_then(as_finite_f64),
                neighbor_avg_age_days: local
                    .and_then(|l| l.get("neighborAvgAgeDays"))
                    .and_then(as_finite_f64),
            },
        }
    }
}

/// Raw scoring payload assembled by the orchestrator: the untrusted policy
/// verdict plus everything derived locally. Input to the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawScore {
    pub id: String,
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<RawPolicy>,
    pub feats: Feats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbor_summary: Option<NeighborSummary>,
}

/// One named factor contributing to the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub delta: i64,
}

impl BreakdownEntry {
    pub fn new(label: impl Into<String>, delta: i64) -> Self {
        Self {
            label: label.into(),
            delta,
        }
    }
}

/// The single reconciled risk record per address, authoritative for display.
///
/// Invariant: `score == 100.0` implies `blocked`. The numeric score is never
/// hidden or zeroed when blocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalResult {
    pub id: String,
    pub network: String,
    pub score: f64,
    pub blocked: bool,
    pub breakdown: Vec<BreakdownEntry>,
    pub explain: Explain,
    pub feats: Feats,
}
