//! Worker configuration snapshots.
//!
//! Configuration is an immutable value threaded into every orchestrator call.
//! Reconfiguration (the INIT message) produces a new snapshot via
//! [`WorkerConfig::apply`]; nothing mutates config mid-request.

use serde::{Deserialize, Serialize};

/// Feature flags controlling optional pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFlags {
    /// Fetch 1-hop neighbors and compute graph-derived signals.
    pub graph_signals: bool,
    /// Stream batch results one by one instead of collecting them.
    pub stream_batch: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            graph_signals: true,
            stream_batch: true,
        }
    }
}

/// Immutable worker configuration snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkerConfig {
    pub network: String,
    pub api_base: String,
    pub ruleset: String,
    /// Maximum simultaneous outstanding scoring calls in batch mode.
    pub concurrency: usize,
    pub neighbor_hop: u32,
    /// Upper bound on fetched 1-hop neighbor records.
    pub neighbor_limit: u32,
    /// Score used when upstream supplies no verdict at all ("no information,
    /// assume moderate").
    pub baseline_score: f64,
    pub flags: FeatureFlags,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            network: "eth".to_string(),
            api_base: String::new(),
            ruleset: "safesend-2025.10.1".to_string(),
            concurrency: 8,
            neighbor_hop: 1,
            neighbor_limit: 200,
            baseline_score: 55.0,
            flags: FeatureFlags::default(),
        }
    }
}

impl WorkerConfig {
    /// Produce a new snapshot with the update's populated fields applied.
    pub fn apply(&self, update: &ConfigUpdate) -> Self {
        let mut next = self.clone();
        if let Some(network) = &update.network {
            next.network = network.clone();
        }
        if let Some(api_base) = &update.api_base {
            next.api_base = api_base.clone();
        }
        if let Some(ruleset) = &update.ruleset {
            next.ruleset = ruleset.clone();
        }
        if let Some(concurrency) = update.concurrency {
            next.concurrency = concurrency.max(1);
        }
        if let Some(hop) = update.neighbor_hop {
            next.neighbor_hop = hop;
        }
        if let Some(limit) = update.neighbor_limit {
            next.neighbor_limit = limit;
        }
        if let Some(baseline) = update.baseline_score {
            next.baseline_score = baseline.clamp(0.0, 100.0);
        }
        if let Some(flags) = update.flags {
            next.flags = flags;
        }
        next
    }
}

/// Partial configuration carried by an INIT message. Absent fields leave the
/// current snapshot's values in place; `flags` replaces the whole flag set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigUpdate {
    pub network: Option<String>,
    pub api_base: Option<String>,
    pub ruleset: Option<String>,
    pub concurrency: Option<usize>,
    pub neighbor_hop: Option<u32>,
    pub neighbor_limit: Option<u32>,
    pub baseline_score: Option<f64>,
    pub flags: Option<FeatureFlags>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn apply_overrides_only_populated_fields() {
        let base = WorkerConfig::default();
        let update = ConfigUpdate {
            network: Some("polygon".to_string()),
            concurrency: Some(4),
            ..Default::default()
        };

        let next = base.apply(&update);
        assert_eq!(next.network, "polygon");
        assert_eq!(next.concurrency, 4);
        assert_eq!(next.ruleset, base.ruleset);
        assert_eq!(next.baseline_score, 55.0);
        // Original snapshot is untouched.
        assert_eq!(base.network, "eth");
    }

    #[test]
    fn flags_are_replaced_wholesale() {
        let base = WorkerConfig::default();
        let update = ConfigUpdate {
            flags: Some(FeatureFlags {
                graph_signals: false,
                stream_batch: false,
            }),
            ..Default::default()
        };

        let next = base.apply(&update);
        assert!(!next.flags.graph_signals);
        assert!(!next.flags.stream_batch);
    }

    #[test]
    fn update_parses_from_wire_shape() {
        let update: ConfigUpdate = serde_json::from_value(json!({
            "apiBase": "https://api.example.test",
            "flags": { "graphSignals": true, "streamBatch": false },
        }))
        .expect("update parses");

        assert_eq!(update.api_base.as_deref(), Some("https://api.example.test"));
        assert!(!update.flags.expect("flags present").stream_batch);
    }

    #[test]
    fn zero_concurrency_is_clamped_to_one() {
        let next = WorkerConfig::default().apply(&ConfigUpdate {
            concurrency: Some(0),
            ..Default::default()
        });
        assert_eq!(next.concurrency, 1);
    }
}
