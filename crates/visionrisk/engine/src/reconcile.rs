//! Feature reconciler: one canonical result from a heterogeneous payload.
//!
//! This is the single place where conflicting signals are resolved and
//! missing explanatory features are derived. Downstream consumers (narrative,
//! breakdown rendering) only ever see reconciled data and never re-derive
//! from raw features.

use tracing::debug;
use visionrisk_types::{
    clamp01, CanonicalResult, DormantNeighbors, Explain, NeighborAge, NeighborTxVolume, RawPolicy,
    RawScore,
};

use crate::breakdown::{build_breakdown, is_sanction_reason};

/// A wallet two years old carries zero age risk.
const AGE_RISK_HORIZON_DAYS: f64 = 730.0;

/// Reconcile a raw scoring payload into the canonical result.
///
/// Pure function: no I/O, no hidden state, idempotent over its inputs.
/// `baseline_score` is the configurable "no information, assume moderate"
/// fallback used when upstream supplies no numeric verdict at all.
pub fn reconcile(raw: &RawScore, baseline_score: f64) -> CanonicalResult {
    let policy = raw.policy.as_ref();
    let risk_score = policy.and_then(RawPolicy::risk_score);
    let legacy_score = policy.and_then(RawPolicy::score);
    let sanction_hit = policy.map(RawPolicy::sanction_hit).unwrap_or(false);
    let block_flag = policy.map(RawPolicy::block).unwrap_or(false);

    // Policy always wins over local heuristics; the baseline only applies
    // when the server said nothing numeric.
    let mut score = risk_score
        .or(legacy_score)
        .unwrap_or(baseline_score)
        .clamp(0.0, 100.0);
    let blocked = block_flag || risk_score == Some(100.0) || sanction_hit || score >= 100.0;
    if blocked {
        score = 100.0;
    }

    let mut explain = match policy.and_then(RawPolicy::explain) {
        Some(upstream) => Explain::from_upstream(upstream),
        None => Explain::default(),
    };
    if explain.reasons.is_empty() {
        explain.reasons = policy.map(RawPolicy::reasons).unwrap_or_default();
    }

    // Monotonic: any contributing signal sets the hit; none ever clears it.
    let reason_hit = explain.reasons.iter().any(|r| is_sanction_reason(r));
    explain.ofac_hit = explain.ofac_hit || blocked || reason_hit || sanction_hit;

    backfill_explain(&mut explain, raw);

    let breakdown = build_breakdown(&explain.reasons, blocked);

    debug!(
        id = %raw.id,
        network = %raw.network,
        score,
        blocked,
        reasons = explain.reasons.len(),
        "reconciled scoring payload"
    );

    CanonicalResult {
        id: raw.id.clone(),
        network: raw.network.clone(),
        score,
        blocked,
        breakdown,
        explain,
        feats: raw.feats.clone(),
    }
}

/// Derive explain sub-fields the upstream payload omitted. Upstream values
/// always take precedence; heuristics fill gaps only.
fn backfill_explain(explain: &mut Explain, raw: &RawScore) {
    if explain.wallet_age_risk.is_none() {
        if let Some(days) = raw.feats.age_days.filter(|d| d.is_finite() && *d >= 0.0) {
            // Younger wallet, higher risk: 0 at 2y+, ~0.5 at 1y, ~1 brand-new.
            explain.wallet_age_risk = Some(clamp01(1.0 - (days / AGE_RISK_HORIZON_DAYS).min(1.0)));
        }
    }

    if explain.neighbors_dormant.is_none() {
        if let Some(summary) = &raw.neighbor_summary {
            explain.neighbors_dormant = Some(DormantNeighbors {
                inactive_ratio: clamp01(summary.inactive_ratio),
                avg_inactive_age: summary.avg_inactive_age,
                resurrected: summary.resurrected,
                whitelist_pct: clamp01(summary.whitelist_pct),
                n: Some(summary.n),
            });
        } else if let Some(ratio) = raw.feats.local.risky_neighbor_ratio {
            // Proxy until a real dormant ratio is computed; unknown sub-fields
            // are explicit null/zero, not omitted.
            explain.neighbors_dormant = Some(DormantNeighbors {
                inactive_ratio: clamp01(ratio),
                avg_inactive_age: None,
                resurrected: 0,
                whitelist_pct: 0.0,
                n: None,
            });
        }
    }

    if explain.neighbors_avg_tx_count.is_none() {
        if let Some(summary) = &raw.neighbor_summary {
            explain.neighbors_avg_tx_count = Some(NeighborTxVolume {
                avg_tx: summary.avg_tx,
                n: Some(summary.n),
            });
        } else if let Some(avg_tx) = raw.feats.local.neighbor_avg_tx {
            explain.neighbors_avg_tx_count = Some(NeighborTxVolume {
                avg_tx: avg_tx.max(0.0),
                n: None,
            });
        }
    }

    if explain.neighbors_avg_age.is_none() {
        if let Some(summary) = &raw.neighbor_summary {
            explain.neighbors_avg_age = Some(NeighborAge {
                avg_days: summary.avg_days,
                n: Some(summary.n),
            });
        } else if let Some(avg_days) = raw.feats.local.neighbor_avg_age_days {
            explain.neighbors_avg_age = Some(NeighborAge {
                avg_days: avg_days.max(0.0),
                n: None,
            });
        }
    }
}
