//! Neighbor aggregation: summary statistics over 1-hop neighbor records.

use visionrisk_types::{NeighborRecord, NeighborSummary};

/// A wallet is "aged" once it has existed for a year.
pub const OLD_WALLET_THRESHOLD_DAYS: f64 = 365.0;
/// An aged wallet with no activity for this long counts as dormant.
pub const INACTIVITY_THRESHOLD_DAYS: f64 = 90.0;
/// An aged wallet active within this window counts as resurrected.
pub const RESURRECTION_WINDOW_DAYS: f64 = 30.0;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Labels that mark a neighbor as a known-safe counterparty.
const WHITELIST_LABELS: &[&str] = &["exchange", "custody", "cold_storage", "known_safe"];

/// Summarize a neighbor set as of `now_ms` (epoch milliseconds).
///
/// An empty set yields the zero summary (`n == 0`, `avg_inactive_age: None`);
/// no output field is ever NaN or infinite.
pub fn summarize(neighbors: &[NeighborRecord], now_ms: i64) -> NeighborSummary {
    if neighbors.is_empty() {
        return NeighborSummary::default();
    }

    let total = neighbors.len() as f64;
    let mut dormant_count = 0u32;
    let mut dormant_age_sum = 0.0;
    let mut resurrected = 0u32;
    let mut whitelisted = 0u32;
    let mut tx_sum = 0.0;
    let mut tx_n = 0u32;
    let mut age_sum = 0.0;
    let mut age_n = 0u32;

    for record in neighbors {
        // Missing creation time reads as age 0; missing last activity reads
        // as never active.
        let age_days = record
            .created_at
            .map(|t| days_since(now_ms, t))
            .unwrap_or(0.0);
        let idle_days = record
            .last_tx_at
            .map(|t| days_since(now_ms, t))
            .unwrap_or(f64::INFINITY);

        let aged = age_days >= OLD_WALLET_THRESHOLD_DAYS;
        if aged && idle_days >= INACTIVITY_THRESHOLD_DAYS {
            dormant_count += 1;
            dormant_age_sum += age_days;
        }
        if aged && idle_days <= RESURRECTION_WINDOW_DAYS {
            resurrected += 1;
        }

        if record
            .labels
            .iter()
            .any(|label| WHITELIST_LABELS.iter().any(|w| label.eq_ignore_ascii_case(w)))
        {
            whitelisted += 1;
        }

        if let Some(count) = record.tx_count.filter(|c| c.is_finite()) {
            tx_sum += count;
            tx_n += 1;
        }
        if record.created_at.is_some() {
            age_sum += age_days;
            age_n += 1;
        }
    }

    NeighborSummary {
        inactive_ratio: dormant_count as f64 / total,
        avg_inactive_age: Some(if dormant_count > 0 {
            dormant_age_sum / dormant_count as f64
        } else {
            0.0
        }),
        resurrected,
        whitelist_pct: whitelisted as f64 / total,
        n: neighbors.len() as u32,
        avg_tx: if tx_n > 0 { tx_sum / tx_n as f64 } else { 0.0 },
        avg_days: if age_n > 0 { age_sum / age_n as f64 } else { 0.0 },
    }
}

fn days_since(now_ms: i64, then_ms: i64) -> f64 {
    ((now_ms - then_ms) as f64 / MS_PER_DAY).max(0.0)
}
