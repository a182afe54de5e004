//! Narrative generator: reconciled explain data to text, badges, and factors.

use visionrisk_types::{Badge, BadgeLevel, Explain, Narrative, Tone};

const DORMANT_RATIO_THRESHOLD: f64 = 0.6;
const YOUNG_WALLET_THRESHOLD: f64 = 0.6;
const LONG_STANDING_THRESHOLD: f64 = 0.2;
const HIGH_VOLUME_THRESHOLD: f64 = 200.0;
const MAX_FACTORS: usize = 5;

/// Generate the narrative for a reconciled explanation.
///
/// Deterministic given its inputs. Consumes only already-reconciled data;
/// raw-feature backfill happens in the reconciler, never here.
pub fn narrate(explain: &Explain, tone: Tone) -> Narrative {
    let mut clauses: Vec<String> = Vec::new();

    let young_wallet = explain
        .wallet_age_risk
        .map(|risk| risk >= YOUNG_WALLET_THRESHOLD)
        .unwrap_or(false);
    if young_wallet {
        clauses.push("newly created".to_string());
    } else if explain
        .wallet_age_risk
        .map(|risk| risk <= LONG_STANDING_THRESHOLD)
        .unwrap_or(false)
    {
        clauses.push("long-standing".to_string());
    }

    let dormant = explain.neighbors_dormant.as_ref();
    let dormant_cluster = dormant
        .map(|d| d.inactive_ratio >= DORMANT_RATIO_THRESHOLD)
        .unwrap_or(false);
    if dormant_cluster {
        let mut clause = "connected to multiple dormant aged wallets".to_string();
        if dormant.map(|d| d.resurrected > 0).unwrap_or(false) {
            clause.push_str(" (including recently re-activated addresses)");
        }
        clauses.push(clause);
    }

    let high_volume = explain
        .neighbors_avg_tx_count
        .as_ref()
        .map(|v| v.avg_tx >= HIGH_VOLUME_THRESHOLD)
        .unwrap_or(false);
    if high_volume {
        clauses.push("in a high-volume counterparty cluster".to_string());
    }

    if explain.mixer_link {
        clauses.push("with adjacency to mixer infrastructure".to_string());
    }

    let mut text = if clauses.is_empty() {
        "This wallet is under assessment.".to_string()
    } else {
        format!("This wallet is {}.", clauses.join(", "))
    };
    if !explain.ofac_hit {
        text.push_str(" No direct OFAC link was found.");
    }

    if tone == Tone::Consumer {
        text = text
            .replacen("This wallet is", "Unusual pattern: this wallet", 1)
            .replace(" No direct OFAC link was found.", "");
    }

    // Badge order is fixed; the OFAC verdict badge is always present, always last.
    let mut badges = Vec::new();
    if dormant_cluster {
        badges.push(Badge::new("Dormant Cluster", BadgeLevel::Risk));
    }
    if young_wallet {
        badges.push(Badge::new("Young Wallet", BadgeLevel::Warn));
    }
    if high_volume {
        badges.push(Badge::new("High Counterparty Volume", BadgeLevel::Warn));
    }
    badges.push(if explain.ofac_hit {
        Badge::new("OFAC", BadgeLevel::Risk)
    } else {
        Badge::new("No OFAC", BadgeLevel::Safe)
    });

    let mut factors = explain.factor_impacts.clone();
    factors.sort_by(|a, b| b.delta.cmp(&a.delta));
    factors.truncate(MAX_FACTORS);

    Narrative {
        text,
        badges,
        factors,
    }
}
