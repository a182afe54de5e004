//! Breakdown builder: categorical reasons to a ranked factor table.

use visionrisk_types::BreakdownEntry;

/// Label used for the synthetic dominant factor on hard blocks.
const SANCTIONED_COUNTERPARTY: &str = "sanctioned Counterparty";

/// Whether a reason string belongs to the sanction class.
///
/// Upstream has emitted both "sanction*" and bare "OFAC" labels for the same
/// condition, so the class matches either token.
pub fn is_sanction_reason(reason: &str) -> bool {
    let lower = reason.to_ascii_lowercase();
    lower.contains("sanction") || lower.contains("ofac")
}

/// Point weight for one reason. Known structural reasons take their table
/// weight before the sanction-class pattern is consulted, so
/// "shortest Path To Sanctioned" stays at 6 rather than being promoted to 40.
fn reason_weight(reason: &str) -> i64 {
    match reason {
        "fan In High" => 9,
        "shortest Path To Sanctioned" => 6,
        // Placeholders until these carry real weights.
        "burst Anomaly" | "known Mixer Proximity" => 0,
        _ if is_sanction_reason(reason) => 40,
        _ => 0,
    }
}

/// Build the ranked factor table for a set of reasons.
///
/// A hard block must always show a dominant visible cause: when `blocked` and
/// no sanction-class reason is present, a synthetic sanctioned-counterparty
/// entry is prepended. The result is sorted descending by delta; ties keep
/// their original relative order.
pub fn build_breakdown(reasons: &[String], blocked: bool) -> Vec<BreakdownEntry> {
    let mut entries: Vec<BreakdownEntry> = reasons
        .iter()
        .map(|reason| BreakdownEntry::new(reason.clone(), reason_weight(reason)))
        .collect();

    let has_sanction_entry = entries.iter().any(|e| e.delta == 40);
    if blocked && !has_sanction_entry {
        entries.insert(0, BreakdownEntry::new(SANCTIONED_COUNTERPARTY, 40));
    }

    entries.sort_by(|a, b| b.delta.cmp(&a.delta));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_and_unblocked_yields_empty_table() {
        assert!(build_breakdown(&[], false).is_empty());
    }

    #[test]
    fn blocked_without_sanction_reason_gets_synthetic_entry() {
        let table = build_breakdown(&[], true);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0], BreakdownEntry::new("sanctioned Counterparty", 40));
    }

    #[test]
    fn known_reasons_take_table_weights() {
        let table = build_breakdown(&reasons(&["fan In High"]), false);
        assert_eq!(table, vec![BreakdownEntry::new("fan In High", 9)]);
    }

    #[test]
    fn ofac_reason_suppresses_synthetic_duplicate() {
        let table = build_breakdown(&reasons(&["OFAC"]), true);
        assert_eq!(table, vec![BreakdownEntry::new("OFAC", 40)]);
    }

    #[test]
    fn shortest_path_keeps_its_table_weight_and_triggers_synthetic() {
        // "shortest Path To Sanctioned" weighs 6; it is structural, not a
        // sanction verdict, so a hard block still adds the dominant cause.
        let table = build_breakdown(&reasons(&["shortest Path To Sanctioned"]), true);
        assert_eq!(
            table,
            vec![
                BreakdownEntry::new("sanctioned Counterparty", 40),
                BreakdownEntry::new("shortest Path To Sanctioned", 6),
            ]
        );
    }

    #[test]
    fn table_is_sorted_descending_with_stable_ties() {
        let table = build_breakdown(
            &reasons(&[
                "burst Anomaly",
                "fan In High",
                "known Mixer Proximity",
                "sanctioned Counterparty",
            ]),
            false,
        );
        assert_eq!(
            table,
            vec![
                BreakdownEntry::new("sanctioned Counterparty", 40),
                BreakdownEntry::new("fan In High", 9),
                BreakdownEntry::new("burst Anomaly", 0),
                BreakdownEntry::new("known Mixer Proximity", 0),
            ]
        );
    }

    #[test]
    fn unknown_reasons_weigh_zero() {
        let table = build_breakdown(&reasons(&["novel Heuristic"]), false);
        assert_eq!(table, vec![BreakdownEntry::new("novel Heuristic", 0)]);
    }
}
