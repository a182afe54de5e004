//! Untrusted policy payloads from the remote check service.
//!
//! Any field of the `/check` response may be absent, wrong-typed, or
//! contradictory across service versions. All access goes through type-checked
//! accessors with a documented fallback; a malformed field reads as absent and
//! is never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw `/check` response, kept as unvalidated JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPolicy(pub Value);

impl RawPolicy {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Hard-block flag. Missing or non-boolean reads as `false`.
    pub fn block(&self) -> bool {
        self.0.get("block").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Server risk score, if numeric.
    pub fn risk_score(&self) -> Option<f64> {
        self.0.get("risk_score").and_then(as_finite_f64)
    }

    /// Legacy `score` field, if numeric.
    pub fn score(&self) -> Option<f64> {
        self.0.get("score").and_then(as_finite_f64)
    }

    /// Categorical risk reasons; falls back to `risk_factors`, then empty.
    pub fn reasons(&self) -> Vec<String> {
        string_list(self.0.get("reasons"))
            .or_else(|| string_list(self.0.get("risk_factors")))
            .unwrap_or_default()
    }

    /// Whether the payload carries an explicit sanction-hit signal under any
    /// of the field names upstream has used (`sanctionHits`, `ofac`,
    /// `sanctioned`).
    pub fn sanction_hit(&self) -> bool {
        ["sanctionHits", "ofac", "sanctioned"]
            .iter()
            .any(|key| self.0.get(*key).map(is_truthy).unwrap_or(false))
    }

    /// Structured explain object, when upstream supplies one.
    pub fn explain(&self) -> Option<&Value> {
        self.0.get("explain").filter(|v| v.is_object())
    }

    /// Feature bag (`ageDays`, `mixerTaint`, `local.*`), when present.
    pub fn feats(&self) -> Option<&Value> {
        self.0.get("feats").filter(|v| v.is_object())
    }
}

/// Numeric read that rejects NaN/infinity along with non-numbers.
pub(crate) fn as_finite_f64(v: &Value) -> Option<f64> {
    v.as_f64().filter(|n| n.is_finite())
}

/// Read a JSON array of strings, skipping non-string elements. `None` when the
/// field is absent or not an array.
pub(crate) fn string_list(v: Option<&Value>) -> Option<Vec<String>> {
    let items = v?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|i| i.as_str().map(str::to_owned))
            .collect(),
    )
}

/// JavaScript-style truthiness for signal flags that have shipped as booleans,
/// counts, and arrays at different times.
pub(crate) fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrong_typed_fields_read_as_absent() {
        let policy = RawPolicy::new(json!({
            "block": "yes",
            "risk_score": "85",
            "reasons": "not-a-list",
            "risk_factors": ["fan In High", 7],
        }));

        assert!(!policy.block());
        assert_eq!(policy.risk_score(), None);
        assert_eq!(policy.reasons(), vec!["fan In High".to_string()]);
    }

    #[test]
    fn sanction_hit_accepts_any_known_field_name() {
        assert!(RawPolicy::new(json!({ "sanctionHits": 2 })).sanction_hit());
        assert!(RawPolicy::new(json!({ "ofac": true })).sanction_hit());
        assert!(RawPolicy::new(json!({ "sanctioned": true })).sanction_hit());
        assert!(!RawPolicy::new(json!({ "sanctionHits": 0 })).sanction_hit());
        assert!(!RawPolicy::new(json!({})).sanction_hit());
    }

    #[test]
    fn non_finite_scores_are_rejected() {
        let policy = RawPolicy::new(json!({ "risk_score": 72.5 }));
        assert_eq!(policy.risk_score(), Some(72.5));
        assert_eq!(RawPolicy::default().risk_score(), None);
    }

    #[test]
    fn explain_must_be_an_object() {
        assert!(RawPolicy::new(json!({ "explain": { "ofacHit": true } }))
            .explain()
            .is_some());
        assert!(RawPolicy::new(json!({ "explain": "n/a" })).explain().is_none());
    }
}
