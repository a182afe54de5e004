//! Narrative output: generated text, categorical badges, ranked factors.

use serde::{Deserialize, Serialize};

use crate::result::BreakdownEntry;

/// Severity level attached to a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeLevel {
    Risk,
    Warn,
    Safe,
}

/// A categorical badge shown next to the narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub label: String,
    pub level: BadgeLevel,
}

impl Badge {
    pub fn new(label: impl Into<String>, level: BadgeLevel) -> Self {
        Self {
            label: label.into(),
            level,
        }
    }
}

/// Narrative tone. Consumer tone rephrases; it never adds or removes facts
/// beyond the no-OFAC trailer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Analyst,
    Consumer,
}

/// Generated risk narrative for one canonical result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub text: String,
    pub badges: Vec<Badge>,
    pub factors: Vec<BreakdownEntry>,
}
