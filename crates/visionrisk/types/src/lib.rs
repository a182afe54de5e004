//! Shared data model for the VisionRisk scoring pipeline.
//!
//! Everything that crosses a crate boundary lives here: score request items,
//! untrusted upstream payloads, neighbor records and their aggregates, the
//! canonical reconciled result, narrative output, and immutable worker
//! configuration snapshots.

#![deny(unsafe_code)]

mod config;
mod explain;
mod neighbor;
mod narrative;
mod policy;
mod result;

pub use config::{ConfigUpdate, FeatureFlags, WorkerConfig};
pub use explain::{DormantNeighbors, Explain, NeighborAge, NeighborTxVolume};
pub use narrative::{Badge, BadgeLevel, Narrative, Tone};
pub use neighbor::{NeighborGraph, NeighborLink, NeighborRecord, NeighborSummary};
pub use policy::RawPolicy;
pub use result::{
    BreakdownEntry, CanonicalResult, Feats, ItemError, LocalFeats, RawScore, ScoreItem,
};

/// Clamp a value to the `[0, 1]` range used by all ratio-valued fields.
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}
