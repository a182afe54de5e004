//! VisionRisk core engine.
//!
//! Pure, deterministic logic with no I/O: the feature reconciler merges an
//! untrusted policy verdict with local heuristics into one canonical result,
//! the neighbor aggregator summarizes 1-hop neighbor records, the breakdown
//! builder ranks score-contributing factors, and the narrative generator
//! turns the reconciled explanation into text, badges, and a factor table.
//!
//! Everything here is a function of its inputs; calling any operation twice
//! on the same data yields identical output.

#![deny(unsafe_code)]

mod breakdown;
mod narrative;
mod neighbors;
mod reconcile;

pub use breakdown::{build_breakdown, is_sanction_reason};
pub use narrative::narrate;
pub use neighbors::{
    summarize, INACTIVITY_THRESHOLD_DAYS, OLD_WALLET_THRESHOLD_DAYS, RESURRECTION_WINDOW_DAYS,
};
pub use reconcile::reconcile;
