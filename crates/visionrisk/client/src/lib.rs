//! Remote data sources for the VisionRisk scoring pipeline.
//!
//! The orchestrator consumes the [`RiskDataSource`] trait; failures are
//! surfaced as [`ClientError`] and mapped to documented fallbacks by the
//! caller, never treated as fatal. [`HttpRiskSource`] talks to the real
//! policy/check, transaction, and neighbor services; [`StaticRiskSource`] is
//! the deterministic in-memory implementation used for tests and demos.

#![deny(unsafe_code)]

mod http;
mod memory;

pub use http::HttpRiskSource;
pub use memory::StaticRiskSource;

use async_trait::async_trait;
use thiserror::Error;
use visionrisk_types::{NeighborGraph, RawPolicy, WorkerConfig};

/// External data needed to score one address.
#[async_trait]
pub trait RiskDataSource: Send + Sync {
    /// Fetch the policy/check verdict for `(address, network)`.
    async fn check(&self, address: &str, network: &str) -> Result<RawPolicy, ClientError>;

    /// Fetch the earliest transaction timestamp (epoch ms) for age derivation.
    /// `Ok(None)` means the address has no recorded transactions.
    async fn earliest_tx_ms(
        &self,
        address: &str,
        network: &str,
    ) -> Result<Option<i64>, ClientError>;

    /// Fetch up to `limit` neighbor records at the given hop depth.
    async fn neighbors(
        &self,
        address: &str,
        network: &str,
        hop: u32,
        limit: u32,
    ) -> Result<NeighborGraph, ClientError>;

    /// Apply a new configuration snapshot between requests. Default: no-op.
    fn reconfigure(&self, _config: &WorkerConfig) {}
}

/// Data source errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },

    #[error("no data for {0}")]
    NotFound(String),
}
