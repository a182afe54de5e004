//! Wire protocol between the worker and the display layer.
//!
//! Messages are correlated by an opaque per-request id. A request yields
//! either one response, or (for streaming batches) a stream of RESULT_STREAM
//! frames terminated by exactly one DONE sentinel.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use visionrisk_types::{CanonicalResult, ConfigUpdate, NeighborGraph, ScoreItem};

/// Request frame sent to the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: String,
    #[serde(flatten)]
    pub request: WorkerRequest,
}

impl RequestEnvelope {
    /// Wrap a request with a fresh correlation id.
    pub fn new(request: WorkerRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            request,
        }
    }

    /// Wire representation consumed by [`crate::RiskWorker::handle`].
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Typed request body. The worker itself parses incoming frames leniently so
/// an unknown `type` becomes an ERROR response instead of a decode failure;
/// this enum is the constructor side of the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum WorkerRequest {
    #[serde(rename = "INIT")]
    Init(ConfigUpdate),
    #[serde(rename = "SCORE_ONE")]
    ScoreOne { item: ScoreItem },
    #[serde(rename = "SCORE_BATCH")]
    ScoreBatch { items: Vec<ScoreItem> },
    #[serde(rename = "NEIGHBORS")]
    Neighbors {
        address: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        network: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        hop: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
    },
    #[serde(rename = "ABORT")]
    Abort,
}

/// Response frame emitted by the worker. The id echoes the request's id when
/// one was present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub response: WorkerResponse,
}

/// Typed response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerResponse {
    #[serde(rename = "INIT_OK")]
    InitOk {
        capabilities: Vec<String>,
        ruleset: String,
    },
    #[serde(rename = "RESULT")]
    Result { data: ResultPayload },
    #[serde(rename = "RESULT_STREAM")]
    ResultStream { data: Box<CanonicalResult> },
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "ABORT_ACK")]
    AbortAck,
    #[serde(rename = "ERROR")]
    Error { error: String },
}

/// Payload of a RESULT frame: one result, a collected batch, or a neighbor
/// graph, depending on the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultPayload {
    Single(Box<CanonicalResult>),
    Batch(Vec<CanonicalResult>),
    Neighbors(NeighborGraph),
}
