//! VisionRisk scoring service.
//!
//! The orchestrator sequences the remote fetches for one address and hands
//! the assembled payload to the engine's reconciler; the worker wraps the
//! orchestrator in the message-correlated request/response protocol the
//! display layer speaks (INIT, SCORE_ONE, SCORE_BATCH, NEIGHBORS, ABORT).
//!
//! Every fetch step is independently fault-isolated: an unavailable upstream
//! degrades to its documented fallback and never aborts the scoring call.

#![deny(unsafe_code)]

mod orchestrator;
mod protocol;
mod worker;

pub use orchestrator::{Orchestrator, ScoreError};
pub use protocol::{RequestEnvelope, ResponseEnvelope, ResultPayload, WorkerRequest, WorkerResponse};
pub use worker::RiskWorker;
