//! The risk worker: message dispatch over the wire protocol.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use visionrisk_client::RiskDataSource;
use visionrisk_types::{ConfigUpdate, ScoreItem, WorkerConfig};

use crate::orchestrator::Orchestrator;
use crate::protocol::{ResponseEnvelope, ResultPayload, WorkerResponse};

const CAPABILITIES: &[&str] = &["single", "batch", "stream", "graphSignals"];

/// Worker state: the orchestrator plus the current configuration snapshot.
/// INIT swaps the snapshot; nothing mutates it mid-request.
pub struct RiskWorker {
    orchestrator: Orchestrator,
    config: WorkerConfig,
}

impl RiskWorker {
    pub fn new(source: Arc<dyn RiskDataSource>) -> Self {
        Self::with_config(source, WorkerConfig::default())
    }

    pub fn with_config(source: Arc<dyn RiskDataSource>, config: WorkerConfig) -> Self {
        Self {
            orchestrator: Orchestrator::new(source),
            config,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Handle one incoming frame, emitting zero or more correlated responses.
    ///
    /// Frames are parsed leniently: a missing or unknown `type` yields an
    /// ERROR response (never a silent drop), correlated to the frame's id
    /// when one is present.
    pub async fn handle(&mut self, message: Value, out: &UnboundedSender<ResponseEnvelope>) {
        let id = message
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let Some(kind) = message.get("type").and_then(Value::as_str).map(str::to_owned) else {
            send(
                out,
                id,
                WorkerResponse::Error {
                    error: "missing request type".to_string(),
                },
            );
            return;
        };
        let payload = message
            .get("payload")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));

        match kind.as_str() {
            "INIT" => self.handle_init(id, payload, out),
            "SCORE_ONE" => self.handle_score_one(id, payload, out).await,
            "SCORE_BATCH" => self.handle_score_batch(id, payload, out).await,
            "NEIGHBORS" => self.handle_neighbors(id, payload, out).await,
            "ABORT" => send(out, id, WorkerResponse::AbortAck),
            other => send(
                out,
                id,
                WorkerResponse::Error {
                    error: format!("unknown request type: {other}"),
                },
            ),
        }
    }

    fn handle_init(
        &mut self,
        id: Option<String>,
        payload: Value,
        out: &UnboundedSender<ResponseEnvelope>,
    ) {
        let update: ConfigUpdate = match serde_json::from_value(payload) {
            Ok(update) => update,
            Err(err) => {
                send(
                    out,
                    id,
                    WorkerResponse::Error {
                        error: format!("invalid INIT payload: {err}"),
                    },
                );
                return;
            }
        };

        self.config = self.config.apply(&update);
        self.orchestrator.source().reconfigure(&self.config);
        info!(
            network = %self.config.network,
            concurrency = self.config.concurrency,
            graph_signals = self.config.flags.graph_signals,
            "worker reconfigured"
        );

        send(
            out,
            id,
            WorkerResponse::InitOk {
                capabilities: CAPABILITIES.iter().map(|c| c.to_string()).collect(),
                ruleset: self.config.ruleset.clone(),
            },
        );
    }

    async fn handle_score_one(
        &self,
        id: Option<String>,
        payload: Value,
        out: &UnboundedSender<ResponseEnvelope>,
    ) {
        let item: ScoreItem = match serde_json::from_value(
            payload.get("item").cloned().unwrap_or(Value::Null),
        ) {
            Ok(item) => item,
            Err(err) => {
                send(
                    out,
                    id,
                    WorkerResponse::Error {
                        error: format!("invalid SCORE_ONE payload: {err}"),
                    },
                );
                return;
            }
        };

        match self.orchestrator.score_one(&item, &self.config).await {
            Ok(result) => send(
                out,
                id,
                WorkerResponse::Result {
                    data: ResultPayload::Single(Box::new(result)),
                },
            ),
            Err(err) => send(
                out,
                id,
                WorkerResponse::Error {
                    error: err.to_string(),
                },
            ),
        }
    }

    async fn handle_score_batch(
        &self,
        id: Option<String>,
        payload: Value,
        out: &UnboundedSender<ResponseEnvelope>,
    ) {
        let items: Vec<ScoreItem> = match serde_json::from_value(
            payload.get("items").cloned().unwrap_or(Value::Null),
        ) {
            Ok(items) => items,
            Err(err) => {
                send(
                    out,
                    id,
                    WorkerResponse::Error {
                        error: format!("invalid SCORE_BATCH payload: {err}"),
                    },
                );
                return;
            }
        };

        if self.config.flags.stream_batch {
            // Emit each item as it completes; the DONE sentinel is sent
            // exactly once, after every item has completed or failed.
            let mut results = stream::iter(items.iter())
                .map(|item| self.orchestrator.score_one(item, &self.config))
                .buffer_unordered(self.config.concurrency.max(1));
            while let Some(result) = results.next().await {
                match result {
                    Ok(result) => send(
                        out,
                        id.clone(),
                        WorkerResponse::ResultStream {
                            data: Box::new(result),
                        },
                    ),
                    Err(err) => send(
                        out,
                        id.clone(),
                        WorkerResponse::Error {
                            error: err.to_string(),
                        },
                    ),
                }
            }
            send(out, id, WorkerResponse::Done);
        } else {
            let results = self.orchestrator.score_batch(&items, &self.config).await;
            let mut collected = Vec::with_capacity(results.len());
            for result in results {
                match result {
                    Ok(result) => collected.push(result),
                    Err(err) => warn!(%err, "batch item failed"),
                }
            }
            send(
                out,
                id,
                WorkerResponse::Result {
                    data: ResultPayload::Batch(collected),
                },
            );
        }
    }

    async fn handle_neighbors(
        &self,
        id: Option<String>,
        payload: Value,
        out: &UnboundedSender<ResponseEnvelope>,
    ) {
        let Some(address) = payload.get("address").and_then(Value::as_str) else {
            send(
                out,
                id,
                WorkerResponse::Error {
                    error: "NEIGHBORS requires an address".to_string(),
                },
            );
            return;
        };
        let network = payload
            .get("network")
            .and_then(Value::as_str)
            .unwrap_or(&self.config.network);
        let hop = payload
            .get("hop")
            .and_then(Value::as_u64)
            .map(|h| h as u32)
            .unwrap_or(self.config.neighbor_hop);
        let limit = payload
            .get("limit")
            .and_then(Value::as_u64)
            .map(|l| l as u32)
            .unwrap_or(self.config.neighbor_limit);

        let graph = match self
            .orchestrator
            .source()
            .neighbors(address, network, hop, limit)
            .await
        {
            Ok(graph) => graph,
            Err(err) => {
                warn!(%address, %err, "neighbor fetch unavailable; returning empty graph");
                Default::default()
            }
        };
        send(
            out,
            id,
            WorkerResponse::Result {
                data: ResultPayload::Neighbors(graph),
            },
        );
    }
}

fn send(out: &UnboundedSender<ResponseEnvelope>, id: Option<String>, response: WorkerResponse) {
    if out.send(ResponseEnvelope { id, response }).is_err() {
        debug!("response channel closed; dropping frame");
    }
}
