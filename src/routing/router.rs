//! Batch dispatch.
//!
//! # Responsibilities
//! - Iterate the rows of one batch
//! - Select shape, build payload, call the engine that owns the operation
//! - Capture each row's failure inline with that row
//!
//! # Design Decisions
//! - Immutable after construction (shared behind Arc without locks)
//! - Concurrency bounded by `batch.max_concurrency`; 1 keeps rows sequential
//! - Results keep input order regardless of completion order
//! - Empty batch returns immediately, no engine is contacted
//! - Rows unfinished at the batch deadline are answered with a timeout
//!   descriptor; the response always has one slot per input row

use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use tracing::Instrument;

use crate::batch::{assemble, BatchEnvelope, ResponseEnvelope, Row, RowError, RowId, RowResult};
use crate::config::GatewayConfig;
use crate::downstream::{BuildError, DownstreamError, RoutingEngineClient, VrpClient};
use crate::observability::{logging::component_span, metrics};
use crate::payload::{DownstreamRequest, Route};
use crate::routing::matcher::select_shape;

/// Dispatches batch rows to the engines.
#[derive(Debug, Clone)]
pub struct BatchRouter {
    routing_engine: RoutingEngineClient,
    vrp: VrpClient,
    max_concurrency: usize,
    batch_deadline: Duration,
}

impl BatchRouter {
    pub fn new(
        routing_engine: RoutingEngineClient,
        vrp: VrpClient,
        max_concurrency: usize,
        batch_deadline: Duration,
    ) -> Self {
        Self {
            routing_engine,
            vrp,
            max_concurrency: max_concurrency.max(1),
            batch_deadline,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, BuildError> {
        let routing_engine =
            RoutingEngineClient::new(&config.routing_engine, component_span("routing_engine"))?;
        let vrp = VrpClient::new(&config.vrp_engine, component_span("vrp_engine"))?;
        Ok(Self::new(
            routing_engine,
            vrp,
            config.batch.max_concurrency,
            Duration::from_secs(config.listener.request_timeout_secs),
        ))
    }

    pub fn routing_engine(&self) -> &RoutingEngineClient {
        &self.routing_engine
    }

    /// Process every row of `envelope` on `route`.
    ///
    /// `format` overrides the routing engine's default format segment.
    pub async fn dispatch(
        &self,
        route: Route,
        format: Option<String>,
        envelope: BatchEnvelope,
    ) -> ResponseEnvelope {
        if envelope.is_empty() {
            tracing::debug!(route = %route, "Empty batch");
            return ResponseEnvelope::default();
        }

        let start = Instant::now();
        let row_count = envelope.len();
        let ids = envelope.ids();
        let format = format.as_deref();
        let deadline = tokio::time::Instant::now() + self.batch_deadline;

        let rows = stream::iter(envelope.rows)
            .map(|row| self.process_row(route, format, row))
            .buffered(self.max_concurrency);
        let mut rows = std::pin::pin!(rows);

        let mut results = Vec::with_capacity(row_count);
        while results.len() < row_count {
            match tokio::time::timeout_at(deadline, rows.next()).await {
                Ok(Some(result)) => results.push(result),
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        route = %route,
                        finished = results.len(),
                        rows = row_count,
                        deadline = ?self.batch_deadline,
                        "Batch deadline reached"
                    );
                    break;
                }
            }
        }
        let unfinished = ids[results.len()..].to_vec();
        results.extend(self.expire_rows(route, &unfinished));

        let failed = results.iter().filter(|r| !r.is_ok()).count();
        metrics::record_batch(route.name(), row_count, start);
        tracing::info!(
            route = %route,
            rows = row_count,
            failed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch processed"
        );

        assemble(results)
    }

    /// Timeout results for rows cut off by the batch deadline.
    fn expire_rows(&self, route: Route, ids: &[RowId]) -> Vec<RowResult> {
        ids.iter()
            .map(|&id| {
                let result = RowResult::failed(
                    id,
                    RowError::Deadline {
                        after: self.batch_deadline,
                    },
                );
                metrics::record_row(route.name(), result.outcome_label());
                result
            })
            .collect()
    }

    async fn process_row(&self, route: Route, format: Option<&str>, row: Row) -> RowResult {
        let id = row.id;
        let span = tracing::info_span!("row", route = %route, row_id = id);

        async move {
            let result = match self.run_row(route, format, row.args).await {
                Ok(value) => RowResult::ok(id, value),
                Err(e) => {
                    tracing::warn!(kind = e.kind(), error = %e, "Row failed");
                    RowResult::failed(id, e)
                }
            };
            metrics::record_row(route.name(), result.outcome_label());
            result
        }
        .instrument(span)
        .await
    }

    async fn run_row(
        &self,
        route: Route,
        format: Option<&str>,
        args: Vec<Value>,
    ) -> Result<Value, RowError> {
        let shape = select_shape(route, args.len())?;
        let request = shape.build(args)?.with_format(format.map(str::to_string));
        tracing::debug!(shape = ?shape, profile = ?request.profile, "Payload built");
        Ok(self.execute(&request).await?)
    }

    /// Send a built request to the engine that owns its operation.
    pub async fn execute(&self, request: &DownstreamRequest) -> Result<Value, DownstreamError> {
        if request.operation.is_vrp() {
            self.vrp.call(request).await
        } else {
            self.routing_engine.call(request).await
        }
    }
}
