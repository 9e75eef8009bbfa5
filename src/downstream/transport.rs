//! JSON-over-HTTP transport shared by both engine clients.
//!
//! # Responsibilities
//! - Send JSON bodies with `Content-Type: application/json`
//! - Enforce the per-engine request deadline
//! - Map transport failures onto `DownstreamError`
//! - Record downstream metrics

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{Instrument, Span};
use url::Url;

use crate::downstream::error::{BuildError, DownstreamError};
use crate::observability::metrics;

/// HTTP client bound to one engine.
#[derive(Debug, Clone)]
pub struct JsonTransport {
    client: Client,
    engine: &'static str,
    timeout: Duration,
    span: Span,
}

impl JsonTransport {
    pub fn new(
        engine: &'static str,
        timeout: Duration,
        connect_timeout: Duration,
        span: Span,
    ) -> Result<Self, BuildError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("routing-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            engine,
            timeout,
            span,
        })
    }

    /// POST a JSON body and return the parsed JSON response.
    pub async fn post(&self, url: Url, body: &Value) -> Result<Value, DownstreamError> {
        let request = self.client.post(url.clone()).json(body);
        self.send(request, "POST", url, self.timeout).await
    }

    /// GET with a deadline that overrides the client default.
    pub async fn get(&self, url: Url, timeout: Duration) -> Result<Value, DownstreamError> {
        let request = self.client.get(url.clone()).timeout(timeout);
        self.send(request, "GET", url, timeout).await
    }

    async fn send(
        &self,
        request: RequestBuilder,
        method: &'static str,
        url: Url,
        timeout: Duration,
    ) -> Result<Value, DownstreamError> {
        let span = tracing::debug_span!(
            parent: &self.span,
            "downstream_call",
            engine = self.engine,
            method,
            url = %url,
        );

        async move {
            let start = Instant::now();
            let result = self.exchange(request, timeout).await;

            let status_label = match &result {
                Ok(_) => "ok".to_string(),
                Err(e) if e.is_timeout() => "timeout".to_string(),
                Err(e) => e
                    .status()
                    .map_or_else(|| "error".to_string(), |status| status.to_string()),
            };
            metrics::record_downstream(self.engine, &status_label, start);

            match &result {
                Ok(_) => tracing::debug!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Downstream call succeeded"
                ),
                Err(e) => tracing::warn!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "Downstream call failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn exchange(
        &self,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Value, DownstreamError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport_error(e, timeout))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e, timeout))?;

        if !status.is_success() {
            let body = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            return Err(DownstreamError::Status {
                engine: self.engine,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| DownstreamError::InvalidResponse {
            engine: self.engine,
            message: e.to_string(),
        })
    }

    fn map_transport_error(&self, error: reqwest::Error, timeout: Duration) -> DownstreamError {
        if error.is_timeout() {
            DownstreamError::Timeout {
                engine: self.engine,
                after: timeout,
            }
        } else {
            DownstreamError::Connection {
                engine: self.engine,
                message: error.to_string(),
            }
        }
    }
}
