//! Client for the directions / isochrones / matrix engine.

use std::time::Duration;

use serde_json::Value;
use tracing::Span;
use url::Url;

use crate::config::RoutingEngineConfig;
use crate::downstream::error::{BuildError, DownstreamError};
use crate::downstream::transport::JsonTransport;
use crate::payload::{DownstreamRequest, Operation};

const ENGINE: &str = "routing engine";

#[derive(Debug, Clone)]
pub struct RoutingEngineClient {
    transport: JsonTransport,
    base: Url,
    api_prefix: Vec<String>,
    default_format: String,
}

impl RoutingEngineClient {
    pub fn new(config: &RoutingEngineConfig, span: Span) -> Result<Self, BuildError> {
        let raw = config.base_url();
        let base = Url::parse(&raw).map_err(|source| BuildError::Url {
            engine: ENGINE,
            url: raw,
            source,
        })?;

        let transport = JsonTransport::new(
            ENGINE,
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.connect_timeout_secs),
            span,
        )?;

        Ok(Self {
            transport,
            base,
            api_prefix: config
                .api_prefix
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            default_format: config.default_format.clone(),
        })
    }

    /// Build `/{prefix}/{segments...}` against the engine base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, DownstreamError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DownstreamError::InvalidRequest {
                engine: ENGINE,
                message: format!("base URL {} cannot carry a path", self.base),
            })?
            .pop_if_empty()
            .extend(&self.api_prefix)
            .extend(segments);
        Ok(url)
    }

    /// POST the request body to `/{prefix}/{operation}/{profile}/{format}`.
    pub async fn call(&self, request: &DownstreamRequest) -> Result<Value, DownstreamError> {
        let profile = request
            .profile
            .as_deref()
            .ok_or_else(|| DownstreamError::InvalidRequest {
                engine: ENGINE,
                message: format!("{} request has no profile", request.operation),
            })?;
        let format = request.format.as_deref().unwrap_or(&self.default_format);

        let url = self.endpoint(&[request.operation.as_str(), profile, format])?;
        self.transport.post(url, &request.body).await
    }

    /// GET `/{prefix}/status` with its own deadline.
    pub async fn status(&self, timeout: Duration) -> Result<Value, DownstreamError> {
        let url = self.endpoint(&[Operation::Status.as_str()])?;
        self.transport.get(url, timeout).await
    }
}
