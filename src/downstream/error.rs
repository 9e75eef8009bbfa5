//! Downstream error types.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::geometry::DecodeError;

/// Failure of a single downstream call.
#[derive(Debug, Error)]
pub enum DownstreamError {
    /// Engine answered with a non-2xx status.
    #[error("{engine} returned HTTP {status}")]
    Status {
        engine: &'static str,
        status: u16,
        body: Value,
    },

    /// Engine did not answer before the deadline.
    #[error("{engine} timed out after {}s", .after.as_secs_f64())]
    Timeout {
        engine: &'static str,
        after: Duration,
    },

    /// Connection could not be established or was dropped.
    #[error("{engine} request failed: {message}")]
    Connection {
        engine: &'static str,
        message: String,
    },

    /// 2xx response whose body is not JSON.
    #[error("{engine} returned an invalid response: {message}")]
    InvalidResponse {
        engine: &'static str,
        message: String,
    },

    /// Request could not be addressed (missing profile, unusable base URL).
    #[error("{engine} request could not be built: {message}")]
    InvalidRequest {
        engine: &'static str,
        message: String,
    },

    /// VRP route geometry was not a valid polyline.
    #[error("route geometry could not be decoded: {0}")]
    Decode(#[from] DecodeError),
}

impl DownstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DownstreamError::Timeout { .. })
    }

    /// HTTP status reported by the engine, if it answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            DownstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure to construct a downstream client at startup.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid {engine} base URL {url:?}: {source}")]
    Url {
        engine: &'static str,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
