//! Request-level error responses.
//!
//! # Responsibilities
//! - Map envelope-level failures to HTTP status codes
//! - Report response serialization failures as 500
//!
//! # Design Decisions
//! - Only request-level problems become HTTP errors; row failures travel
//!   inside the 200 response next to their row id
//! - Error bodies are JSON: `{"error": "..."}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::batch::EnvelopeError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error("invalid format segment {0:?}")]
    InvalidFormat(String),

    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Envelope(_) | ApiError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            ApiError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Rejected request");
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
