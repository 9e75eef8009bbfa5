//! Request metadata helpers.
//!
//! # Responsibilities
//! - Read the request id set by the request-id middleware
//! - Validate the optional `/{format}` path segment
//!
//! # Design Decisions
//! - Request id generated as early as possible (outermost layer)
//! - Format is validated before any row is processed

use axum::http::HeaderMap;

use crate::http::response::ApiError;
use crate::payload::builders::is_path_safe;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request id of the current request, or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Accept a `/{format}` segment only if it is path-safe.
pub fn validate_format(format: Option<String>) -> Result<Option<String>, ApiError> {
    match format {
        Some(f) if !is_path_safe(&f) => Err(ApiError::InvalidFormat(f)),
        other => Ok(other),
    }
}
