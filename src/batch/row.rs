//! Per-row outcomes and error descriptors.

use std::time::Duration;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::batch::envelope::RowId;
use crate::downstream::DownstreamError;
use crate::payload::ShapeError;

/// Failure scoped to a single row.
#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Downstream(#[from] DownstreamError),

    /// Batch deadline passed before the row finished.
    #[error("batch deadline of {}s passed before this row finished", .after.as_secs_f64())]
    Deadline { after: Duration },
}

impl RowError {
    /// Short classifier carried in the error descriptor.
    pub fn kind(&self) -> &'static str {
        match self {
            RowError::Shape(_) => "shape",
            RowError::Deadline { .. } => "timeout",
            RowError::Downstream(e) if e.is_timeout() => "timeout",
            RowError::Downstream(DownstreamError::Decode(_)) => "decode",
            RowError::Downstream(_) => "downstream",
        }
    }

    /// `{"error": {"rowId", "kind", "message", "status"?, "body"?}}`
    pub fn descriptor(&self, id: RowId) -> Value {
        let mut error = Map::new();
        error.insert("rowId".to_string(), json!(id));
        error.insert("kind".to_string(), json!(self.kind()));
        error.insert("message".to_string(), json!(self.to_string()));

        if let RowError::Downstream(DownstreamError::Status { status, body, .. }) = self {
            error.insert("status".to_string(), json!(status));
            error.insert("body".to_string(), body.clone());
        }

        json!({ "error": error })
    }
}

/// Result for one row, tagged with its id.
#[derive(Debug)]
pub struct RowResult {
    pub id: RowId,
    pub outcome: Result<Value, RowError>,
}

impl RowResult {
    pub fn ok(id: RowId, value: Value) -> Self {
        Self {
            id,
            outcome: Ok(value),
        }
    }

    pub fn failed(id: RowId, error: RowError) -> Self {
        Self {
            id,
            outcome: Err(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Outcome label used for logs and metrics.
    pub fn outcome_label(&self) -> &'static str {
        match &self.outcome {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        }
    }

    /// `[rowId, value]` or `[rowId, {"error": ...}]`.
    pub fn into_slot(self) -> (RowId, Value) {
        match self.outcome {
            Ok(value) => (self.id, value),
            Err(error) => (self.id, error.descriptor(self.id)),
        }
    }
}
