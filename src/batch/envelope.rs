//! Envelope parsing and assembly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::batch::row::RowResult;

/// Caller-assigned row identifier.
pub type RowId = i64;

/// Structurally invalid envelope. Fails the whole request.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("`data` must be an array of rows")]
    DataNotArray,

    #[error("row {index} must be a non-empty array")]
    RowNotArray { index: usize },

    #[error("row {index} does not start with an integer row id")]
    InvalidRowId { index: usize },
}

/// One inbound row: its id and the remaining arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub args: Vec<Value>,
}

/// Parsed inbound batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchEnvelope {
    pub rows: Vec<Row>,
}

impl BatchEnvelope {
    /// Parse a raw request body. An empty body is an empty batch.
    pub fn parse(body: &[u8]) -> Result<Self, EnvelopeError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Self::from_value(serde_json::from_slice(body)?)
    }

    pub fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        let Value::Object(mut object) = value else {
            return Err(EnvelopeError::NotAnObject);
        };

        let rows = match object.remove("data") {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Array(rows)) => rows,
            Some(_) => return Err(EnvelopeError::DataNotArray),
        };

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| parse_row(index, row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|row| row.id).collect()
    }
}

fn parse_row(index: usize, row: Value) -> Result<Row, EnvelopeError> {
    let Value::Array(mut items) = row else {
        return Err(EnvelopeError::RowNotArray { index });
    };
    if items.is_empty() {
        return Err(EnvelopeError::RowNotArray { index });
    }

    let args = items.split_off(1);
    let id = items[0]
        .as_i64()
        .ok_or(EnvelopeError::InvalidRowId { index })?;

    Ok(Row { id, args })
}

/// Outbound batch: `{"data": [[rowId, result], ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub data: Vec<(RowId, Value)>,
}

impl ResponseEnvelope {
    pub fn ids(&self) -> Vec<RowId> {
        self.data.iter().map(|(id, _)| *id).collect()
    }
}

/// Re-attach row ids to results, keeping their order.
pub fn assemble(results: Vec<RowResult>) -> ResponseEnvelope {
    ResponseEnvelope {
        data: results.into_iter().map(RowResult::into_slot).collect(),
    }
}
