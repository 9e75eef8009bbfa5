//! Batch protocol adapter.
//!
//! # Data Flow
//! ```text
//! {"data": [[rowId, arg1, arg2, ...], ...]}
//!     → envelope.rs (parse into Row { id, args })
//!     → [request router processes each row]
//!     → row.rs (RowResult: value or RowError descriptor)
//!     → envelope.rs (assemble {"data": [[rowId, result], ...]})
//! ```
//!
//! # Design Decisions
//! - Output has one row per input row, in input order, with the same ids
//! - A missing or empty batch is an empty batch, not an error
//! - Only a structurally broken envelope fails the whole request

pub mod envelope;
pub mod row;

pub use envelope::{assemble, BatchEnvelope, EnvelopeError, ResponseEnvelope, Row, RowId};
pub use row::{RowError, RowResult};
