//! Payload construction subsystem.
//!
//! # Data Flow
//! ```text
//! Row arguments (JSON values)
//!     → shape.rs (PayloadShape picked by the request router)
//!     → builders.rs (validate arguments, build the engine body)
//!     → DownstreamRequest { operation, profile, format, body }
//! ```
//!
//! # Design Decisions
//! - Every accepted (route, argument shape) pair is a `PayloadShape` variant
//! - Builders are pure: no I/O, no shared state
//! - Missing or mistyped arguments are a `ShapeError`, scoped to the row

pub mod builders;
pub mod operation;
pub mod shape;

pub use operation::{Operation, Route};
pub use shape::{DownstreamRequest, PayloadShape, ShapeError};
