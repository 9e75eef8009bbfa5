//! Request routing subsystem.
//!
//! # Data Flow
//! ```text
//! (Route, BatchEnvelope, format)
//!     → router.rs (iterate rows, bounded concurrency, order kept)
//!     → matcher.rs (route + argument count → PayloadShape)
//!     → payload builders → DownstreamRequest
//!     → routing engine or VRP client
//!     → RowResult per row → ResponseEnvelope
//! ```
//!
//! # Design Decisions
//! - Shape table is static; every accepted shape is enumerable
//! - One row's failure never touches another row's result
//! - No state survives a request

pub mod matcher;
pub mod router;

pub use matcher::{select_shape, shapes_for};
pub use router::BatchRouter;
