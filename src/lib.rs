//! Batch routing and fleet-optimization gateway.
//!
//! Accepts external-function style batches (`{"data": [[rowId, args...]]}`),
//! turns each row into a request for the routing engine (directions,
//! isochrones, matrix) or the VRP solver (optimization), and returns one
//! result per row under the same row id.

pub mod batch;
pub mod config;
pub mod downstream;
pub mod geometry;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod payload;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
