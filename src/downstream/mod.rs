//! Downstream engine clients.
//!
//! # Data Flow
//! ```text
//! DownstreamRequest
//!     → routing_engine.rs  POST /{prefix}/{operation}/{profile}/{format}
//!     → vrp.rs             POST {path}  → decode routes[].geometry
//!     → transport.rs (JSON over HTTP, bounded timeout, status mapping)
//!     → serde_json::Value or DownstreamError
//! ```
//!
//! # Design Decisions
//! - Every call has a deadline; timeouts are reported apart from other failures
//! - Non-2xx responses are errors carrying the status and body
//! - No retries: each row produces at most one downstream call

pub mod error;
pub mod routing_engine;
pub mod transport;
pub mod vrp;

pub use error::{BuildError, DownstreamError};
pub use routing_engine::RoutingEngineClient;
pub use vrp::VrpClient;
