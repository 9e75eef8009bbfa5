//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum router, middleware: request id, trace, body limit)
//!     → handlers.rs (route → BatchEnvelope → BatchRouter → ResponseEnvelope)
//!     → response.rs (envelope-level errors → 400)
//!     → Send to caller
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
