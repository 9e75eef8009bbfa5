//! Health and readiness subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health
//!     → "OK" (liveness of the gateway itself, no downstream call)
//!
//! GET|POST /ors_status
//!     → status.rs (query routing engine status with its own deadline)
//!     → reshape into StatusReport { profiles, serviceReady, error? }
//! ```
//!
//! # Design Decisions
//! - Readiness degrades instead of failing: a slow or absent engine yields
//!   `serviceReady: false` with an error string, never an HTTP error
//! - Built fresh on every query; nothing is cached

pub mod status;

pub use status::{ProfileStatus, StatusReport, StatusReporter};
