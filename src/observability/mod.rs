//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! main
//!     → logging.rs (install subscriber once, from ObservabilityConfig)
//!     → logging.rs (component_span per client/reporter, handed over at construction)
//!
//! All subsystems produce:
//!     → structured log events inside their component span
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing, pretty for development
//! - Request ID is assigned by the HTTP layer and logged with each batch
//! - Without an installed recorder the metric macros are no-ops

pub mod logging;
pub mod metrics;
