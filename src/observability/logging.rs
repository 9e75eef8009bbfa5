//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber exactly once, from configuration
//! - Hand out the per-component spans that components log under
//!
//! # Design Decisions
//! - `RUST_LOG` takes precedence over the configured level
//! - Components never install or query global state; they receive a span

use tracing::Span;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Install the global subscriber. Call once from the entry point.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "routing_gateway={level},tower_http={level}",
            level = config.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
}

/// Root span for a long-lived component.
pub fn component_span(component: &'static str) -> Span {
    tracing::info_span!("component", name = component)
}
