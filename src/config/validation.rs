//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid, concurrency >= 1)
//! - Reject path segments that would break downstream URL layout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;
use crate::payload::builders::is_path_safe;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::new("listener.host", "must not be empty"));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be > 0"));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be > 0"));
    }

    let ors = &config.routing_engine;
    check_scheme(&mut errors, "routing_engine.scheme", &ors.scheme);
    check_host(&mut errors, "routing_engine.host", &ors.host);
    check_port(&mut errors, "routing_engine.port", ors.port);
    if ors.timeout_secs == 0 {
        errors.push(ValidationError::new("routing_engine.timeout_secs", "must be > 0"));
    }
    if ors.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("routing_engine.connect_timeout_secs", "must be > 0"));
    }
    if !is_path_safe(&ors.default_format) {
        errors.push(ValidationError::new(
            "routing_engine.default_format",
            format!("{:?} is not a valid path segment", ors.default_format),
        ));
    }
    if !ors
        .api_prefix
        .split('/')
        .filter(|s| !s.is_empty())
        .all(is_path_safe)
    {
        errors.push(ValidationError::new(
            "routing_engine.api_prefix",
            format!("{:?} contains an invalid path segment", ors.api_prefix),
        ));
    }
    for profile in ors.profiles.iter().filter(|p| !is_path_safe(p)) {
        errors.push(ValidationError::new(
            "routing_engine.profiles",
            format!("{:?} is not a valid profile name", profile),
        ));
    }

    let vrp = &config.vrp_engine;
    check_scheme(&mut errors, "vrp_engine.scheme", &vrp.scheme);
    check_host(&mut errors, "vrp_engine.host", &vrp.host);
    check_port(&mut errors, "vrp_engine.port", vrp.port);
    if vrp.timeout_secs == 0 {
        errors.push(ValidationError::new("vrp_engine.timeout_secs", "must be > 0"));
    }
    if vrp.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("vrp_engine.connect_timeout_secs", "must be > 0"));
    }

    if config.health.timeout_secs == 0 {
        errors.push(ValidationError::new("health.timeout_secs", "must be > 0"));
    }
    if config.batch.max_concurrency == 0 {
        errors.push(ValidationError::new("batch.max_concurrency", "must be >= 1"));
    }

    let obs = &config.observability;
    if config_level(&obs.log_level).is_none() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level {:?}", obs.log_level),
        ));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("{:?} is not a socket address", obs.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn config_level(level: &str) -> Option<tracing::Level> {
    level.parse().ok()
}

fn check_scheme(errors: &mut Vec<ValidationError>, field: &'static str, scheme: &str) {
    if scheme != "http" && scheme != "https" {
        errors.push(ValidationError::new(field, format!("unsupported scheme {:?}", scheme)));
    }
}

fn check_host(errors: &mut Vec<ValidationError>, field: &'static str, host: &str) {
    if host.trim().is_empty() {
        errors.push(ValidationError::new(field, "must not be empty"));
    }
}

fn check_port(errors: &mut Vec<ValidationError>, field: &'static str, port: u16) {
    if port == 0 {
        errors.push(ValidationError::new(field, "must be > 0"));
    }
}
