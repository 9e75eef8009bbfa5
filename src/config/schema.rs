//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, request limits).
    pub listener: ListenerConfig,

    /// Directions / isochrones / matrix engine.
    pub routing_engine: RoutingEngineConfig,

    /// Vehicle routing problem solver.
    pub vrp_engine: VrpEngineConfig,

    /// Status endpoint settings.
    pub health: HealthConfig,

    /// Batch processing settings.
    pub batch: BatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind host (e.g., "0.0.0.0").
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Batch deadline in seconds; rows unfinished by then report a timeout.
    pub request_timeout_secs: u64,

    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,
}

impl ListenerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 300,
            max_body_bytes: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Routing engine (directions, isochrones, matrix, status).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RoutingEngineConfig {
    /// "http" or "https".
    pub scheme: String,

    pub host: String,

    pub port: u16,

    /// Path prefix before `/{operation}/{profile}/{format}` (e.g., "ors/v2").
    pub api_prefix: String,

    /// Format segment used when the route carries none.
    pub default_format: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Profiles the engine is expected to serve. Missing ones are reported
    /// as not ready by the status endpoint.
    pub profiles: Vec<String>,
}

impl RoutingEngineConfig {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}/", self.scheme, self.host, self.port)
    }
}

impl Default for RoutingEngineConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 8080,
            api_prefix: "ors/v2".to_string(),
            default_format: "geojson".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 5,
            profiles: Vec::new(),
        }
    }
}

/// VRP solver.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct VrpEngineConfig {
    pub scheme: String,

    pub host: String,

    pub port: u16,

    /// Fixed path the solver listens on.
    pub path: String,

    /// Request timeout in seconds. Solving can be slow.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl VrpEngineConfig {
    pub fn url(&self) -> String {
        format!(
            "{}://{}:{}/{}",
            self.scheme,
            self.host,
            self.port,
            self.path.trim_start_matches('/')
        )
    }
}

impl Default for VrpEngineConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 3000,
            path: "/".to_string(),
            timeout_secs: 60,
            connect_timeout_secs: 5,
        }
    }
}

/// Status endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HealthConfig {
    /// Deadline for the routing engine status query, in seconds.
    pub timeout_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { timeout_secs: 5 }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    /// Rows of one batch in flight at once. 1 = sequential.
    pub max_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_concurrency: 1 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
