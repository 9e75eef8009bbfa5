//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{GatewayConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {var}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let config = read_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load the optional file, apply process environment overrides, validate.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => GatewayConfig::default(),
    };
    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Apply deployment overrides. `lookup` returns the value of a variable.
///
/// | Variable | Field |
/// |---|---|
/// | `GATEWAY_HOST` / `GATEWAY_PORT` | `listener.host` / `listener.port` |
/// | `ORS_HOST` / `ORS_PORT` | `routing_engine.host` / `routing_engine.port` |
/// | `ORS_API_PREFIX` | `routing_engine.api_prefix` |
/// | `ORS_FORMAT` | `routing_engine.default_format` |
/// | `VROOM_HOST` / `VROOM_PORT` | `vrp_engine.host` / `vrp_engine.port` |
/// | `BATCH_MAX_CONCURRENCY` | `batch.max_concurrency` |
/// | `LOG_LEVEL` / `LOG_FORMAT` | `observability.log_level` / `observability.log_format` |
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("GATEWAY_HOST") {
        config.listener.host = v;
    }
    if let Some(v) = lookup("GATEWAY_PORT") {
        config.listener.port = parse_var("GATEWAY_PORT", v)?;
    }
    if let Some(v) = lookup("ORS_HOST") {
        config.routing_engine.host = v;
    }
    if let Some(v) = lookup("ORS_PORT") {
        config.routing_engine.port = parse_var("ORS_PORT", v)?;
    }
    if let Some(v) = lookup("ORS_API_PREFIX") {
        config.routing_engine.api_prefix = v;
    }
    if let Some(v) = lookup("ORS_FORMAT") {
        config.routing_engine.default_format = v;
    }
    if let Some(v) = lookup("VROOM_HOST") {
        config.vrp_engine.host = v;
    }
    if let Some(v) = lookup("VROOM_PORT") {
        config.vrp_engine.port = parse_var("VROOM_PORT", v)?;
    }
    if let Some(v) = lookup("BATCH_MAX_CONCURRENCY") {
        config.batch.max_concurrency = parse_var("BATCH_MAX_CONCURRENCY", v)?;
    }
    if let Some(v) = lookup("LOG_LEVEL") {
        config.observability.log_level = v;
    }
    if let Some(v) = lookup("LOG_FORMAT") {
        config.observability.log_format = match v.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => {
                return Err(ConfigError::Env {
                    var: "LOG_FORMAT",
                    value: v,
                    reason: "expected \"pretty\" or \"json\"".to_string(),
                })
            }
        };
    }
    Ok(())
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.trim().parse::<T>() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Env {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
