//! Client for the vehicle-routing-problem solver.
//!
//! # Responsibilities
//! - POST optimization problems to the solver's fixed path
//! - Replace every encoded `routes[].geometry` with `[lon, lat]` pairs
//!
//! # Design Decisions
//! - The solver emits polylines in (lat, lon) order; the swap happens here so
//!   nothing downstream of the gateway ever sees lat/lon ordering

use std::time::Duration;

use serde_json::{json, Value};
use tracing::Span;
use url::Url;

use crate::config::VrpEngineConfig;
use crate::downstream::error::{BuildError, DownstreamError};
use crate::downstream::transport::JsonTransport;
use crate::geometry::{self, DecodeError};
use crate::payload::DownstreamRequest;

const ENGINE: &str = "vrp engine";

#[derive(Debug, Clone)]
pub struct VrpClient {
    transport: JsonTransport,
    url: Url,
}

impl VrpClient {
    pub fn new(config: &VrpEngineConfig, span: Span) -> Result<Self, BuildError> {
        let raw = config.url();
        let url = Url::parse(&raw).map_err(|source| BuildError::Url {
            engine: ENGINE,
            url: raw,
            source,
        })?;

        let transport = JsonTransport::new(
            ENGINE,
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.connect_timeout_secs),
            span,
        )?;

        Ok(Self { transport, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Solve the problem and return the solution with decoded route geometry.
    pub async fn call(&self, request: &DownstreamRequest) -> Result<Value, DownstreamError> {
        let mut solution = self.transport.post(self.url.clone(), &request.body).await?;
        decode_route_geometry(&mut solution)?;
        Ok(solution)
    }
}

/// Replace each `routes[].geometry` polyline with a `[[lon, lat], ...]` array.
pub fn decode_route_geometry(solution: &mut Value) -> Result<(), DecodeError> {
    let Some(routes) = solution.get_mut("routes").and_then(Value::as_array_mut) else {
        return Ok(());
    };

    for route in routes {
        let Some(geometry) = route.get_mut("geometry") else {
            continue;
        };
        let decoded = match geometry {
            Value::String(encoded) => geometry::decode_lon_lat(encoded)?,
            _ => continue,
        };
        *geometry = json!(decoded);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_replaced_with_lon_lat() {
        let mut solution = json!({
            "code": 0,
            "routes": [
                { "vehicle": 1, "geometry": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" },
                { "vehicle": 2 },
            ],
        });
        decode_route_geometry(&mut solution).unwrap();

        let first = &solution["routes"][0]["geometry"][0];
        assert_eq!(first, &json!([-120.2, 38.5]));
        assert_eq!(solution["routes"][0]["geometry"].as_array().unwrap().len(), 3);
        assert!(solution["routes"][1].get("geometry").is_none());
    }

    #[test]
    fn test_solution_without_routes_untouched() {
        let mut solution = json!({ "code": 3, "error": "no vehicles" });
        let before = solution.clone();
        decode_route_geometry(&mut solution).unwrap();
        assert_eq!(solution, before);
    }

    #[test]
    fn test_bad_geometry_is_error() {
        let mut solution = json!({ "routes": [{ "geometry": "_" }] });
        assert!(decode_route_geometry(&mut solution).is_err());
    }

    #[test]
    fn test_client_url() {
        let config = VrpEngineConfig {
            host: "vroom".to_string(),
            port: 3000,
            ..VrpEngineConfig::default()
        };
        let client = VrpClient::new(&config, Span::none()).unwrap();
        assert_eq!(client.url().as_str(), "http://vroom:3000/");
    }
}
