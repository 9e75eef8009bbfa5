//! Routing engine readiness report.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{Instrument, Span};

use crate::config::GatewayConfig;
use crate::downstream::{DownstreamError, RoutingEngineClient};

/// Readiness of one routing profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStatus {
    pub ready: bool,
    pub encoder_name: Option<String>,
    pub graph_build_date: Option<String>,
    pub osm_date: Option<String>,
}

impl ProfileStatus {
    fn missing() -> Self {
        Self {
            ready: false,
            encoder_name: None,
            graph_build_date: None,
            osm_date: None,
        }
    }
}

/// Per-profile readiness of the routing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, ProfileStatus>,
    pub service_ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusReport {
    /// Reshape the engine's status document.
    ///
    /// Accepts both layouts the engine has used: profiles keyed by name with
    /// `encoder_name`/`graph_build_date`, and numbered entries whose
    /// `profiles` field names the profile(s) and `creation_date` dates the graph.
    pub fn from_engine_status(status: &Value, expected: &[String]) -> Self {
        let mut profiles = BTreeMap::new();

        if let Some(entries) = status.get("profiles").and_then(Value::as_object) {
            for (key, entry) in entries {
                let names: Vec<String> = match entry.get("profiles").and_then(Value::as_str) {
                    Some(listed) => listed.split_whitespace().map(str::to_string).collect(),
                    None => vec![key.clone()],
                };
                for name in names {
                    let profile = ProfileStatus {
                        ready: true,
                        encoder_name: string_field(entry, "encoder_name").or_else(|| Some(name.clone())),
                        graph_build_date: string_field(entry, "graph_build_date")
                            .or_else(|| string_field(entry, "creation_date")),
                        osm_date: string_field(entry, "osm_date"),
                    };
                    profiles.insert(name, profile);
                }
            }
        }

        let mut all_expected = true;
        for name in expected {
            if !profiles.contains_key(name) {
                all_expected = false;
                profiles.insert(name.clone(), ProfileStatus::missing());
            }
        }

        let engine_ready = status
            .get("service_ready")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let any_ready = profiles.values().any(|p| p.ready);

        Self {
            profiles,
            service_ready: engine_ready && any_ready && all_expected,
            error: None,
        }
    }

    /// Report for an engine that could not be queried.
    pub fn unavailable(error: impl Into<String>, expected: &[String]) -> Self {
        Self {
            profiles: expected
                .iter()
                .map(|name| (name.clone(), ProfileStatus::missing()))
                .collect(),
            service_ready: false,
            error: Some(error.into()),
        }
    }
}

fn string_field(entry: &Value, field: &str) -> Option<String> {
    entry.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Queries the routing engine status endpoint.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    client: RoutingEngineClient,
    timeout: Duration,
    expected_profiles: Vec<String>,
    span: Span,
}

impl StatusReporter {
    pub fn new(
        client: RoutingEngineClient,
        timeout: Duration,
        expected_profiles: Vec<String>,
        span: Span,
    ) -> Self {
        Self {
            client,
            timeout,
            expected_profiles,
            span,
        }
    }

    pub fn from_config(client: RoutingEngineClient, config: &GatewayConfig, span: Span) -> Self {
        Self::new(
            client,
            Duration::from_secs(config.health.timeout_secs),
            config.routing_engine.profiles.clone(),
            span,
        )
    }

    /// Build a fresh report. Never fails; problems land in `error`.
    pub async fn get_status(&self) -> StatusReport {
        let span = tracing::debug_span!(parent: &self.span, "status_query");
        async {
            match self.client.status(self.timeout).await {
                Ok(status) => {
                    let report = StatusReport::from_engine_status(&status, &self.expected_profiles);
                    tracing::debug!(
                        service_ready = report.service_ready,
                        profiles = report.profiles.len(),
                        "Routing engine status"
                    );
                    report
                }
                Err(DownstreamError::Timeout { after, .. }) => {
                    tracing::warn!(timeout = ?after, "Routing engine status timed out");
                    StatusReport::unavailable("timeout", &self.expected_profiles)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Routing engine status unavailable");
                    StatusReport::unavailable(e.to_string(), &self.expected_profiles)
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_named_profiles() {
        let status = json!({
            "engine": { "version": "8.0.0" },
            "profiles": {
                "driving-car": {
                    "encoder_name": "driving-car",
                    "graph_build_date": "2024-05-01T10:00:00Z",
                    "osm_date": "2024-04-28T20:00:00Z",
                },
                "foot-walking": { "encoder_name": "foot-walking" },
            },
        });
        let report = StatusReport::from_engine_status(&status, &[]);
        assert!(report.service_ready);
        assert_eq!(report.profiles.len(), 2);
        let car = &report.profiles["driving-car"];
        assert!(car.ready);
        assert_eq!(car.graph_build_date.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(car.osm_date.as_deref(), Some("2024-04-28T20:00:00Z"));
    }

    #[test]
    fn test_numbered_profiles() {
        let status = json!({
            "profiles": {
                "profile 1": { "profiles": "driving-car", "creation_date": "2023-01-01" },
                "profile 2": { "profiles": "cycling-regular cycling-road" },
            },
        });
        let report = StatusReport::from_engine_status(&status, &[]);
        assert_eq!(
            report.profiles.keys().cloned().collect::<Vec<_>>(),
            vec!["cycling-regular", "cycling-road", "driving-car"]
        );
        assert_eq!(
            report.profiles["driving-car"].graph_build_date.as_deref(),
            Some("2023-01-01")
        );
        assert_eq!(
            report.profiles["cycling-road"].encoder_name.as_deref(),
            Some("cycling-road")
        );
    }

    #[test]
    fn test_missing_expected_profile_not_ready() {
        let status = json!({ "profiles": { "driving-car": {} } });
        let expected = vec!["driving-car".to_string(), "driving-hgv".to_string()];
        let report = StatusReport::from_engine_status(&status, &expected);
        assert!(!report.service_ready);
        assert!(!report.profiles["driving-hgv"].ready);
        assert!(report.profiles["driving-car"].ready);
    }

    #[test]
    fn test_no_profiles_not_ready() {
        let report = StatusReport::from_engine_status(&json!({ "languages": ["en"] }), &[]);
        assert!(!report.service_ready);
    }

    #[test]
    fn test_unavailable_serialization() {
        let report = StatusReport::unavailable("timeout", &[]);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({ "serviceReady": false, "error": "timeout" })
        );
    }

    #[test]
    fn test_report_uses_camel_case() {
        let status = json!({ "profiles": { "driving-car": { "osm_date": "x" } } });
        let value = serde_json::to_value(StatusReport::from_engine_status(&status, &[])).unwrap();
        assert_eq!(value["serviceReady"], json!(true));
        assert_eq!(value["profiles"]["driving-car"]["encoderName"], json!("driving-car"));
        assert_eq!(value["profiles"]["driving-car"]["osmDate"], json!("x"));
        assert!(value.get("error").is_none());
    }
}
