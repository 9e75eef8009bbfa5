//! Shared utilities for gateway integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use routing_gateway::config::GatewayConfig;
use routing_gateway::http::HttpServer;
use routing_gateway::lifecycle::Shutdown;

/// Profile the mock routing engine answers with HTTP 500.
pub const FAILING_PROFILE: &str = "unavailable-profile";

/// Canonical polyline returned by the mock VRP engine.
pub const ROUTE_POLYLINE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

/// Records every request a mock engine receives.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Recorder {
    pub fn record(&self, path: String, body: Value) {
        self.calls.lock().unwrap().push((path, body));
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Serve `app` on an ephemeral local port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A local port with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Mock routing engine under the default `ors/v2` prefix.
///
/// Echoes the request; sleeps for `delay_ms` when the body carries it;
/// answers 500 for `FAILING_PROFILE`.
pub async fn start_routing_engine(recorder: Recorder, status: Value) -> SocketAddr {
    let app = Router::new()
        .route("/ors/v2/{operation}/{profile}/{format}", post(route_request))
        .route(
            "/ors/v2/status",
            get(move || {
                let status = status.clone();
                async move { Json(status) }
            }),
        )
        .with_state(recorder);
    serve(app).await
}

/// Routing engine whose status endpoint answers after `delay`.
pub async fn start_slow_status_engine(delay: Duration) -> SocketAddr {
    let app = Router::new().route(
        "/ors/v2/status",
        get(move || async move {
            tokio::time::sleep(delay).await;
            Json(json!({ "profiles": { "driving-car": {} } }))
        }),
    );
    serve(app).await
}

async fn route_request(
    State(recorder): State<Recorder>,
    Path((operation, profile, format)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    recorder.record(
        format!("/ors/v2/{}/{}/{}", operation, profile, format),
        body.clone(),
    );

    if let Some(ms) = body.get("delay_ms").and_then(Value::as_u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    if profile == FAILING_PROFILE {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "code": 2099, "message": "profile not loaded" } })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "operation": operation,
            "profile": profile,
            "format": format,
            "request": body,
        })),
    )
}

/// Mock VRP engine on `/` returning one route with `ROUTE_POLYLINE`.
pub async fn start_vrp_engine(recorder: Recorder) -> SocketAddr {
    let app = Router::new()
        .route(
            "/",
            post(|State(recorder): State<Recorder>, Json(body): Json<Value>| async move {
                recorder.record("/".to_string(), body);
                Json(json!({
                    "code": 0,
                    "summary": { "cost": 1234, "routes": 1 },
                    "routes": [{ "vehicle": 1, "cost": 1234, "geometry": ROUTE_POLYLINE }],
                }))
            }),
        )
        .with_state(recorder);
    serve(app).await
}

/// Gateway config pointing at the given engines.
pub fn gateway_config(routing_engine: SocketAddr, vrp_engine: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.host = "127.0.0.1".to_string();
    config.listener.port = 0;
    config.routing_engine.host = routing_engine.ip().to_string();
    config.routing_engine.port = routing_engine.port();
    config.routing_engine.timeout_secs = 5;
    config.vrp_engine.host = vrp_engine.ip().to_string();
    config.vrp_engine.port = vrp_engine.port();
    config.vrp_engine.timeout_secs = 5;
    config.health.timeout_secs = 1;
    config
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).expect("gateway should build");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// POST a JSON body and return (status, parsed body).
pub async fn post_json(addr: SocketAddr, path: &str, body: Value) -> (u16, Value) {
    let res = client()
        .post(format!("http://{}{}", addr, path))
        .json(&body)
        .send()
        .await
        .expect("gateway unreachable");
    let status = res.status().as_u16();
    (status, res.json().await.unwrap())
}
