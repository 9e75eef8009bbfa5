//! Endpoint handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::{post, MethodRouter},
    Json,
};

use crate::batch::{BatchEnvelope, ResponseEnvelope};
use crate::health::StatusReport;
use crate::http::request::{request_id, validate_format};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::payload::Route;

/// Liveness of the gateway itself.
pub async fn health() -> &'static str {
    "OK"
}

/// Bare status report.
pub async fn ors_status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(state.status.get_status().await)
}

/// Status report per batch row, fetched once per request.
pub async fn ors_status_batch(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let envelope = BatchEnvelope::parse(&body)?;
    if envelope.is_empty() {
        return Ok(Json(ResponseEnvelope::default()));
    }

    let report = state.status.get_status().await;
    let value = serde_json::to_value(&report)?;
    Ok(Json(ResponseEnvelope {
        data: envelope
            .ids()
            .into_iter()
            .map(|id| (id, value.clone()))
            .collect(),
    }))
}

/// POST handler for `/{route}`.
pub fn batch_route(route: Route) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>, headers: HeaderMap, body: Bytes| async move {
            handle_batch(state, route, None, headers, body).await
        },
    )
}

/// POST handler for `/{route}/{format}`.
pub fn batch_route_with_format(route: Route) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>,
              Path(format): Path<String>,
              headers: HeaderMap,
              body: Bytes| async move {
            handle_batch(state, route, Some(format), headers, body).await
        },
    )
}

async fn handle_batch(
    state: AppState,
    route: Route,
    format: Option<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let format = validate_format(format)?;
    let envelope = BatchEnvelope::parse(&body)?;

    tracing::debug!(
        request_id = %request_id(&headers),
        route = %route,
        format = ?format,
        rows = envelope.len(),
        "Batch received"
    );

    Ok(Json(state.router.dispatch(route, format, envelope).await))
}
