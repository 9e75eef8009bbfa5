//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request id, tracing, body limit)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight batches
//!
//! # Design Decisions
//! - No whole-request timeout layer: a batch is bounded by
//!   `listener.request_timeout_secs` inside `BatchRouter`, which answers
//!   unfinished rows instead of dropping the response

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::downstream::BuildError;
use crate::health::StatusReporter;
use crate::http::handlers;
use crate::lifecycle::Shutdown;
use crate::observability::logging::component_span;
use crate::payload::Route;
use crate::routing::BatchRouter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<BatchRouter>,
    pub status: Arc<StatusReporter>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Build the engine clients and the router.
    pub fn new(config: GatewayConfig) -> Result<Self, BuildError> {
        let batch_router = BatchRouter::from_config(&config)?;
        let status = StatusReporter::from_config(
            batch_router.routing_engine().clone(),
            &config,
            component_span("status"),
        );

        let state = AppState {
            router: Arc::new(batch_router),
            status: Arc::new(status),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route(
                "/ors_status",
                get(handlers::ors_status).post(handlers::ors_status_batch),
            );

        for route in Route::ALL {
            router = router.route(&format!("/{}", route.name()), handlers::batch_route(route));
            if route.accepts_format() {
                router = router.route(
                    &format!("/{}/{{format}}", route.name()),
                    handlers::batch_route_with_format(route),
                );
            }
        }

        router
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.listener.max_body_bytes))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routing_engine = %self.config.routing_engine.base_url(),
            vrp_engine = %self.config.vrp_engine.url(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(Shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
