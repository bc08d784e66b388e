//! HTTP surface: routes, the request gate, CORS and page rendering.

use std::path::Path;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tokio::sync::watch;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;

pub mod config;
pub mod cors;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod health;
pub mod render;

pub use config::Config;
pub use handlers::not_found_handler;

use crate::ServiceState;

const STATUS_PREFIX: &str = "/_status";

/// Every application route. Gated routes run the gate as a route layer so
/// their `OPTIONS` preflight, registered after it, is never gated.
pub fn router(state: ServiceState, static_dir: &Path) -> Router {
    let gate = middleware::from_fn_with_state(state.clone(), gate::middleware);

    Router::new()
        .route("/", get(handlers::home::handler).route_layer(gate.clone()))
        .route(
            "/token",
            get(handlers::token::handler)
                .route_layer(gate.clone())
                .options(cors::preflight_handler),
        )
        .route(
            "/burner",
            get(handlers::burner::handler)
                .route_layer(gate)
                .options(cors::preflight_handler),
        )
        .nest_service("/css", ServeDir::new(static_dir.join("css")))
        .nest_service("/js", ServeDir::new(static_dir.join("js")))
        .nest(STATUS_PREFIX, health::router())
        .fallback(handlers::not_found_handler)
        .with_state(state)
}

/// Serve until `shutdown_rx` fires.
pub async fn run(
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(config.log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    let router = router(state, &config.static_dir).layer(trace_layer);

    tracing::info!(addr = ?listen_addr, "upload server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
