//! HTTP transport for the aggregation engines.
//!
//! Routes (all under `/api/v1`):
//! - `POST /buffered` - tree builder + recursive aggregator
//! - `POST /streaming` - streaming aggregator
//! - `GET /health` - health check

pub mod error;
pub mod handlers;
pub mod middleware;

pub use error::{ApiError, ErrorBody};

use crate::utils::config::{ApiConfig, API_PREFIX};
use axum::routing::{get, post};
use axum::Router;
use log::info;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Maximum accepted request body in bytes
    pub body_limit: usize,
}

impl AppState {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            body_limit: config.body_limit,
        }
    }
}

/// Build the main application router
pub fn build_router(config: &ApiConfig) -> Router {
    let state = Arc::new(AppState::from_config(config));

    let api = Router::new()
        .route("/buffered", post(handlers::buffered))
        .route("/streaming", post(handlers::streaming))
        .route("/health", get(handlers::health));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(axum::middleware::from_fn(middleware::log_request))
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C
///
/// **Public** - entry point of the `serve` command
pub async fn run_server(config: ApiConfig) -> anyhow::Result<()> {
    let app = build_router(&config);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    info!("API running on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
