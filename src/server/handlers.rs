//! HTTP handlers for the facet aggregation API.
//!
//! Both aggregation routes read the request body through a blocking
//! `std::io::Read` bridge on the blocking thread pool, so the streaming
//! strategy never holds the whole body in memory.

use super::error::ApiError;
use super::AppState;
use crate::aggregator::{self, Strategy};
use crate::parser::FacetResponse;
use axum::body::Body;
use axum::extract::State;
use axum::Json;
use futures::TryStreamExt;
use http_body_util::Limited;
use log::debug;
use serde::Serialize;
use std::io;
use std::sync::Arc;
use tokio_util::io::{StreamReader, SyncIoBridge};

/// Handle POST /api/v1/buffered
pub async fn buffered(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> Result<Json<FacetResponse>, ApiError> {
    aggregate_body(Strategy::Buffered, &state, body).await.map(Json)
}

/// Handle POST /api/v1/streaming
pub async fn streaming(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> Result<Json<FacetResponse>, ApiError> {
    aggregate_body(Strategy::Streaming, &state, body).await.map(Json)
}

/// Run one strategy over a request body
async fn aggregate_body(
    strategy: Strategy,
    state: &AppState,
    body: Body,
) -> Result<FacetResponse, ApiError> {
    let limited = Body::new(Limited::new(body, state.body_limit));
    let stream = limited.into_data_stream().map_err(io::Error::other);
    let reader = SyncIoBridge::new(StreamReader::new(stream));

    debug!("Aggregating request body with {} strategy", strategy);

    let response = tokio::task::spawn_blocking(move || aggregator::process(strategy, reader))
        .await
        .map_err(|e| ApiError::Internal(format!("aggregation task failed: {}", e)))??;

    debug!("Aggregated {} facets", response.result.len());

    Ok(response)
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Handle GET /api/v1/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
