//! `GET /v1/health`

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::api::dto::health::HealthResponse;
use crate::state::AppState;

/// Probes the link store and the cache. Answers 200 when both respond and
/// 503 with the same body shape otherwise.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.link_service.health().await;

    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        tracing::warn!(store = report.store, cache = report.cache, "Health probe failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(HealthResponse::from(&report)))
}
