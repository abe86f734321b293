//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /v1/health`   - Health check: database and cache (public)
//! - `POST /v1/shorten`  - Create a short link (Bearer API key required)
//! - `GET  /v1/{code}`   - Short link redirect (public)
//!
//! # Middleware
//!
//! Outermost first:
//!
//! - **Request id** - `x-request-id` reused or generated, echoed on the response
//! - **Tracing** - One span per request, tagged with the request id
//! - **Panic recovery** - A panicking handler answers 500
//! - **CORS** - Any origin, `GET`/`POST`
//! - **Authentication** - Bearer API key on the create endpoint
//!
//! [`app_router`] additionally trims trailing slashes.

use crate::api;
use crate::api::middleware::{cors, recovery, request_id, tracing};
use crate::state::AppState;
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// All `/v1` routes with the middleware stack, without path normalization.
pub fn api_router(state: AppState) -> Router {
    let v1 = Router::new()
        .merge(api::routes::protected_routes(state.clone()))
        .merge(api::routes::public_routes());

    Router::new()
        .nest("/v1", v1)
        .with_state(state)
        .layer(cors::layer())
        .layer(recovery::layer())
        .layer(request_id::propagate_layer())
        .layer(tracing::layer())
        .layer(request_id::set_layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(api_router(state))
}
