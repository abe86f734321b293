//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for one URL.
///
/// # Endpoint
///
/// `POST /v1/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "original_url": "https://example.com/some/long/path",
///   "custom_code": "promo",        // optional
///   "expires_in_seconds": 86400    // optional, 0 = never
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "short_url": "https://sho.rt/promo",
///   "code": "promo",
///   "expires_at": "2030-01-02T03:04:05Z"
/// }
/// ```
///
/// Submitting a URL that already has a live link (without a custom code)
/// returns that link again.
///
/// # Errors
///
/// - 400 `validation_error` / `invalid_url` for bad input
/// - 409 `conflict` if the custom code is taken
/// - 503 `unavailable` if the request deadline passes
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload.map_err(|e| {
        AppError::bad_request("Invalid request body", json!({ "reason": e.body_text() }))
    })?;
    payload.validate()?;

    let link = state
        .link_service
        .create_short_link(payload.into_options())
        .await?;

    let response = ShortenResponse::new(
        state.link_service.short_url(&link.short_code),
        link.short_code,
        link.expires_at,
    );

    Ok((StatusCode::CREATED, Json(response)))
}
