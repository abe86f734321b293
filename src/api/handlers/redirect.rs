//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /v1/{code}`
///
/// Lookup goes through the cache first and falls back to the database; the
/// click counter is bumped in the background after the response is decided.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown or expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let link = state.link_service.resolve_short_link(&code).await?;

    let location = HeaderValue::try_from(link.original_url).map_err(|e| {
        tracing::error!(code = %code, error = %e, "Stored URL is not a valid Location header");
        AppError::internal("Internal server error", serde_json::json!({}))
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
