//! API key check for the write endpoints.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::{error::AppError, state::AppState};

/// Requires `Authorization: Bearer <API_KEY>` before the request reaches the
/// handler. A missing or malformed header and a wrong key both answer 401.
pub async fn layer(
    State(st): State<AppState>,
    bearer: Result<AuthBearer, (StatusCode, &'static str)>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let AuthBearer(token) = bearer.map_err(|(_, reason)| {
        tracing::debug!(reason, "Rejected request without bearer token");
        AppError::unauthorized("Unauthorized", json!({ "reason": "missing bearer token" }))
    })?;

    st.auth_service.authenticate(&token)?;

    Ok(next.run(req).await)
}
