//! DTOs for link shortening endpoint.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::entities::CreateLinkOptions;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The URL to shorten; scheme and host are checked by the service.
    #[validate(length(min = 1, message = "original_url must not be empty"))]
    pub original_url: String,

    /// Optional literal short code. Empty means "generate one".
    #[validate(
        length(max = 64, message = "custom_code is too long"),
        custom(function = "routable_code")
    )]
    pub custom_code: Option<String>,

    /// Lifetime in seconds; `0` or absent means the link never expires.
    #[validate(range(min = 0, message = "expires_in_seconds must not be negative"))]
    pub expires_in_seconds: Option<i64>,
}

/// Path segments under `/v1` that belong to other routes.
const RESERVED_CODES: &[&str] = &["health", "shorten"];

/// A custom code must come back intact as the single `{code}` path segment.
fn routable_code(code: &str) -> Result<(), ValidationError> {
    if RESERVED_CODES.contains(&code) {
        return Err(ValidationError::new("reserved_code")
            .with_message("custom_code collides with a fixed route".into()));
    }
    let unroutable = |c: char| {
        matches!(c, '/' | '?' | '#' | '%' | '\\') || c.is_whitespace() || c.is_control()
    };
    if code.chars().any(unroutable) {
        return Err(ValidationError::new("unroutable_code").with_message(
            "custom_code must not contain path, query or fragment delimiters".into(),
        ));
    }
    Ok(())
}

impl ShortenRequest {
    pub fn into_options(self) -> CreateLinkOptions {
        let mut options = CreateLinkOptions::new(self.original_url);
        if let Some(code) = self.custom_code {
            options = options.with_custom_code(code);
        }
        if let Some(secs) = self.expires_in_seconds
            && let Some(delta) = TimeDelta::try_seconds(secs)
        {
            options = options.with_expires_in(delta);
        }
        options
    }
}

/// Created (or reused) short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl ShortenResponse {
    pub fn new(short_url: String, code: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            short_url,
            code,
            expires_at: expires_at.map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}
