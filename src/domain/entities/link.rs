//! Short link entity representing a code to URL mapping.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A shortened URL mapping.
///
/// Created once by [`crate::application::services::LinkService`] and never updated
/// afterwards; only its usage counters change. A link whose `expires_at` lies in the
/// past is logically gone even while the row still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(
        id: i64,
        short_code: String,
        original_url: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            short_code,
            original_url,
            created_at,
            expires_at,
        }
    }

    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns true if the link is expired relative to `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }
}

/// Input data for inserting a new link.
///
/// The store assigns the `id`; everything else is decided by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewShortLink {
    /// Attaches the store-assigned id, producing the persisted entity.
    pub fn into_link(self, id: i64) -> ShortLink {
        ShortLink::new(
            id,
            self.short_code,
            self.original_url,
            self.created_at,
            self.expires_at,
        )
    }
}

/// Caller-supplied parameters for creating a short link.
///
/// An empty `custom_code` is the same as no custom code. A non-positive
/// `expires_in` means the link never expires.
#[derive(Debug, Clone, Default)]
pub struct CreateLinkOptions {
    pub original_url: String,
    pub custom_code: Option<String>,
    pub expires_in: Option<TimeDelta>,
}

impl CreateLinkOptions {
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            ..Self::default()
        }
    }

    pub fn with_custom_code(mut self, code: impl Into<String>) -> Self {
        self.custom_code = Some(code.into());
        self
    }

    pub fn with_expires_in(mut self, expires_in: TimeDelta) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// The requested custom code, if any non-empty one was given.
    pub fn requested_code(&self) -> Option<&str> {
        self.custom_code.as_deref().filter(|c| !c.is_empty())
    }

    /// Absolute expiry for a link created at `now`.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in
            .filter(|d| *d > TimeDelta::zero())
            .and_then(|d| now.checked_add_signed(d))
    }
}
