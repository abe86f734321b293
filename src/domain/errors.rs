//! Errors reported by the durable store.

use thiserror::Error;

/// Failure modes of a [`crate::domain::repositories::LinkRepository`].
///
/// `Conflict` is the only variant the engine reacts to; everything else is an
/// infrastructure failure and is never interpreted as absence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("short code already exists: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::Unavailable(e.to_string())
            }
            sqlx::Error::Io(_) => Self::Unavailable(e.to_string()),
            other => Self::Database(other),
        }
    }
}
