//! Errors returned by the link engine.

use crate::domain::errors::StoreError;
use crate::utils::url_validator::UrlValidationError;
use std::time::Duration;
use thiserror::Error;

/// Coarse classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    Conflict,
    NotFound,
    Failure,
}

/// Outcome of a failed create, resolve or sweep.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] UrlValidationError),

    #[error("short code already exists: {0}")]
    Conflict(String),

    #[error("no free short code after {0} attempts")]
    Exhausted(u32),

    #[error("short link not found: {0}")]
    NotFound(String),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Store(StoreError),
}

impl LinkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::Conflict(_) | Self::Exhausted(_) => ErrorKind::Conflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Timeout(_) | Self::Store(_) => ErrorKind::Failure,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

impl From<StoreError> for LinkError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(code) => Self::Conflict(code),
            other => Self::Store(other),
        }
    }
}
