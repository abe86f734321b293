//! Repository trait for short link data access.

use crate::domain::entities::{NewShortLink, ShortLink, UsageStats};
use crate::domain::errors::StoreError;
use async_trait::async_trait;

/// Durable store for short links and their usage counters.
///
/// The store is the only authority on code uniqueness. Lookups never return
/// expired links. Callers bound each call with their own deadline; dropping an
/// in-flight future must leave no partial writes behind.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a link together with zero-valued usage counters.
    ///
    /// Both rows are written atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the short code is already taken.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, StoreError>;

    /// Finds a live link by its short code.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, StoreError>;

    /// Finds the most recently created live link for an original URL.
    async fn find_by_original_url(&self, url: &str) -> Result<Option<ShortLink>, StoreError>;

    /// Bumps the click counter and last-clicked timestamp of a link.
    ///
    /// Incrementing a link that no longer exists is not an error.
    async fn increment_usage(&self, link_id: i64) -> Result<(), StoreError>;

    /// Reads the usage counters of a link.
    async fn find_usage(&self, link_id: i64) -> Result<Option<UsageStats>, StoreError>;

    /// Removes every expired link and its counters in one atomic operation.
    ///
    /// Returns the number of links removed.
    async fn delete_expired(&self) -> Result<u64, StoreError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
