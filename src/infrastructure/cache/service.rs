//! Cache service trait and error types.

use crate::domain::entities::ShortLink;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),

    #[error("Cache serialization error: {0}")]
    SerializationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Best-effort lookup cache for short links.
///
/// The cache is never authoritative. Implementations report backend problems as
/// [`CacheError`]; callers treat any error exactly like a miss and fall through
/// to the durable store.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process cache
/// - [`crate::infrastructure::cache::NullCache`] - Always misses
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves a cached link.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(link))` on cache hit
    /// - `Ok(None)` on a clean miss
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot answer. This is not a miss
    /// and must not be read as "the link does not exist".
    async fn get_link(&self, key: &str) -> CacheResult<Option<ShortLink>>;

    /// Stores a link under `key` for `ttl`.
    ///
    /// The TTL is independent of the link's own expiry.
    async fn set_link(&self, key: &str, link: &ShortLink, ttl: Duration) -> CacheResult<()>;

    /// Removes a cached entry. Removing a missing key is not an error.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
