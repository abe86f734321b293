//! In-process cache backed by Moka.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::ShortLink;
use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone)]
struct CachedLink {
    link: ShortLink,
    ttl: Duration,
}

/// Expires every entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, CachedLink> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedLink,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedLink,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-memory cache with per-entry TTL.
///
/// Suitable for single-node deployments and tests.
#[derive(Clone)]
pub struct MemoryCache {
    cache: Cache<String, CachedLink>,
}

impl MemoryCache {
    /// Creates a cache holding up to `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }

    /// Number of live entries (approximate until pending tasks run).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_link(&self, key: &str) -> CacheResult<Option<ShortLink>> {
        let hit = self.cache.get(key).await.map(|entry| entry.link);
        trace!(key, hit = hit.is_some(), "Memory cache lookup");
        Ok(hit)
    }

    async fn set_link(&self, key: &str, link: &ShortLink, ttl: Duration) -> CacheResult<()> {
        self.cache
            .insert(
                key.to_string(),
                CachedLink {
                    link: link.clone(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
