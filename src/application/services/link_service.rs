//! Short link allocation and resolution.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::application::errors::LinkError;
use crate::domain::entities::{CreateLinkOptions, NewShortLink, ShortLink, UsageStats};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::CodeGenerator;
use crate::utils::url_validator::validate_url;

/// How long a resolved link may stay in the lookup cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheTtlPolicy {
    /// Every entry lives for the configured TTL, even past the link's own expiry.
    #[default]
    Fixed,
    /// The configured TTL, shortened so an entry never outlives its link.
    CapAtExpiry,
}

impl std::str::FromStr for CacheTtlPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Self::Fixed),
            "cap_at_expiry" => Ok(Self::CapAtExpiry),
            other => Err(format!(
                "expected 'fixed' or 'cap_at_expiry', got '{other}'"
            )),
        }
    }
}

/// Tunables for [`LinkService`].
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub code_length: usize,
    pub max_attempts: u32,
    pub cache_ttl: Duration,
    pub cache_ttl_policy: CacheTtlPolicy,
    /// Deadline for a whole create, resolve or sweep.
    pub request_timeout: Duration,
    /// Deadline for the detached usage increment.
    pub usage_timeout: Duration,
    pub base_url: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            code_length: 6,
            max_attempts: 5,
            cache_ttl: Duration::from_secs(3600),
            cache_ttl_policy: CacheTtlPolicy::Fixed,
            request_timeout: Duration::from_secs(5),
            usage_timeout: Duration::from_secs(5),
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Reachability of the store and the cache, checked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthReport {
    pub store: bool,
    pub cache: bool,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.store && self.cache
    }
}

/// Creates and resolves short links.
///
/// Uniqueness of codes is left to the repository's atomic insert; the service
/// itself holds no mutable state and is shared across request tasks.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    generator: CodeGenerator,
    settings: EngineSettings,
}

impl LinkService {
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        generator: CodeGenerator,
        settings: EngineSettings,
    ) -> Self {
        Self {
            repository,
            cache,
            generator,
            settings,
        }
    }

    /// Creates a short link, or returns the live link already pointing at the
    /// same URL when no custom code was requested.
    ///
    /// # Errors
    ///
    /// - [`LinkError::InvalidUrl`] if the URL lacks a scheme or host
    /// - [`LinkError::Conflict`] if the custom code is taken
    /// - [`LinkError::Exhausted`] if every generated code collided
    /// - [`LinkError::Timeout`] / [`LinkError::Store`] on infrastructure failure
    pub async fn create_short_link(
        &self,
        options: CreateLinkOptions,
    ) -> Result<ShortLink, LinkError> {
        self.within_deadline(self.create_inner(options)).await
    }

    async fn create_inner(&self, options: CreateLinkOptions) -> Result<ShortLink, LinkError> {
        validate_url(&options.original_url)?;

        let custom_code = options.requested_code();

        if custom_code.is_none()
            && let Some(existing) = self
                .repository
                .find_by_original_url(&options.original_url)
                .await?
        {
            debug!(code = %existing.short_code, "Reusing existing short link");
            return Ok(existing);
        }

        let now = Utc::now();
        let expires_at = options.expires_at(now);

        let link = match custom_code {
            Some(code) => {
                self.repository
                    .create(NewShortLink {
                        short_code: code.to_string(),
                        original_url: options.original_url.clone(),
                        created_at: now,
                        expires_at,
                    })
                    .await?
            }
            None => {
                self.insert_generated(&options.original_url, now, expires_at)
                    .await?
            }
        };

        info!(code = %link.short_code, "Short link created");
        self.populate_cache(&link).await;

        Ok(link)
    }

    /// Inserts under fresh random codes until one is free or the budget runs out.
    async fn insert_generated(
        &self,
        original_url: &str,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLink, LinkError> {
        for attempt in 1..=self.settings.max_attempts {
            let code = self.generator.generate(self.settings.code_length);

            let result = self
                .repository
                .create(NewShortLink {
                    short_code: code,
                    original_url: original_url.to_string(),
                    created_at,
                    expires_at,
                })
                .await;

            match result {
                Ok(link) => return Ok(link),
                Err(e) if e.is_conflict() => {
                    debug!(attempt, "Generated code collided, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            attempts = self.settings.max_attempts,
            "Could not allocate a free short code"
        );
        Err(LinkError::Exhausted(self.settings.max_attempts))
    }

    /// Resolves a code to its link and records the visit in the background.
    ///
    /// # Errors
    ///
    /// [`LinkError::NotFound`] if no live link has this code.
    pub async fn resolve_short_link(&self, code: &str) -> Result<ShortLink, LinkError> {
        let link = self.within_deadline(self.resolve_inner(code)).await?;
        self.record_usage(link.id);
        Ok(link)
    }

    async fn resolve_inner(&self, code: &str) -> Result<ShortLink, LinkError> {
        match self.cache.get_link(code).await {
            Ok(Some(link)) => {
                debug!(code, "Cache hit");
                return Ok(link);
            }
            Ok(None) => debug!(code, "Cache miss"),
            Err(e) => warn!(code, error = %e, "Cache lookup failed, using store"),
        }

        let link = self
            .repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| LinkError::NotFound(code.to_string()))?;

        self.populate_cache(&link).await;

        Ok(link)
    }

    /// Removes every expired link together with its usage counters.
    pub async fn cleanup_expired(&self) -> Result<u64, LinkError> {
        let removed = self
            .within_deadline(async { Ok::<_, LinkError>(self.repository.delete_expired().await?) })
            .await?;

        if removed > 0 {
            info!(removed, "Expired links removed");
        } else {
            debug!("No expired links to remove");
        }

        Ok(removed)
    }

    /// Current usage counters of a live link.
    pub async fn usage_for(&self, code: &str) -> Result<UsageStats, LinkError> {
        self.within_deadline(async {
            let link = self
                .repository
                .find_by_code(code)
                .await?
                .ok_or_else(|| LinkError::NotFound(code.to_string()))?;

            let usage = self.repository.find_usage(link.id).await?;
            Ok::<_, LinkError>(usage.unwrap_or_else(|| UsageStats::empty(link.id)))
        })
        .await
    }

    /// Public URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), code)
    }

    /// Probes the store and the cache, each bounded by the request timeout.
    pub async fn health(&self) -> HealthReport {
        let limit = self.settings.request_timeout;

        let store = match tokio::time::timeout(limit, self.repository.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Store health check failed");
                false
            }
            Err(_) => {
                warn!("Store health check timed out");
                false
            }
        };

        let cache = tokio::time::timeout(limit, self.cache.health_check())
            .await
            .unwrap_or_else(|_| {
                warn!("Cache health check timed out");
                false
            });

        HealthReport { store, cache }
    }

    async fn within_deadline<T>(
        &self,
        fut: impl Future<Output = Result<T, LinkError>>,
    ) -> Result<T, LinkError> {
        let limit = self.settings.request_timeout;
        tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| LinkError::Timeout(limit))?
    }

    fn cache_ttl_for(&self, link: &ShortLink, now: DateTime<Utc>) -> Option<Duration> {
        let ttl = self.settings.cache_ttl;

        match (self.settings.cache_ttl_policy, link.expires_at) {
            (CacheTtlPolicy::CapAtExpiry, Some(expires_at)) => (expires_at - now)
                .to_std()
                .ok()
                .filter(|left| !left.is_zero())
                .map(|left| left.min(ttl)),
            _ => Some(ttl),
        }
    }

    async fn populate_cache(&self, link: &ShortLink) {
        let Some(ttl) = self.cache_ttl_for(link, Utc::now()) else {
            return;
        };

        if let Err(e) = self.cache.set_link(&link.short_code, link, ttl).await {
            warn!(code = %link.short_code, error = %e, "Failed to cache link");
        }
    }

    /// Increments the click counter in a detached task with its own deadline.
    fn record_usage(&self, link_id: i64) {
        let repository = Arc::clone(&self.repository);
        let limit = self.settings.usage_timeout;

        tokio::spawn(async move {
            match tokio::time::timeout(limit, repository.increment_usage(link_id)).await {
                Ok(Ok(())) => trace!(link_id, "Usage recorded"),
                Ok(Err(e)) => warn!(link_id, error = %e, "Failed to record usage"),
                Err(_) => debug!(link_id, "Usage update timed out"),
            }
        });
    }
}
