#![allow(dead_code)]

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use shortlink::application::services::{AuthService, CacheTtlPolicy, EngineSettings, LinkService};
use shortlink::domain::repositories::LinkRepository;
use shortlink::infrastructure::cache::{CacheService, MemoryCache, NullCache};
use shortlink::infrastructure::persistence::{MemoryLinkRepository, PgLinkRepository};
use shortlink::state::AppState;
use shortlink::utils::code_generator::CodeGenerator;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_BASE_URL: &str = "https://sho.rt";

pub fn test_settings() -> EngineSettings {
    EngineSettings {
        base_url: TEST_BASE_URL.to_string(),
        request_timeout: Duration::from_secs(2),
        usage_timeout: Duration::from_secs(2),
        ..EngineSettings::default()
    }
}

pub fn link_service_with(
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    settings: EngineSettings,
) -> Arc<LinkService> {
    Arc::new(LinkService::new(
        repository,
        cache,
        CodeGenerator::default(),
        settings,
    ))
}

/// Engine over the in-memory store and cache, capping cache TTL at link expiry.
pub fn memory_engine() -> (Arc<LinkService>, Arc<MemoryLinkRepository>) {
    let repository = Arc::new(MemoryLinkRepository::new());
    let service = link_service_with(
        repository.clone(),
        Arc::new(MemoryCache::default()),
        EngineSettings {
            cache_ttl_policy: CacheTtlPolicy::CapAtExpiry,
            ..test_settings()
        },
    );
    (service, repository)
}

pub fn state_for(link_service: Arc<LinkService>) -> AppState {
    AppState::new(link_service, Arc::new(AuthService::new(TEST_API_KEY)))
}

pub fn create_memory_state() -> (AppState, Arc<MemoryLinkRepository>) {
    let (service, repository) = memory_engine();
    (state_for(service), repository)
}

pub fn create_pg_state(pool: PgPool) -> AppState {
    let repository = Arc::new(PgLinkRepository::new(Arc::new(pool)));
    state_for(link_service_with(
        repository,
        Arc::new(NullCache::new()),
        test_settings(),
    ))
}

pub fn bearer() -> String {
    format!("Bearer {TEST_API_KEY}")
}

/// Polls `check` until it holds or a second passes.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

pub async fn insert_link(pool: &PgPool, code: &str, url: &str, expired: bool) -> i64 {
    let expires = if expired {
        "NOW() - INTERVAL '1 hour'"
    } else {
        "NULL"
    };

    let id: i64 = sqlx::query_scalar(&format!(
        "INSERT INTO short_links (short_code, original_url, expires_at) \
         VALUES ($1, $2, {expires}) RETURNING id"
    ))
    .bind(code)
    .bind(url)
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query("INSERT INTO link_usage (link_id) VALUES ($1)")
        .bind(id)
        .execute(pool)
        .await
        .unwrap();

    id
}
