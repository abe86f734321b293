//! PostgreSQL connection pool setup.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;

/// Attempts made before giving up on the database.
pub const CONNECT_ATTEMPTS: usize = 10;

/// Pool sizing and timeouts.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 25,
            min_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// Delays between connection attempts: 500ms doubling, capped at 5s.
fn backoff() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(Duration::from_secs(5))
        .take(CONNECT_ATTEMPTS - 1)
}

/// Opens a pool, retrying while the database is not yet reachable.
pub async fn connect_with_retry(
    database_url: &str,
    settings: &PoolSettings,
) -> Result<PgPool, sqlx::Error> {
    let mut attempt = 0usize;

    Retry::start(backoff(), || {
        attempt += 1;
        let options = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout)
            .idle_timeout(settings.idle_timeout)
            .max_lifetime(settings.max_lifetime);
        let current = attempt;

        async move {
            let result = options.connect(database_url).await;
            if let Err(ref e) = result {
                tracing::warn!(attempt = current, error = %e, "Database not ready");
            }
            result
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule() {
        let delays: Vec<u64> = backoff().map(|d| d.as_millis() as u64).collect();

        assert_eq!(delays.len(), CONNECT_ATTEMPTS - 1);
        assert_eq!(&delays[..4], &[500, 1000, 2000, 4000]);
        assert!(delays[4..].iter().all(|&d| d == 5000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_every_attempt() {
        let started = tokio::time::Instant::now();

        let result = connect_with_retry("not-a-database-url", &PoolSettings::default()).await;

        assert!(result.is_err());
        let waited: Duration = backoff().sum();
        assert!(started.elapsed() >= waited);
    }
}
