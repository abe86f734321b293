//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink, UsageStats};
use crate::domain::errors::StoreError;
use crate::domain::repositories::LinkRepository;
use crate::utils::db_error::is_unique_violation_on_code;

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    short_code: String,
    original_url: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for ShortLink {
    fn from(r: LinkRow) -> Self {
        ShortLink::new(r.id, r.short_code, r.original_url, r.created_at, r.expires_at)
    }
}

#[derive(sqlx::FromRow)]
struct UsageRow {
    link_id: i64,
    click_count: i64,
    last_clicked_at: Option<DateTime<Utc>>,
}

/// PostgreSQL repository for short links.
///
/// Uniqueness of `short_code` is enforced by the `short_links_short_code_key`
/// constraint; usage rows cascade with their link.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, StoreError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO short_links (short_code, original_url, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, short_code, original_url, created_at, expires_at
            "#,
        )
        .bind(&new_link.short_code)
        .bind(&new_link.original_url)
        .bind(new_link.created_at)
        .bind(new_link.expires_at)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(e) if is_unique_violation_on_code(&e) => {
                return Err(StoreError::Conflict(new_link.short_code));
            }
            Err(e) => return Err(e.into()),
        };

        sqlx::query("INSERT INTO link_usage (link_id, click_count) VALUES ($1, 0)")
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, StoreError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, short_code, original_url, created_at, expires_at
            FROM short_links
            WHERE short_code = $1 AND (expires_at IS NULL OR expires_at > NOW())
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ShortLink::from))
    }

    async fn find_by_original_url(&self, url: &str) -> Result<Option<ShortLink>, StoreError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, short_code, original_url, created_at, expires_at
            FROM short_links
            WHERE original_url = $1 AND (expires_at IS NULL OR expires_at > NOW())
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ShortLink::from))
    }

    async fn increment_usage(&self, link_id: i64) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE link_usage
            SET click_count = click_count + 1,
                last_clicked_at = NOW()
            WHERE link_id = $1
            "#,
        )
        .bind(link_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn find_usage(&self, link_id: i64) -> Result<Option<UsageStats>, StoreError> {
        let row = sqlx::query_as::<_, UsageRow>(
            "SELECT link_id, click_count, last_clicked_at FROM link_usage WHERE link_id = $1",
        )
        .bind(link_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| UsageStats {
            link_id: r.link_id,
            click_count: r.click_count,
            last_clicked_at: r.last_clicked_at,
        }))
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        // link_usage rows go with their link via ON DELETE CASCADE
        let result = sqlx::query(
            "DELETE FROM short_links WHERE expires_at IS NOT NULL AND expires_at <= NOW()",
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
