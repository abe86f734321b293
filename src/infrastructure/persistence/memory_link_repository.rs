//! In-process implementation of link repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{NewShortLink, ShortLink, UsageStats};
use crate::domain::errors::StoreError;
use crate::domain::repositories::LinkRepository;

/// Link store kept in memory with the same conflict semantics as PostgreSQL.
///
/// Codes are claimed through the map's entry API, so two concurrent inserts of
/// the same code can never both succeed. Like the database, an expired link keeps
/// its code until [`LinkRepository::delete_expired`] removes it.
#[derive(Debug)]
pub struct MemoryLinkRepository {
    links: DashMap<String, ShortLink>,
    usage: DashMap<i64, UsageStats>,
    next_id: AtomicI64,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            links: DashMap::new(),
            usage: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored links, expired ones included.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl Default for MemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, StoreError> {
        match self.links.entry(new_link.short_code.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(new_link.short_code)),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let link = new_link.into_link(id);
                self.usage.insert(id, UsageStats::empty(id));
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, StoreError> {
        let now = Utc::now();
        Ok(self
            .links
            .get(code)
            .filter(|link| !link.is_expired_at(now))
            .map(|link| link.clone()))
    }

    async fn find_by_original_url(&self, url: &str) -> Result<Option<ShortLink>, StoreError> {
        let now = Utc::now();
        Ok(self
            .links
            .iter()
            .filter(|link| link.original_url == url && !link.is_expired_at(now))
            .max_by_key(|link| (link.created_at, link.id))
            .map(|link| link.clone()))
    }

    async fn increment_usage(&self, link_id: i64) -> Result<(), StoreError> {
        if let Some(mut usage) = self.usage.get_mut(&link_id) {
            usage.record_click(Utc::now());
        }
        Ok(())
    }

    async fn find_usage(&self, link_id: i64) -> Result<Option<UsageStats>, StoreError> {
        Ok(self.usage.get(&link_id).map(|u| u.clone()))
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        let now = Utc::now();
        let mut removed = Vec::new();

        self.links.retain(|_, link| {
            if link.is_expired_at(now) {
                removed.push(link.id);
                false
            } else {
                true
            }
        });

        for id in &removed {
            self.usage.remove(id);
        }

        Ok(removed.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use std::sync::Arc;

    fn new_link(code: &str, url: &str) -> NewShortLink {
        NewShortLink {
            short_code: code.to_string(),
            original_url: url.to_string(),
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    fn expired_link(code: &str, url: &str) -> NewShortLink {
        NewShortLink {
            expires_at: Some(Utc::now() - TimeDelta::seconds(1)),
            ..new_link(code, url)
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_usage() {
        let repo = MemoryLinkRepository::new();

        let a = repo.create(new_link("aaa", "https://a.io")).await.unwrap();
        let b = repo.create(new_link("bbb", "https://b.io")).await.unwrap();

        assert_ne!(a.id, b.id);
        let usage = repo.find_usage(a.id).await.unwrap().unwrap();
        assert_eq!(usage.click_count, 0);
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let repo = MemoryLinkRepository::new();
        repo.create(new_link("dup", "https://a.io")).await.unwrap();

        let err = repo
            .create(new_link("dup", "https://b.io"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_codes_are_case_sensitive() {
        let repo = MemoryLinkRepository::new();
        repo.create(new_link("abc", "https://a.io")).await.unwrap();
        assert!(repo.create(new_link("ABC", "https://a.io")).await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_same_code_single_winner() {
        let repo = Arc::new(MemoryLinkRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create(new_link("race", &format!("https://{i}.io")))
                        .await
                })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn test_lookups_skip_expired() {
        let repo = MemoryLinkRepository::new();
        repo.create(expired_link("old", "https://a.io")).await.unwrap();

        assert!(repo.find_by_code("old").await.unwrap().is_none());
        assert!(
            repo.find_by_original_url("https://a.io")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_find_by_original_url_returns_newest() {
        let repo = MemoryLinkRepository::new();
        let mut older = new_link("one", "https://a.io");
        older.created_at = Utc::now() - TimeDelta::minutes(5);
        repo.create(older).await.unwrap();
        repo.create(new_link("two", "https://a.io")).await.unwrap();

        let found = repo.find_by_original_url("https://a.io").await.unwrap();
        assert_eq!(found.unwrap().short_code, "two");
    }

    #[tokio::test]
    async fn test_increment_usage() {
        let repo = MemoryLinkRepository::new();
        let link = repo.create(new_link("hit", "https://a.io")).await.unwrap();

        repo.increment_usage(link.id).await.unwrap();
        repo.increment_usage(link.id).await.unwrap();
        repo.increment_usage(9999).await.unwrap();

        let usage = repo.find_usage(link.id).await.unwrap().unwrap();
        assert_eq!(usage.click_count, 2);
        assert!(usage.last_clicked_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_expired_frees_code_and_usage() {
        let repo = MemoryLinkRepository::new();
        let old = repo.create(expired_link("old", "https://a.io")).await.unwrap();
        repo.create(new_link("live", "https://b.io")).await.unwrap();

        assert_eq!(repo.delete_expired().await.unwrap(), 1);
        assert_eq!(repo.delete_expired().await.unwrap(), 0);

        assert!(repo.find_usage(old.id).await.unwrap().is_none());
        assert!(repo.create(new_link("old", "https://c.io")).await.is_ok());
        assert_eq!(repo.len(), 2);
    }
}
