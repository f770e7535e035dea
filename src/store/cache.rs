//! TTL cache in front of an inner [`JobStore`]'s `search`.
//!
//! Identical `(hashtags, limit, offset)` queries within the TTL window are
//! answered from the cache without touching the inner store. Entries expire
//! by TTL only; a write may leave a stale cached page behind until its entry
//! expires (the documented staleness window). `save`, `search_text`, and
//! `set_active` pass straight through.

use crate::error::StoreError;
use crate::models::{normalize_hashtags, JobPosting, SearchPage};
use crate::store::JobStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    tags: Vec<String>,
    limit: usize,
    offset: usize,
}

struct CacheEntry {
    stored_at: Instant,
    page: SearchPage,
}

pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl<S: JobStore> CachedStore<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        CachedStore {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of live (unexpired) cache entries.
    pub fn cached_queries(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries
            .values()
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .count()
    }

    fn key(hashtags: &[String], limit: usize, offset: usize) -> CacheKey {
        let mut tags = normalize_hashtags(hashtags);
        // Order-insensitive: ["a","b"] and ["b","a"] are the same query.
        tags.sort();
        CacheKey {
            tags,
            limit,
            offset,
        }
    }
}

#[async_trait]
impl<S: JobStore> JobStore for CachedStore<S> {
    async fn save(&self, job: &JobPosting) -> Result<String, StoreError> {
        // No invalidation on write; stale pages age out by TTL.
        self.inner.save(job).await
    }

    async fn search(
        &self,
        hashtags: &[String],
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, StoreError> {
        let key = Self::key(hashtags, limit, offset);

        {
            let entries = self.entries.lock().unwrap();
            if let Some(entry) = entries.get(&key) {
                if entry.stored_at.elapsed() < self.ttl {
                    debug!(tags = ?key.tags, limit, offset, "search cache hit");
                    return Ok(entry.page.clone());
                }
            }
        }

        let page = self.inner.search(hashtags, limit, offset).await?;

        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, e| e.stored_at.elapsed() < self.ttl);
        entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                page: page.clone(),
            },
        );
        Ok(page)
    }

    async fn search_text(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, StoreError> {
        self.inner.search_text(query, limit, offset).await
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<(), StoreError> {
        self.inner.set_active(id, active).await
    }
}
