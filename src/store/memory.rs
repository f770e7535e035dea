//! In-memory store implementation for tests and development.

use crate::error::StoreError;
use crate::models::{normalize_hashtags, JobPosting, SearchPage};
use crate::store::{page_from, JobStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Volatile [`JobStore`]; data is lost on restart. Mirrors the SQLite
/// store's semantics (dedup key, ordering, pagination) so tests written
/// against it transfer.
pub struct MemoryStore {
    jobs: RwLock<HashMap<String, JobPosting>>,
    next_id: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            jobs: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn paginate(mut matches: Vec<JobPosting>, limit: usize, offset: usize) -> SearchPage {
        matches.sort_by(|a, b| b.posted_date.cmp(&a.posted_date));
        let total_count = matches.len() as u64;
        let jobs: Vec<JobPosting> = matches.into_iter().skip(offset).take(limit).collect();
        page_from(jobs, total_count, offset)
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn save(&self, job: &JobPosting) -> Result<String, StoreError> {
        let mut jobs = self.jobs.write().unwrap();

        // Dedup by logical key; re-saving the same listing is a no-op.
        if let Some(existing) = jobs
            .values()
            .find(|j| j.source == job.source && j.job_url == job.job_url)
        {
            return Ok(existing.id.clone().expect("stored posting always has an id"));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let mut stored = job.clone();
        stored.id = Some(id.clone());
        stored.normalize();
        jobs.insert(id.clone(), stored);
        Ok(id)
    }

    async fn search(
        &self,
        hashtags: &[String],
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, StoreError> {
        let query = normalize_hashtags(hashtags);
        let matches: Vec<JobPosting> = self
            .jobs
            .read()
            .unwrap()
            .values()
            .filter(|j| j.is_active && j.hashtags.iter().any(|t| query.contains(t)))
            .cloned()
            .collect();
        Ok(Self::paginate(matches, limit, offset))
    }

    async fn search_text(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, StoreError> {
        let needle = query.to_lowercase();
        let matches: Vec<JobPosting> = self
            .jobs
            .read()
            .unwrap()
            .values()
            .filter(|j| {
                j.is_active
                    && (j.title.to_lowercase().contains(&needle)
                        || j.description.to_lowercase().contains(&needle)
                        || j.company.name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        Ok(Self::paginate(matches, limit, offset))
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().unwrap();
        match jobs.get_mut(id) {
            Some(job) => {
                job.is_active = active;
                Ok(())
            }
            None => Err(StoreError::Corrupt(format!("no posting with id {id}"))),
        }
    }
}
