//! Persistence and indexing for normalized job postings.
//!
//! The [`JobStore`] trait is the seam between the scraping pipeline and
//! whatever holds the durable copy. Two implementations ship here:
//!
//! - [`MemoryStore`]: `RwLock<HashMap>`-backed, for tests and development
//! - [`SqliteStore`]: sqlx/SQLite with the full index set and FTS5 text search
//!
//! [`CachedStore`] wraps any `JobStore` with a TTL cache over `search`.
//!
//! The store exclusively owns the durable copy of every posting; scrapers own
//! a record only until `save` hands it off. Saves are independent inserts, so
//! concurrent scrapers need no coordination beyond the store's own guarantees.

use crate::error::StoreError;
use crate::models::{JobPosting, SearchPage};
use async_trait::async_trait;

mod cache;
mod memory;
mod sqlite;

pub use cache::CachedStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Durable store with hashtag and full-text retrieval.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a posting and return its store-assigned id.
    ///
    /// Idempotent per logical key: re-saving a posting with the same
    /// `(source, job_url)` returns the existing id without inserting a
    /// duplicate.
    async fn save(&self, job: &JobPosting) -> Result<String, StoreError>;

    /// Active postings whose hashtag set intersects the query tags,
    /// newest posted first, paginated.
    ///
    /// Query tags are lowercased before matching. `has_more` is true while
    /// `offset + returned < total_count`.
    async fn search(
        &self,
        hashtags: &[String],
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, StoreError>;

    /// Term match over title, description, and company name; active postings
    /// only, newest posted first. Relevance ranking is not specified beyond
    /// term matching.
    async fn search_text(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage, StoreError>;

    /// Flip the soft-delete flag. The only mutation allowed on a stored
    /// posting; records are never physically deleted.
    async fn set_active(&self, id: &str, active: bool) -> Result<(), StoreError>;
}

pub(crate) fn page_from(jobs: Vec<JobPosting>, total_count: u64, offset: usize) -> SearchPage {
    let has_more = (offset as u64 + jobs.len() as u64) < total_count;
    SearchPage {
        jobs,
        total_count,
        has_more,
    }
}
