//! # jobscout
//!
//! A job-posting discovery pipeline that scrapes listings from multiple job
//! boards, normalizes them into a canonical record, deduplicates, and indexes
//! them for hashtag-based retrieval.
//!
//! ## Architecture
//!
//! The pipeline runs in three stages:
//! 1. **Scraping**: one task per enabled board fetches listing pages for the
//!    query hashtags under per-board pacing and identity rotation
//! 2. **Normalization**: extraction heuristics resolve relative dates, pull
//!    contact details, and infer job type / seniority / skills
//! 3. **Indexing**: records land in a SQLite store with hashtag, recency, and
//!    full-text indexes, deduplicated on `(source, job_url)`, fronted by a
//!    TTL search cache

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod identity;
pub mod models;
pub mod scrapers;
pub mod store;

#[cfg(test)]
pub mod testutil;

pub use config::Settings;
pub use error::{ConfigError, FetchError, StoreError};
pub use models::{
    CompanyInfo, ContactInfo, ExperienceLevel, JobPosting, JobSource, JobType, SearchPage,
    TimeFilter,
};
pub use scrapers::{JobScraper, SearchOptions};
pub use store::{CachedStore, JobStore, MemoryStore, SqliteStore};
