//! Error taxonomy for the scraping pipeline.
//!
//! Network and HTTP failures are ordinary, recoverable outcomes here: the
//! fetcher returns them as typed [`FetchError`] values and scrapers branch on
//! them (skip the URL, keep the batch going) instead of propagating them as
//! control flow. Store connectivity problems are the fatal kind and abort the
//! whole run.

use thiserror::Error;

/// Failure of a single fetch, classified for the calling scraper.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-200 status.
    #[error("HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The request exceeded the configured total timeout.
    #[error("request timed out for {url}")]
    Timeout { url: String },

    /// Connection-level failure (refused, DNS, TLS, broken transfer).
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client (connection pool, proxy) could not be constructed.
    /// Unlike the variants above this is fatal to the scraper instance.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Failure in the persistence and index layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The durable store could not be reached at startup. Fatal.
    #[error("failed to connect to store at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("store query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// A stored row could not be mapped back to a [`crate::models::JobPosting`].
    #[error("corrupt stored record: {0}")]
    Corrupt(String),
}

/// Malformed environment configuration, fatal at startup.
#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(pub String);
