//! Environment-sourced configuration.
//!
//! Every option has a default so the binary runs without a `.env` file;
//! anything set in the environment (or `.env`, via dotenvy) overrides it.
//! Malformed values are a startup error rather than a silent fallback.

use crate::error::ConfigError;
use crate::models::JobSource;
use std::env;

/// Application settings, constructed once at process start and passed down
/// explicitly to the components that need them.
#[derive(Debug, Clone)]
pub struct Settings {
    /// SQLite connection URL for the durable store.
    pub database_url: String,
    /// TTL for cached search results, in seconds.
    pub cache_ttl_secs: u64,
    /// Minimum pacing delay between requests, in seconds.
    pub scraping_delay_min: f64,
    /// Maximum pacing delay between requests, in seconds.
    pub scraping_delay_max: f64,
    /// Upper bound on concurrent requests per scraper instance.
    pub max_concurrent_requests: usize,
    /// Total per-request timeout, in seconds.
    pub request_timeout_secs: u64,
    pub proxy_enabled: bool,
    pub proxy_list: Vec<String>,
    pub proxy_rotation_enabled: bool,
    pub user_agent_rotation: bool,
    /// Longest text slice handed to the contact extractor.
    pub max_text_length: usize,
    pub default_page_size: usize,
    pub max_export_records: usize,
    pub boards: Vec<BoardConfig>,
}

/// Per-source scraping configuration.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub source: JobSource,
    pub enabled: bool,
    pub base_url: String,
    /// Requests per minute the source tolerates.
    pub rate_limit: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Settings {
            database_url: get_env("DATABASE_URL", "sqlite://jobscout.db?mode=rwc"),
            cache_ttl_secs: get_env_parse("CACHE_TTL_SECS", 3600)?,
            scraping_delay_min: get_env_parse("SCRAPING_DELAY_MIN", 1.0)?,
            scraping_delay_max: get_env_parse("SCRAPING_DELAY_MAX", 5.0)?,
            max_concurrent_requests: get_env_parse("MAX_CONCURRENT_REQUESTS", 10)?,
            request_timeout_secs: get_env_parse("REQUEST_TIMEOUT", 30)?,
            proxy_enabled: get_env_parse("PROXY_ENABLED", false)?,
            proxy_list: get_env_list("PROXY_LIST"),
            proxy_rotation_enabled: get_env_parse("PROXY_ROTATION_ENABLED", true)?,
            user_agent_rotation: get_env_parse("USER_AGENT_ROTATION", true)?,
            max_text_length: get_env_parse("MAX_TEXT_LENGTH", 5000)?,
            default_page_size: get_env_parse("DEFAULT_PAGE_SIZE", 50)?,
            max_export_records: get_env_parse("MAX_EXPORT_RECORDS", 10_000)?,
            boards: default_boards()?,
        })
    }

    /// Board configuration for one source, if that source is known.
    pub fn board(&self, source: JobSource) -> Option<&BoardConfig> {
        self.boards.iter().find(|b| b.source == source)
    }
}

/// Built-in board table; enable flags and base URLs are overridable per
/// source via `<SOURCE>_ENABLED` and `<SOURCE>_BASE_URL`.
fn default_boards() -> Result<Vec<BoardConfig>, ConfigError> {
    let defaults: [(JobSource, &str, u32); 6] = [
        (JobSource::Linkedin, "https://www.linkedin.com/jobs/search", 60),
        (JobSource::Naukri, "https://www.naukri.com/jobs-search", 120),
        (JobSource::Indeed, "https://www.indeed.com/jobs", 100),
        (JobSource::Glassdoor, "https://www.glassdoor.com/Job/jobs.htm", 50),
        (JobSource::FreshersLive, "https://www.fresherslive.com/jobs", 80),
        (JobSource::Twitter, "https://twitter.com/search", 300),
    ];

    defaults
        .into_iter()
        .map(|(source, base_url, rate_limit)| {
            let prefix = source.as_str().to_uppercase();
            Ok(BoardConfig {
                source,
                enabled: get_env_parse(&format!("{prefix}_ENABLED"), true)?,
                base_url: get_env(&format!("{prefix}_BASE_URL"), base_url),
                rate_limit: get_env_parse(&format!("{prefix}_RATE_LIMIT"), rate_limit)?,
            })
        })
        .collect()
}

fn get_env(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| ConfigError(format!("invalid value for {name}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Comma-separated list variable; empty or unset means an empty list.
fn get_env_list(name: &str) -> Vec<String> {
    env::var(name)
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
