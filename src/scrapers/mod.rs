//! Source scrapers for fetching job postings from external boards.
//!
//! Every source implements the same [`JobScraper`] contract:
//!
//! 1. **initialize**: acquire the bounded fetcher (connection pool + identity
//!    policy) for this instance
//! 2. **search_jobs**: build source URLs from the search hashtags, fetch and
//!    parse listing pages, emit normalized [`JobPosting`] values
//! 3. **cleanup**: release the fetcher
//!
//! A fetch failure for one URL never aborts the rest of the batch; scrapers
//! log the failure and return whatever they did manage to parse.
//!
//! # Supported sources
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | FreshersLive | [`freshers_live`] | HTML scraping |
//! | Indeed | [`indeed`] | HTML scraping |
//!
//! The remaining [`JobSource`] variants are recognized by the registry but
//! have no scraper yet (LinkedIn and Twitter need authenticated access).

use crate::config::Settings;
use crate::models::{ExperienceLevel, JobPosting, JobSource, JobType, TimeFilter};
use async_trait::async_trait;
use tracing::{debug, error, info};

pub mod freshers_live;
pub mod indeed;

/// Options applied to a single `search_jobs` call.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Listing pages fetched per hashtag.
    pub max_pages: usize,
    /// Drop postings older than this window, when set.
    pub time_filter: Option<TimeFilter>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            max_pages: 1,
            time_filter: None,
        }
    }
}

/// The polymorphic source-scraper contract.
///
/// Implementations own their fetcher (and thus their connection pool) for the
/// duration of one initialize/search/cleanup cycle; pools are never shared
/// across scraper instances.
#[async_trait]
pub trait JobScraper: Send + Sync {
    fn source(&self) -> JobSource;

    /// Acquire the fetcher. Failure here (client construction) is fatal for
    /// this scraper instance but not for the others in the batch.
    async fn initialize(&mut self) -> Result<(), crate::error::FetchError>;

    /// Fetch and normalize postings for the given hashtags. Partial results
    /// by design: per-URL failures are logged and skipped.
    async fn search_jobs(&self, hashtags: &[String], options: &SearchOptions) -> Vec<JobPosting>;

    /// Release the fetcher. Dropping the scraper has the same effect, which
    /// is what guarantees pool release when a task is cancelled mid-search.
    async fn cleanup(&mut self);
}

/// Build one scraper per enabled source with an implementation.
pub fn build_scrapers(settings: &Settings) -> Vec<Box<dyn JobScraper>> {
    let mut scrapers: Vec<Box<dyn JobScraper>> = Vec::new();
    for board in &settings.boards {
        if !board.enabled {
            debug!(source = %board.source, "source disabled, skipping");
            continue;
        }
        match board.source {
            JobSource::FreshersLive => scrapers.push(Box::new(
                freshers_live::FreshersLiveScraper::new(board.clone(), settings.clone()),
            )),
            JobSource::Indeed => scrapers.push(Box::new(indeed::IndeedScraper::new(
                board.clone(),
                settings.clone(),
            ))),
            other => debug!(source = %other, "no scraper registered for source"),
        }
    }
    scrapers
}

/// Drive one scraper through its full scoped lifecycle.
///
/// Cleanup runs on every exit path of a completed call; if the surrounding
/// task is cancelled instead, dropping the scraper releases its pool.
pub async fn run_scraper(
    scraper: &mut Box<dyn JobScraper>,
    hashtags: &[String],
    options: &SearchOptions,
) -> Vec<JobPosting> {
    let source = scraper.source();
    if let Err(e) = scraper.initialize().await {
        error!(%source, error = %e, "scraper initialization failed");
        return Vec::new();
    }
    let jobs = scraper.search_jobs(hashtags, options).await;
    scraper.cleanup().await;
    info!(%source, count = jobs.len(), "scraper finished");
    jobs
}

/// Keyword table for naive skill detection, keyed on what job boards in this
/// space actually print in descriptions.
const SKILL_KEYWORDS: [&str; 18] = [
    "python",
    "java",
    "javascript",
    "typescript",
    "react",
    "node.js",
    "rust",
    "go",
    "sql",
    "aws",
    "docker",
    "kubernetes",
    "machine learning",
    "data analysis",
    "excel",
    "seo",
    "django",
    "spring",
];

/// Scan text for known skill keywords, preserving table order.
pub fn detect_skills(text: &str) -> Vec<String> {
    let haystack = text.to_lowercase();
    SKILL_KEYWORDS
        .iter()
        .filter(|kw| haystack.contains(*kw))
        .map(|kw| kw.to_string())
        .collect()
}

/// Guess the employment type from listing text; full-time is the default.
pub fn infer_job_type(text: &str) -> JobType {
    let haystack = text.to_lowercase();
    if haystack.contains("intern") {
        JobType::Internship
    } else if haystack.contains("part time") || haystack.contains("part-time") {
        JobType::PartTime
    } else if haystack.contains("freelance") {
        JobType::Freelance
    } else if haystack.contains("contract") {
        JobType::Contract
    } else {
        JobType::FullTime
    }
}

/// Guess the seniority band from listing text.
pub fn infer_experience_level(text: &str, default: ExperienceLevel) -> ExperienceLevel {
    let haystack = text.to_lowercase();
    if haystack.contains("fresher") || haystack.contains("graduate trainee") {
        ExperienceLevel::Fresher
    } else if haystack.contains("senior") || haystack.contains("lead") {
        ExperienceLevel::SeniorLevel
    } else if haystack.contains("director")
        || haystack.contains("vp ")
        || haystack.contains("head of")
    {
        ExperienceLevel::Executive
    } else if haystack.contains("junior") || haystack.contains("entry level") {
        ExperienceLevel::EntryLevel
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_skills_orders_by_table() {
        let skills = detect_skills("We use SQL, Python and Docker daily");
        assert_eq!(skills, vec!["python", "sql", "docker"]);
        assert!(detect_skills("nothing relevant here").is_empty());
    }

    #[test]
    fn test_infer_job_type() {
        assert_eq!(infer_job_type("Summer internship"), JobType::Internship);
        assert_eq!(infer_job_type("part-time cashier"), JobType::PartTime);
        assert_eq!(infer_job_type("6 month contract"), JobType::Contract);
        assert_eq!(infer_job_type("Backend engineer"), JobType::FullTime);
    }

    #[test]
    fn test_infer_experience_level() {
        assert_eq!(
            infer_experience_level("Fresher welcome", ExperienceLevel::EntryLevel),
            ExperienceLevel::Fresher
        );
        assert_eq!(
            infer_experience_level("Senior Rust Engineer", ExperienceLevel::EntryLevel),
            ExperienceLevel::SeniorLevel
        );
        assert_eq!(
            infer_experience_level("Rust Engineer", ExperienceLevel::MidLevel),
            ExperienceLevel::MidLevel
        );
    }

    #[test]
    fn test_registry_honors_enable_flags() {
        let mut settings = Settings::from_env().unwrap();
        for board in &mut settings.boards {
            board.enabled = false;
        }
        assert!(build_scrapers(&settings).is_empty());

        for board in &mut settings.boards {
            board.enabled = true;
        }
        let scrapers = build_scrapers(&settings);
        let sources: Vec<JobSource> = scrapers.iter().map(|s| s.source()).collect();
        assert!(sources.contains(&JobSource::FreshersLive));
        assert!(sources.contains(&JobSource::Indeed));
        // Sources without an implementation are skipped, not stubbed.
        assert!(!sources.contains(&JobSource::Linkedin));
    }
}
