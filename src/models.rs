//! Data models for job postings and their value objects.
//!
//! This module defines the core data structures used throughout the application:
//! - [`JobPosting`]: The canonical, normalized job record every scraper emits
//! - [`CompanyInfo`] / [`ContactInfo`]: Nested value objects
//! - Enums: [`JobSource`], [`JobType`], [`ExperienceLevel`], [`TimeFilter`]
//! - [`SearchPage`]: A paginated slice of search results
//!
//! A [`JobPosting`] is created by a source scraper at extraction time and is
//! immutable once stored, except for the `is_active` flag (soft delete only).

use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One enumerated external origin a posting can be scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSource {
    Linkedin,
    Naukri,
    Indeed,
    Glassdoor,
    FreshersLive,
    Twitter,
}

impl JobSource {
    /// All supported sources, in registry order.
    pub const ALL: [JobSource; 6] = [
        JobSource::Linkedin,
        JobSource::Naukri,
        JobSource::Indeed,
        JobSource::Glassdoor,
        JobSource::FreshersLive,
        JobSource::Twitter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::Linkedin => "linkedin",
            JobSource::Naukri => "naukri",
            JobSource::Indeed => "indeed",
            JobSource::Glassdoor => "glassdoor",
            JobSource::FreshersLive => "freshers_live",
            JobSource::Twitter => "twitter",
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linkedin" => Ok(JobSource::Linkedin),
            "naukri" => Ok(JobSource::Naukri),
            "indeed" => Ok(JobSource::Indeed),
            "glassdoor" => Ok(JobSource::Glassdoor),
            "freshers_live" => Ok(JobSource::FreshersLive),
            "twitter" => Ok(JobSource::Twitter),
            other => Err(format!("unknown job source: {other}")),
        }
    }
}

/// Employment type of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Freelance,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full_time",
            JobType::PartTime => "part_time",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
            JobType::Freelance => "freelance",
        }
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_time" => Ok(JobType::FullTime),
            "part_time" => Ok(JobType::PartTime),
            "contract" => Ok(JobType::Contract),
            "internship" => Ok(JobType::Internship),
            "freelance" => Ok(JobType::Freelance),
            other => Err(format!("unknown job type: {other}")),
        }
    }
}

/// Seniority band of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Fresher,
    EntryLevel,
    MidLevel,
    SeniorLevel,
    Executive,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Fresher => "fresher",
            ExperienceLevel::EntryLevel => "entry_level",
            ExperienceLevel::MidLevel => "mid_level",
            ExperienceLevel::SeniorLevel => "senior_level",
            ExperienceLevel::Executive => "executive",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fresher" => Ok(ExperienceLevel::Fresher),
            "entry_level" => Ok(ExperienceLevel::EntryLevel),
            "mid_level" => Ok(ExperienceLevel::MidLevel),
            "senior_level" => Ok(ExperienceLevel::SeniorLevel),
            "executive" => Ok(ExperienceLevel::Executive),
            other => Err(format!("unknown experience level: {other}")),
        }
    }
}

/// Recency window applied at scrape time to drop stale postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum TimeFilter {
    #[serde(rename = "24h")]
    Last24h,
    #[serde(rename = "3d")]
    Last3d,
    #[serde(rename = "7d")]
    Last7d,
    #[serde(rename = "14d")]
    Last14d,
    #[serde(rename = "30d")]
    Last30d,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Last24h => "24h",
            TimeFilter::Last3d => "3d",
            TimeFilter::Last7d => "7d",
            TimeFilter::Last14d => "14d",
            TimeFilter::Last30d => "30d",
        }
    }

    /// Oldest acceptable posting date relative to `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeFilter::Last24h => now - Duration::hours(24),
            TimeFilter::Last3d => now - Duration::days(3),
            TimeFilter::Last7d => now - Duration::days(7),
            TimeFilter::Last14d => now - Duration::days(14),
            TimeFilter::Last30d => now - Duration::days(30),
        }
    }
}

impl FromStr for TimeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(TimeFilter::Last24h),
            "3d" => Ok(TimeFilter::Last3d),
            "7d" => Ok(TimeFilter::Last7d),
            "14d" => Ok(TimeFilter::Last14d),
            "30d" => Ok(TimeFilter::Last30d),
            other => Err(format!("unknown time filter: {other} (use 24h, 3d, 7d, 14d, or 30d)")),
        }
    }
}

/// Company details attached to a posting. Only the name is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompanyInfo {
    pub name: String,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
}

impl CompanyInfo {
    pub fn named(name: impl Into<String>) -> Self {
        CompanyInfo {
            name: name.into(),
            ..CompanyInfo::default()
        }
    }
}

/// Contact details extracted from a posting.
///
/// An instance is only materialized when at least one of email, phone, or
/// LinkedIn profile was found; "no contact found" is represented as `None`
/// at the call site, never as an empty struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_profile: Option<String>,
    pub twitter_handle: Option<String>,
    #[serde(default)]
    pub whatsapp_available: bool,
}

impl ContactInfo {
    /// True when none of the fields that justify materialization are set.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.linkedin_profile.is_none()
    }
}

/// The canonical job posting record.
///
/// Invariants enforced by [`JobPosting::normalize`]:
/// - `hashtags` are lowercase and de-duplicated (insertion order kept)
/// - `posted_date <= scraped_at`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobPosting {
    /// Store-assigned identifier; `None` until persisted.
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub company: CompanyInfo,
    pub location: String,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub skills_required: Vec<String>,
    pub posted_date: DateTime<Utc>,
    pub job_url: String,
    pub source: JobSource,
    pub contact_info: Option<ContactInfo>,
    pub hashtags: Vec<String>,
    pub scraped_at: DateTime<Utc>,
    pub is_active: bool,
}

impl JobPosting {
    /// Enforce the record invariants in place.
    ///
    /// Lowercases and de-duplicates hashtags and clamps `posted_date` so it
    /// never lies after `scraped_at`.
    pub fn normalize(&mut self) {
        let tags: Vec<String> = self.hashtags.drain(..).collect();
        self.hashtags = normalize_hashtags(tags);
        if self.posted_date > self.scraped_at {
            self.posted_date = self.scraped_at;
        }
    }
}

/// Lowercase and de-duplicate hashtags, preserving first-seen order.
pub fn normalize_hashtags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().trim_start_matches('#').to_lowercase())
        .filter(|t| !t.is_empty())
        .unique()
        .collect()
}

/// Bounds on a hashtag query: at least one tag, at most ten.
pub const MIN_QUERY_HASHTAGS: usize = 1;
pub const MAX_QUERY_HASHTAGS: usize = 10;

/// Validate a hashtag query before any fetch or store access happens.
pub fn validate_hashtags(tags: &[String]) -> Result<Vec<String>, String> {
    let normalized = normalize_hashtags(tags);
    if normalized.len() < MIN_QUERY_HASHTAGS {
        return Err("at least one hashtag is required".to_string());
    }
    if normalized.len() > MAX_QUERY_HASHTAGS {
        return Err(format!(
            "too many hashtags: {} (maximum {MAX_QUERY_HASHTAGS})",
            normalized.len()
        ));
    }
    Ok(normalized)
}

/// A paginated page of search results as served to the API layer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchPage {
    pub jobs: Vec<JobPosting>,
    pub total_count: u64,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_posting() -> JobPosting {
        let now = Utc::now();
        JobPosting {
            id: None,
            title: "Backend Engineer".to_string(),
            description: "Build services".to_string(),
            company: CompanyInfo::named("Acme"),
            location: "Remote".to_string(),
            job_type: JobType::FullTime,
            experience_level: ExperienceLevel::MidLevel,
            skills_required: vec!["rust".to_string(), "sql".to_string()],
            posted_date: now,
            job_url: "https://example.com/jobs/1".to_string(),
            source: JobSource::Indeed,
            contact_info: None,
            hashtags: vec!["Rust".to_string(), "#rust".to_string(), "Backend".to_string()],
            scraped_at: now,
            is_active: true,
        }
    }

    #[test]
    fn test_normalize_hashtags_lowercase_and_dedup() {
        let tags = normalize_hashtags(["Python", "#python", "PYTHON", "django", ""]);
        assert_eq!(tags, vec!["python", "django"]);
    }

    #[test]
    fn test_posting_normalize_enforces_invariants() {
        let mut job = sample_posting();
        job.posted_date = job.scraped_at + Duration::hours(2);
        job.normalize();
        assert_eq!(job.hashtags, vec!["rust", "backend"]);
        assert_eq!(job.posted_date, job.scraped_at);
    }

    #[test]
    fn test_validate_hashtags_bounds() {
        assert!(validate_hashtags(&[]).is_err());
        assert!(validate_hashtags(&["python".to_string()]).is_ok());
        let many: Vec<String> = (0..11).map(|i| format!("tag{i}")).collect();
        assert!(validate_hashtags(&many).is_err());
        // Duplicates collapse before the bound check.
        let dupes = vec!["rust".to_string(); 12];
        assert_eq!(validate_hashtags(&dupes).unwrap(), vec!["rust"]);
    }

    #[test]
    fn test_source_round_trip() {
        for source in JobSource::ALL {
            assert_eq!(source.as_str().parse::<JobSource>().unwrap(), source);
        }
        assert!("usenet".parse::<JobSource>().is_err());
    }

    #[test]
    fn test_enum_serde_names() {
        assert_eq!(
            serde_json::to_string(&JobSource::FreshersLive).unwrap(),
            "\"freshers_live\""
        );
        assert_eq!(
            serde_json::to_string(&JobType::FullTime).unwrap(),
            "\"full_time\""
        );
        assert_eq!(
            serde_json::to_string(&ExperienceLevel::EntryLevel).unwrap(),
            "\"entry_level\""
        );
    }

    #[test]
    fn test_contact_info_is_empty() {
        let empty = ContactInfo::default();
        assert!(empty.is_empty());
        let with_email = ContactInfo {
            email: Some("jane@example.com".to_string()),
            ..ContactInfo::default()
        };
        assert!(!with_email.is_empty());
        // A bare name does not justify materialization.
        let name_only = ContactInfo {
            name: Some("Jane".to_string()),
            ..ContactInfo::default()
        };
        assert!(name_only.is_empty());
    }

    #[test]
    fn test_time_filter_cutoff() {
        let now = Utc::now();
        assert_eq!(TimeFilter::Last24h.cutoff(now), now - Duration::hours(24));
        assert_eq!(TimeFilter::Last7d.cutoff(now), now - Duration::days(7));
    }

    #[test]
    fn test_time_filter_parse() {
        assert_eq!("24h".parse::<TimeFilter>().unwrap(), TimeFilter::Last24h);
        assert_eq!("30d".parse::<TimeFilter>().unwrap(), TimeFilter::Last30d);
        assert!("2w".parse::<TimeFilter>().is_err());
    }

    #[test]
    fn test_posting_serde_round_trip() {
        let job = sample_posting();
        let json = serde_json::to_string(&job).unwrap();
        let back: JobPosting = serde_json::from_str(&json).unwrap();
        assert_eq!(back.title, job.title);
        assert_eq!(back.source, JobSource::Indeed);
        assert_eq!(back.company.name, "Acme");
    }
}
