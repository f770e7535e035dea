//! Indeed job-listing scraper.
//!
//! Indeed paginates by result offset rather than page number: each listing
//! page holds ten cards and `start` advances in tens.
//!
//! # URL Pattern
//!
//! `https://www.indeed.com/jobs?q=python&start=10`

use crate::config::{BoardConfig, Settings};
use crate::error::FetchError;
use crate::extract::{extract_contact_info, resolve_posted_date};
use crate::fetcher::Fetcher;
use crate::identity::IdentityPolicy;
use crate::models::{CompanyInfo, ExperienceLevel, JobPosting, JobSource};
use crate::scrapers::{detect_skills, infer_experience_level, infer_job_type, JobScraper, SearchOptions};
use async_trait::async_trait;
use chrono::Utc;
use scraper::{Html, Selector};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

const RESULTS_PER_PAGE: usize = 10;

pub struct IndeedScraper {
    board: BoardConfig,
    settings: Settings,
    fetcher: Option<Fetcher>,
}

impl IndeedScraper {
    pub fn new(board: BoardConfig, settings: Settings) -> Self {
        IndeedScraper {
            board,
            settings,
            fetcher: None,
        }
    }

    fn listing_url(&self, tag: &str, page: usize) -> String {
        let query = urlencoding::encode(tag);
        let start = page.saturating_sub(1) * RESULTS_PER_PAGE;
        if start == 0 {
            format!("{}?q={query}", self.board.base_url)
        } else {
            format!("{}?q={query}&start={start}", self.board.base_url)
        }
    }
}

#[async_trait]
impl JobScraper for IndeedScraper {
    fn source(&self) -> JobSource {
        JobSource::Indeed
    }

    async fn initialize(&mut self) -> Result<(), FetchError> {
        let policy = IdentityPolicy::new(
            self.settings.user_agent_rotation,
            self.settings.scraping_delay_min,
            self.settings.scraping_delay_max,
        );
        self.fetcher = Some(Fetcher::new(policy, &self.settings)?);
        debug!(source = %self.source(), "scraper initialized");
        Ok(())
    }

    #[instrument(level = "info", skip_all, fields(source = %self.source()))]
    async fn search_jobs(&self, hashtags: &[String], options: &SearchOptions) -> Vec<JobPosting> {
        let Some(fetcher) = &self.fetcher else {
            error!("search_jobs called before initialize");
            return Vec::new();
        };

        let mut jobs = Vec::new();
        let now = Utc::now();
        let cutoff = options.time_filter.map(|f| f.cutoff(now));

        for tag in hashtags {
            for page in 1..=options.max_pages.max(1) {
                let url = self.listing_url(tag, page);
                let body = match fetcher.fetch(&url).await {
                    Ok(body) => body,
                    Err(e) => {
                        warn!(%url, error = %e, "listing fetch failed, skipping");
                        continue;
                    }
                };
                let mut parsed =
                    parse_listing_page(&body, tag, &self.board.base_url, self.settings.max_text_length);
                debug!(%url, count = parsed.len(), "parsed listing page");
                if let Some(cutoff) = cutoff {
                    parsed.retain(|job| job.posted_date >= cutoff);
                }
                jobs.append(&mut parsed);
            }
        }

        info!(count = jobs.len(), "Indeed search complete");
        jobs
    }

    async fn cleanup(&mut self) {
        self.fetcher = None;
        debug!(source = %self.source(), "scraper cleaned up");
    }
}

/// Parse one Indeed result page into normalized postings.
fn parse_listing_page(html: &str, tag: &str, base_url: &str, max_text_len: usize) -> Vec<JobPosting> {
    let document = Html::parse_document(html);
    let card_sel = Selector::parse(".job_seen_beacon").unwrap();
    let title_sel = Selector::parse("h2.jobTitle a").unwrap();
    let company_sel = Selector::parse("[data-testid=\"company-name\"]").unwrap();
    let location_sel = Selector::parse("[data-testid=\"text-location\"]").unwrap();
    let posted_sel = Selector::parse("[data-testid=\"myJobsStateDate\"]").unwrap();
    let desc_sel = Selector::parse(".job-snippet").unwrap();

    let base = Url::parse(base_url).ok();
    let now = Utc::now();
    let mut jobs = Vec::new();

    for card in document.select(&card_sel) {
        let Some(title_el) = card.select(&title_sel).next() else {
            continue;
        };
        let title = element_text(&title_el);
        let Some(href) = title_el.value().attr("href") else {
            continue;
        };
        if title.is_empty() {
            continue;
        }

        let job_url = match &base {
            Some(base) => base
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        };

        let company = card
            .select(&company_sel)
            .next()
            .map(|el| element_text(&el))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        let location = card
            .select(&location_sel)
            .next()
            .map(|el| element_text(&el))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Remote".to_string());
        let posted_raw = card
            .select(&posted_sel)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();
        let description = card
            .select(&desc_sel)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();

        let posted_date = resolve_posted_date(&posted_raw, now).unwrap_or(now);
        let haystack = format!("{title} {description}");
        let contact_text: String = description.chars().take(max_text_len).collect();

        let mut job = JobPosting {
            id: None,
            title,
            description,
            company: CompanyInfo::named(company),
            location,
            job_type: infer_job_type(&haystack),
            experience_level: infer_experience_level(&haystack, ExperienceLevel::MidLevel),
            skills_required: detect_skills(&haystack),
            posted_date,
            job_url,
            source: JobSource::Indeed,
            contact_info: extract_contact_info(&contact_text),
            hashtags: vec![tag.to_string()],
            scraped_at: now,
            is_active: true,
        };
        job.normalize();
        jobs.push(job);
    }

    jobs
}

fn element_text(el: &scraper::ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobType;
    use crate::scrapers::SearchOptions;
    use crate::testutil::spawn_stub_server;

    const LISTING_HTML: &str = r#"
        <html><body>
          <div class="job_seen_beacon">
            <h2 class="jobTitle"><a href="/viewjob?jk=abc123">Senior Rust Engineer</a></h2>
            <span data-testid="company-name">Ferrous Systems</span>
            <div data-testid="text-location">Berlin</div>
            <span data-testid="myJobsStateDate">3 days ago</span>
            <div class="job-snippet">Build compilers in Rust. Docker and Kubernetes a plus.</div>
          </div>
          <div class="job_seen_beacon">
            <h2 class="jobTitle"><a href="/viewjob?jk=def456">Contract QA Analyst</a></h2>
            <span data-testid="company-name">TestWorks</span>
            <div class="job-snippet">Short-term contract. Reach us at hire@testworks.example</div>
          </div>
        </body></html>
    "#;

    fn test_settings() -> Settings {
        let mut settings = Settings::from_env().unwrap();
        settings.scraping_delay_min = 0.0;
        settings.scraping_delay_max = 0.0;
        settings.request_timeout_secs = 5;
        settings.proxy_enabled = false;
        settings
    }

    #[test]
    fn test_parse_listing_page_fields() {
        let jobs = parse_listing_page(LISTING_HTML, "Rust", "https://www.indeed.com/jobs", 5000);
        assert_eq!(jobs.len(), 2);

        let first = &jobs[0];
        assert_eq!(first.title, "Senior Rust Engineer");
        assert_eq!(first.company.name, "Ferrous Systems");
        assert_eq!(first.location, "Berlin");
        assert_eq!(first.source, JobSource::Indeed);
        assert_eq!(first.job_url, "https://www.indeed.com/viewjob?jk=abc123");
        assert_eq!(first.experience_level, ExperienceLevel::SeniorLevel);
        assert!(first.skills_required.contains(&"rust".to_string()));
        assert!(first.skills_required.contains(&"docker".to_string()));
        assert_eq!(first.hashtags, vec!["rust"]);

        let second = &jobs[1];
        assert_eq!(second.job_type, JobType::Contract);
        assert_eq!(second.location, "Remote");
        // No posted date on the card resolves to scrape time.
        assert_eq!(second.posted_date, second.scraped_at);
        assert_eq!(
            second.contact_info.as_ref().unwrap().email.as_deref(),
            Some("hire@testworks.example")
        );
    }

    #[test]
    fn test_listing_url_offsets_in_tens() {
        let settings = test_settings();
        let board = settings.board(JobSource::Indeed).unwrap().clone();
        let scraper = IndeedScraper::new(board, settings);
        assert_eq!(
            scraper.listing_url("rust", 1),
            "https://www.indeed.com/jobs?q=rust"
        );
        assert_eq!(
            scraper.listing_url("rust", 3),
            "https://www.indeed.com/jobs?q=rust&start=20"
        );
    }

    #[tokio::test]
    async fn test_search_jobs_paginates_per_hashtag() {
        let base = spawn_stub_server(vec![(200, LISTING_HTML.to_string())]).await;
        let settings = test_settings();
        let mut board = settings.board(JobSource::Indeed).unwrap().clone();
        board.base_url = base;

        let mut scraper = IndeedScraper::new(board, settings);
        scraper.initialize().await.unwrap();

        let options = SearchOptions {
            max_pages: 2,
            time_filter: None,
        };
        let jobs = scraper.search_jobs(&["rust".to_string()], &options).await;
        scraper.cleanup().await;

        // Two pages, two cards each.
        assert_eq!(jobs.len(), 4);
    }
}
