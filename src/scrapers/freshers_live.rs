//! FreshersLive job-listing scraper.
//!
//! FreshersLive serves server-rendered listing pages with one card per
//! posting, which keeps the HTML simple enough to scrape without a browser.
//!
//! # URL Pattern
//!
//! Listing pages are keyed by hashtag and page number, e.g.
//! `https://www.fresherslive.com/jobs/python-jobs?page=2`.

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

pub struct FreshersLiveScraper {
    board: BoardConfig,
    settings: Settings,
    fetcher: Option<Fetcher>,
}

impl FreshersLiveScraper {
    pub fn new(board: BoardConfig, settings: Settings) -> Self {
        FreshersLiveScraper {
            board,
            settings,
            fetcher: None,
        }
    }

    fn listing_url(&self, tag: &str, page: usize) -> String {
        let slug = urlencoding::encode(tag);
        if page <= 1 {
            format!("{}/{slug}-jobs", self.board.base_url)
        } else {
            format!("{}/{slug}-jobs?page={page}", self.board.base_url)
        }
    }
}

#[async_trait]
impl JobScraper for FreshersLiveScraper {
    fn source(&self) -> JobSource {
        JobSource::FreshersLive
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
                        // Partial results: one bad page never sinks the batch.
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

        info!(count = jobs.len(), "FreshersLive search complete");
        jobs
    }

    async fn cleanup(&mut self) {
        self.fetcher = None;
        debug!(source = %self.source(), "scraper cleaned up");
    }
}

/// Parse one listing page into normalized postings.
///
/// Cards missing a title or link are skipped; everything else degrades to a
/// sensible default rather than dropping the card.
fn parse_listing_page(html: &str, tag: &str, base_url: &str, max_text_len: usize) -> Vec<JobPosting> {
    let document = Html::parse_document(html);
    let card_sel = Selector::parse(".job-listing").unwrap();
    let title_sel = Selector::parse("h3.job-title a").unwrap();
    let company_sel = Selector::parse(".company-name").unwrap();
    let location_sel = Selector::parse(".job-location").unwrap();
    let posted_sel = Selector::parse(".posted-date").unwrap();
    let desc_sel = Selector::parse(".job-desc").unwrap();

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
            .unwrap_or_else(|| "India".to_string());
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
            experience_level: infer_experience_level(&haystack, ExperienceLevel::Fresher),
            skills_required: detect_skills(&haystack),
            posted_date,
            job_url,
            source: JobSource::FreshersLive,
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
          <div class="job-listing">
            <h3 class="job-title"><a href="/jobs/python-dev-123">Python Developer</a></h3>
            <span class="company-name">Acme Corp</span>
            <span class="job-location">Bangalore</span>
            <span class="posted-date">2 days ago</span>
            <p class="job-desc">Fresher welcome. Python and SQL required.
               Contact: jobs@acme.example, +91-9876543210</p>
          </div>
          <div class="job-listing">
            <h3 class="job-title"><a href="/jobs/intern-456">Data Intern</a></h3>
            <span class="company-name"></span>
            <span class="posted-date">today</span>
            <p class="job-desc">Excel and data analysis internship.</p>
          </div>
          <div class="job-listing">
            <h3 class="job-title">No link here</h3>
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
        let jobs =
            parse_listing_page(LISTING_HTML, "Python", "https://www.fresherslive.com/jobs", 5000);
        assert_eq!(jobs.len(), 2);

        let first = &jobs[0];
        assert_eq!(first.title, "Python Developer");
        assert_eq!(first.company.name, "Acme Corp");
        assert_eq!(first.location, "Bangalore");
        assert_eq!(first.source, JobSource::FreshersLive);
        assert_eq!(
            first.job_url,
            "https://www.fresherslive.com/jobs/python-dev-123"
        );
        assert_eq!(first.hashtags, vec!["python"]);
        assert_eq!(first.experience_level, ExperienceLevel::Fresher);
        assert!(first.skills_required.contains(&"python".to_string()));
        assert!(first.skills_required.contains(&"sql".to_string()));
        assert!(first.posted_date < first.scraped_at);

        let contact = first.contact_info.as_ref().unwrap();
        assert_eq!(contact.email.as_deref(), Some("jobs@acme.example"));
        assert_eq!(contact.phone.as_deref(), Some("+91-9876543210"));

        let second = &jobs[1];
        assert_eq!(second.job_type, JobType::Internship);
        // Empty company cell falls back rather than dropping the card.
        assert_eq!(second.company.name, "Unknown");
        assert_eq!(second.location, "India");
        assert!(second.contact_info.is_none());
    }

    #[test]
    fn test_parse_listing_page_empty_html() {
        assert!(parse_listing_page("<html></html>", "rust", "https://x.example", 5000).is_empty());
    }

    #[test]
    fn test_listing_url_shape() {
        let settings = test_settings();
        let board = settings.board(JobSource::FreshersLive).unwrap().clone();
        let scraper = FreshersLiveScraper::new(board, settings);
        assert_eq!(
            scraper.listing_url("python", 1),
            "https://www.fresherslive.com/jobs/python-jobs"
        );
        assert_eq!(
            scraper.listing_url("machine learning", 2),
            "https://www.fresherslive.com/jobs/machine%20learning-jobs?page=2"
        );
    }

    #[tokio::test]
    async fn test_search_jobs_survives_partial_failures() {
        // Five hashtags, one page each: responses cycle so tags 2 and 4 get
        // real listings while 1, 3, and 5 hit server errors.
        let base = spawn_stub_server(vec![
            (500, "boom".to_string()),
            (200, LISTING_HTML.to_string()),
            (500, "boom".to_string()),
            (200, LISTING_HTML.to_string()),
            (500, "boom".to_string()),
        ])
        .await;

        let settings = test_settings();
        let mut board = settings.board(JobSource::FreshersLive).unwrap().clone();
        board.base_url = base;

        let mut scraper = FreshersLiveScraper::new(board, settings);
        scraper.initialize().await.unwrap();

        let hashtags: Vec<String> = ["python", "java", "sql", "react", "aws"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let jobs = scraper
            .search_jobs(&hashtags, &SearchOptions::default())
            .await;
        scraper.cleanup().await;

        // Two successful pages, two postings each.
        assert_eq!(jobs.len(), 4);
    }

    #[tokio::test]
    async fn test_search_jobs_applies_time_filter() {
        let base = spawn_stub_server(vec![(200, LISTING_HTML.to_string())]).await;
        let settings = test_settings();
        let mut board = settings.board(JobSource::FreshersLive).unwrap().clone();
        board.base_url = base;

        let mut scraper = FreshersLiveScraper::new(board, settings);
        scraper.initialize().await.unwrap();

        let options = SearchOptions {
            max_pages: 1,
            time_filter: Some(crate::models::TimeFilter::Last24h),
        };
        let jobs = scraper
            .search_jobs(&["python".to_string()], &options)
            .await;

        // "2 days ago" falls outside the 24h window; "today" stays.
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Data Intern");
    }
}
