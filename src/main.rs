//! Pipeline entry point: scrape enabled boards for the query hashtags, save
//! everything into the indexed store, then print the first page of results as
//! JSON.

use anyhow::Context;
use clap::Parser;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use jobscout::cli::Cli;
use jobscout::models::validate_hashtags;
use jobscout::scrapers::{build_scrapers, run_scraper, SearchOptions};
use jobscout::store::{CachedStore, JobStore, SqliteStore};
use jobscout::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("jobscout starting up");

    let args = Cli::parse();
    debug!(?args.hashtags, pages = args.pages, "Parsed CLI arguments");

    // Validate before any fetch or store access.
    let hashtags = validate_hashtags(&args.hashtags)
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid hashtag query")?;

    let mut settings = Settings::from_env().context("loading configuration")?;
    if let Some(url) = &args.database_url {
        settings.database_url = url.clone();
    }
    let limit = args.limit.unwrap_or(settings.default_page_size);

    // Startup connectivity failure is fatal.
    let store = SqliteStore::connect(&settings.database_url)
        .await
        .with_context(|| format!("connecting to {}", settings.database_url))?;
    let store = CachedStore::new(store, Duration::from_secs(settings.cache_ttl_secs));
    info!(database_url = %settings.database_url, "Store ready");

    if !args.skip_scrape {
        let options = SearchOptions {
            max_pages: args.pages,
            time_filter: args.since,
        };

        let scrapers = build_scrapers(&settings);
        info!(count = scrapers.len(), "Running scrapers");

        // One task per scraper; each bounds its own fetch concurrency.
        let batches: Vec<Vec<jobscout::JobPosting>> = stream::iter(scrapers)
            .map(|mut scraper| {
                let hashtags = hashtags.clone();
                let options = options.clone();
                async move { run_scraper(&mut scraper, &hashtags, &options).await }
            })
            .buffer_unordered(4)
            .collect()
            .await;

        let mut saved = 0usize;
        let mut failed = 0usize;
        for job in batches.into_iter().flatten() {
            match store.save(&job).await {
                Ok(id) => {
                    debug!(id = %id, url = %job.job_url, "Saved posting");
                    saved += 1;
                }
                Err(e) => {
                    warn!(url = %job.job_url, error = %e, "Failed to save posting");
                    failed += 1;
                }
            }
        }
        info!(saved, failed, "Scrape results persisted");
        if failed > 0 {
            error!(failed, "Some postings could not be saved");
        }
    }

    let page = match &args.text {
        Some(query) => store
            .search_text(query, limit, args.offset)
            .await
            .context("full-text search failed")?,
        None => store
            .search(&hashtags, limit, args.offset)
            .await
            .context("hashtag search failed")?,
    };

    info!(
        returned = page.jobs.len(),
        total = page.total_count,
        has_more = page.has_more,
        "Search complete"
    );
    println!("{}", serde_json::to_string_pretty(&page)?);

    let elapsed = start_time.elapsed();
    info!(
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
