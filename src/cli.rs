//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Hashtags are positional; everything else has a flag, and the database URL
//! can also come from the environment.

use crate::models::TimeFilter;
use clap::Parser;

/// Command-line arguments for the jobscout pipeline.
///
/// # Examples
///
/// ```sh
/// # Scrape enabled boards for two hashtags, then print the first page
/// jobscout python django
///
/// # Fetch three listing pages per hashtag, postings from the last week only
/// jobscout rust --pages 3 --since 7d
///
/// # Query what is already stored without scraping
/// jobscout python --skip-scrape --limit 20 --offset 20
///
/// # Full-text search over stored postings
/// jobscout python --skip-scrape --text "backend engineer"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Hashtags to search for (1 to 10)
    #[arg(required = true, num_args = 1..)]
    pub hashtags: Vec<String>,

    /// Maximum results per page
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Result offset for pagination
    #[arg(short, long, default_value_t = 0)]
    pub offset: usize,

    /// Listing pages to fetch per hashtag
    #[arg(short, long, default_value_t = 1)]
    pub pages: usize,

    /// Only keep postings within this window (24h, 3d, 7d, 14d, 30d)
    #[arg(long)]
    pub since: Option<TimeFilter>,

    /// Skip scraping and search the store directly
    #[arg(long, default_value_t = false)]
    pub skip_scrape: bool,

    /// Full-text query over title/description/company instead of hashtag search
    #[arg(short, long)]
    pub text: Option<String>,

    /// SQLite connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["jobscout", "python", "django", "--pages", "3", "--since", "7d"]);
        assert_eq!(cli.hashtags, vec!["python", "django"]);
        assert_eq!(cli.pages, 3);
        assert_eq!(cli.since, Some(TimeFilter::Last7d));
        assert!(!cli.skip_scrape);
    }

    #[test]
    fn test_cli_requires_a_hashtag() {
        assert!(Cli::try_parse_from(["jobscout"]).is_err());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["jobscout", "rust", "-l", "20", "-o", "40", "-p", "2"]);
        assert_eq!(cli.limit, Some(20));
        assert_eq!(cli.offset, 40);
        assert_eq!(cli.pages, 2);
    }

    #[test]
    fn test_cli_rejects_bad_time_filter() {
        assert!(Cli::try_parse_from(["jobscout", "rust", "--since", "2w"]).is_err());
    }
}
