//! Request identity and pacing policy.
//!
//! Every outbound request carries a browser-like header set, with the
//! User-Agent drawn from a rotating pool when rotation is enabled, and every
//! fetch is preceded by a uniformly random delay. Both calls are stateless;
//! independent scraper instances can share nothing and still be correct.

use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT,
};
use std::time::Duration;

/// Pool of plausible desktop browser User-Agent strings.
const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// The User-Agent used when rotation is disabled.
const DEFAULT_USER_AGENT: &str = USER_AGENTS[0];

/// Configuration-driven header and delay policy for one scraper instance.
#[derive(Debug, Clone)]
pub struct IdentityPolicy {
    rotate_user_agent: bool,
    delay_min: Duration,
    delay_max: Duration,
}

impl IdentityPolicy {
    /// Build a policy from the scraping settings.
    ///
    /// `delay_min`/`delay_max` are seconds; an inverted range is treated as
    /// the single point `delay_min`.
    pub fn new(rotate_user_agent: bool, delay_min: f64, delay_max: f64) -> Self {
        let delay_max = delay_max.max(delay_min);
        IdentityPolicy {
            rotate_user_agent,
            delay_min: Duration::from_secs_f64(delay_min.max(0.0)),
            delay_max: Duration::from_secs_f64(delay_max.max(0.0)),
        }
    }

    /// A fresh header set mimicking an ordinary browser request.
    pub fn headers(&self) -> HeaderMap {
        let ua = if self.rotate_user_agent {
            let idx = rand::rng().random_range(0..USER_AGENTS.len());
            USER_AGENTS[idx]
        } else {
            DEFAULT_USER_AGENT
        };

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(ua));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers
    }

    /// A uniformly random delay in `[delay_min, delay_max]` inclusive.
    pub fn next_delay(&self) -> Duration {
        if self.delay_min >= self.delay_max {
            return self.delay_min;
        }
        let secs = rand::rng().random_range(self.delay_min.as_secs_f64()..=self.delay_max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_delay_stays_within_bounds() {
        let policy = IdentityPolicy::new(true, 0.5, 2.0);
        let min = Duration::from_secs_f64(0.5);
        let max = Duration::from_secs_f64(2.0);
        for _ in 0..10_000 {
            let d = policy.next_delay();
            assert!(d >= min && d <= max, "delay {d:?} out of range");
        }
    }

    #[test]
    fn test_next_delay_degenerate_range() {
        let policy = IdentityPolicy::new(true, 3.0, 3.0);
        assert_eq!(policy.next_delay(), Duration::from_secs(3));
        // Inverted range collapses to the minimum.
        let inverted = IdentityPolicy::new(true, 4.0, 1.0);
        assert_eq!(inverted.next_delay(), Duration::from_secs(4));
    }

    #[test]
    fn test_headers_fixed_user_agent() {
        let policy = IdentityPolicy::new(false, 0.0, 0.0);
        let headers = policy.headers();
        assert_eq!(headers.get(USER_AGENT).unwrap(), DEFAULT_USER_AGENT);
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
        assert!(headers.contains_key(ACCEPT_ENCODING));
        assert!(headers.contains_key(CONNECTION));
    }

    #[test]
    fn test_headers_rotating_user_agent_from_pool() {
        let policy = IdentityPolicy::new(true, 0.0, 0.0);
        for _ in 0..100 {
            let headers = policy.headers();
            let ua = headers.get(USER_AGENT).unwrap().to_str().unwrap();
            assert!(USER_AGENTS.contains(&ua));
        }
    }
}
