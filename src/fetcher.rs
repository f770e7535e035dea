//! Resilient HTTP fetcher shared by the source scrapers.
//!
//! One [`Fetcher`] belongs to exactly one scraper instance: its connection
//! pool and request semaphore are never shared across scrapers. Each `fetch`
//! call sleeps the pacing delay, takes a concurrency permit, sends a single
//! GET with fresh identity headers, and classifies the outcome. The fetcher
//! never retries; the calling scraper decides whether to skip, retry, or
//! abort based on the typed [`FetchError`].

use crate::config::Settings;
use crate::error::FetchError;
use crate::identity::IdentityPolicy;
use rand::Rng;
use reqwest::{Client, Proxy, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

pub struct Fetcher {
    client: Client,
    policy: IdentityPolicy,
    /// Bounds in-flight requests for this scraper instance.
    permits: Arc<Semaphore>,
}

impl Fetcher {
    /// Build a fetcher with a bounded connection pool.
    ///
    /// Construction is the only fatal path here: a client that cannot be
    /// built (bad proxy URL, TLS setup failure) means the owning scraper
    /// cannot operate at all.
    pub fn new(policy: IdentityPolicy, settings: &Settings) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5));

        if settings.proxy_enabled {
            if let Some(proxy_url) = pick_proxy(&settings.proxy_list, settings.proxy_rotation_enabled)
            {
                let proxy = Proxy::all(proxy_url).map_err(FetchError::Client)?;
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build().map_err(FetchError::Client)?;

        Ok(Fetcher {
            client,
            policy,
            permits: Arc::new(Semaphore::new(settings.max_concurrent_requests.max(1))),
        })
    }

    /// Fetch one URL, returning the body text on HTTP 200.
    ///
    /// The pacing delay is applied once per call, before the request is
    /// issued, and suspends only this task. Any non-200 status or transport
    /// failure comes back as a typed error for the caller to branch on.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tokio::time::sleep(self.policy.next_delay()).await;

        // Closed only if the semaphore is dropped, which cannot happen while
        // `self` is alive.
        let _permit = self.permits.acquire().await.expect("fetch semaphore closed");

        let response = self
            .client
            .get(url)
            .headers(self.policy.headers())
            .send()
            .await
            .map_err(|e| classify_send_error(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, %status, "non-200 response");
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|e| classify_send_error(url, e))?;
        debug!(%url, bytes = body.len(), "fetched");
        Ok(body)
    }
}

fn classify_send_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: e,
        }
    }
}

/// Pick a proxy from the configured list: random when rotation is on,
/// first entry otherwise. `None` when the list is empty.
fn pick_proxy(proxies: &[String], rotate: bool) -> Option<&String> {
    if proxies.is_empty() {
        return None;
    }
    if rotate {
        let idx = rand::rng().random_range(0..proxies.len());
        proxies.get(idx)
    } else {
        proxies.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::spawn_stub_server;
    use tokio::net::TcpListener;

    fn test_settings() -> Settings {
        let mut settings = Settings::from_env().unwrap();
        settings.scraping_delay_min = 0.0;
        settings.scraping_delay_max = 0.0;
        settings.request_timeout_secs = 5;
        settings.proxy_enabled = false;
        settings
    }

    fn test_fetcher(settings: &Settings) -> Fetcher {
        let policy = IdentityPolicy::new(false, 0.0, 0.0);
        Fetcher::new(policy, settings).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success_returns_body() {
        let base = spawn_stub_server(vec![(200, "<html>hello</html>".to_string())]).await;
        let settings = test_settings();
        let fetcher = test_fetcher(&settings);
        let body = fetcher.fetch(&base).await.unwrap();
        assert!(body.contains("hello"));
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_typed_status_error() {
        let base = spawn_stub_server(vec![(500, "boom".to_string())]).await;
        let settings = test_settings();
        let fetcher = test_fetcher(&settings);
        match fetcher.fetch(&base).await {
            Err(FetchError::Status { status, .. }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR)
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let settings = test_settings();
        let fetcher = test_fetcher(&settings);
        match fetcher.fetch(&format!("http://{addr}")).await {
            Err(FetchError::Transport { .. }) | Err(FetchError::Timeout { .. }) => {}
            other => panic!("expected transport failure, got {other:?}"),
        }
    }

    #[test]
    fn test_pick_proxy() {
        assert!(pick_proxy(&[], true).is_none());
        let proxies = vec!["http://a:8080".to_string(), "http://b:8080".to_string()];
        assert_eq!(pick_proxy(&proxies, false), Some(&proxies[0]));
        for _ in 0..20 {
            assert!(proxies.contains(pick_proxy(&proxies, true).unwrap()));
        }
    }
}
