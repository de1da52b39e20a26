//! Outbound directory requests.
//!
//! The live strategy only talks to [`PageFetcher`], so tests and alternate
//! transports can stand in for [`HttpFetcher`].

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use smartbuy_shared::{Result, SmartBuyError, StrategyError, StrategyResult, VendorRequest};

/// Browser-like User-Agent; the directory blocks obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches a page body for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Return the body of a 2xx response, or why there is none.
    async fn fetch(&self, url: &Url) -> StrategyResult<String>;
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// [`PageFetcher`] over a shared reqwest client. One request per call, no retries.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(browser_headers())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(|e| SmartBuyError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> StrategyResult<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            warn!("directory is blocking requests");
            return Err(StrategyError::SourceUnavailable(
                "HTTP 403 Forbidden: directory is blocking requests".into(),
            ));
        }
        if !status.is_success() {
            return Err(StrategyError::SourceUnavailable(format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        debug!(bytes = body.len(), "fetched directory page");
        Ok(body)
    }
}

impl HttpFetcher {
    fn classify(&self, err: reqwest::Error) -> StrategyError {
        if err.is_timeout() {
            StrategyError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            StrategyError::SourceUnavailable(format!("request failed: {err}"))
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the directory search URL: `{base}?ss={material}+{location}`.
pub fn search_url(base: &str, request: &VendorRequest) -> StrategyResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| StrategyError::MalformedInput(format!("invalid search URL '{base}': {e}")))?;

    let query = [request.material_name.trim(), request.location.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    url.query_pairs_mut().append_pair("ss", &query);
    Ok(url)
}

/// Uniform random delay within `range` (milliseconds, inclusive).
pub fn jittered_delay(range: (u64, u64)) -> Duration {
    let (min, max) = range;
    if max <= min {
        return Duration::from_millis(min);
    }
    Duration::from_millis(rand::rng().random_range(min..=max))
}
