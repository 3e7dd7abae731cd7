//! Blocking page fetcher with a per-request timeout, plus an optional retry decorator.

use crate::scraper::error::ScraperError;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; netcafe/0.1; +https://github.com/netcafe)";
/// Default whole-request timeout for listing pages.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
const MAX_REDIRECTS: usize = 10;

/// Default backoff delays in seconds after each failed attempt.
const DEFAULT_BACKOFF_SECS: [u64; 3] = [1, 2, 4];
/// Backoff for HTTP 429: wait longer so the server can recover.
const BACKOFF_429_SECS: [u64; 3] = [30, 60, 90];

/// One GET of one URL. Implementations must be shareable across the per-source threads.
pub trait Fetch: Sync {
    /// Fetch `url` and return the body bytes. Only HTTP 200 is success.
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, ScraperError>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, ScraperError> {
        (**self).fetch(url, timeout)
    }
}

/// Reject anything that is not an absolute http(s) URL before touching the network.
pub fn ensure_absolute_url(url: &str) -> Result<Url, ScraperError> {
    let parsed = Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
        input: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidUrl {
            input: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none() {
        return Err(ScraperError::InvalidUrl {
            input: url.to_string(),
            reason: "URL has no host".to_string(),
        });
    }
    Ok(parsed)
}

/// Blocking HTTP fetcher. A single attempt per call; see [RetryingFetcher] for retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    inner: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build a fetcher with default User-Agent and timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::default()
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, ScraperError> {
        ensure_absolute_url(url)?;
        debug!(url, timeout_ms = timeout.as_millis() as u64, "GET");
        let response = self
            .inner
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ScraperError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().map_err(|e| ScraperError::Network {
            url: url.to_string(),
            source: e,
        })?;
        Ok(body.to_vec())
    }
}

/// Builder for HttpFetcher with optional User-Agent and timeout.
#[derive(Debug)]
pub struct HttpFetcherBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for HttpFetcherBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpFetcherBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout in seconds. Default 15; zero is raised to one.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }

    pub fn build(self) -> Result<HttpFetcher, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let timeout = Duration::from_secs(self.timeout_secs);
        let inner = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(HttpFetcher { inner })
    }
}

/// Retry-with-backoff around any [Fetch].
///
/// Retries transient failures (transport errors, HTTP 5xx, HTTP 429) up to `attempts` total
/// calls. Other errors return immediately. With `attempts == 1` this is a pass-through.
#[derive(Debug, Clone)]
pub struct RetryingFetcher<F> {
    inner: F,
    attempts: u32,
    backoff: Vec<Duration>,
    backoff_429: Vec<Duration>,
}

impl<F: Fetch> RetryingFetcher<F> {
    pub fn new(inner: F, attempts: u32) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            backoff: DEFAULT_BACKOFF_SECS.map(Duration::from_secs).to_vec(),
            backoff_429: BACKOFF_429_SECS.map(Duration::from_secs).to_vec(),
        }
    }

    /// Delays before each retry. If shorter than `attempts - 1`, the last value is reused.
    pub fn with_backoff(mut self, backoff: Vec<Duration>) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delays before each retry after an HTTP 429.
    pub fn with_rate_limit_backoff(mut self, backoff: Vec<Duration>) -> Self {
        self.backoff_429 = backoff;
        self
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    fn delay_for(&self, err: &ScraperError, attempt: u32) -> Duration {
        let table = if err.is_rate_limited() {
            &self.backoff_429
        } else {
            &self.backoff
        };
        table
            .get(attempt as usize)
            .or_else(|| table.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

impl<F: Fetch> Fetch for RetryingFetcher<F> {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, ScraperError> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch(url, timeout) {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt + 1 < self.attempts => {
                    let delay = self.delay_for(&e, attempt);
                    warn!(
                        url,
                        attempt = attempt + 1,
                        of = self.attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient fetch failure, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
