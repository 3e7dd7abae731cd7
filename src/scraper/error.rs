//! Shared error type for fetching and parsing store listings.

use thiserror::Error;

/// Source-local failure. None of these abort a multi-source run; the aggregator records them.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    // Transport: connect, DNS, timeout, or body read.
    #[error("Network error: could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Could not parse page at {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("Could not decode store record from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ScraperError {
    /// True for failures worth another attempt: transport errors, HTTP 429 and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            ScraperError::Network { .. } => true,
            ScraperError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP 429 gets a longer backoff than other transient failures.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ScraperError::HttpStatus { status: 429, .. })
    }
}
