//! Multi-source run: fetch, parse and extract every source, isolating failures per source.

use crate::model::StoreRecord;
use crate::scraper::client::{Fetch, DEFAULT_TIMEOUT_SECS};
use crate::scraper::error::ScraperError;
use crate::scraper::extract::parse_document;
use crate::scraper::Site;
use std::time::Duration;
use tracing::{info, warn};

/// One source that produced no records because fetching or parsing failed.
#[derive(Debug)]
pub struct SourceFailure {
    pub source_label: String,
    pub cause: ScraperError,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source_label, self.cause)
    }
}

/// Combined result of a run. Records are in source-declaration order, in-source order preserved.
#[derive(Debug, Default)]
pub struct Aggregate {
    pub records: Vec<StoreRecord>,
    pub failures: Vec<SourceFailure>,
}

impl Aggregate {
    /// Nothing usable came back: the caller may substitute seed data.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-source progress, emitted in order Started then exactly one of Succeeded/Failed.
#[derive(Debug)]
pub enum SourceEvent<'a> {
    Started { label: &'a str, url: &'a str },
    Succeeded { label: &'a str, count: usize },
    Failed { label: &'a str, cause: &'a ScraperError },
}

/// Receives progress events. Called from the per-source threads in concurrent mode.
pub trait SourceObserver: Sync {
    fn on_event(&self, event: &SourceEvent<'_>);
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SourceObserver for NoopObserver {
    fn on_event(&self, _event: &SourceEvent<'_>) {}
}

/// Logs events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SourceObserver for TracingObserver {
    fn on_event(&self, event: &SourceEvent<'_>) {
        match event {
            SourceEvent::Started { label, url } => info!(source = label, url, "fetching listing"),
            SourceEvent::Succeeded { label, count } => {
                info!(source = label, count, "listing extracted")
            }
            SourceEvent::Failed { label, cause } => {
                warn!(source = label, error = %cause, "source failed")
            }
        }
    }
}

/// Drives fetch, parse and extract over a list of sources.
pub struct Aggregator<'a, F> {
    fetcher: F,
    timeout: Duration,
    observer: &'a dyn SourceObserver,
    concurrent: bool,
}

impl<'a, F: Fetch> Aggregator<'a, F> {
    /// Concurrent aggregator with the default timeout and no observer.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            observer: &NoopObserver,
            concurrent: true,
        }
    }

    /// Per-source fetch timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn observer(mut self, observer: &'a dyn SourceObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Run sources one after another on the calling thread. Output is identical.
    pub fn sequential(mut self) -> Self {
        self.concurrent = false;
        self
    }

    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Run every source. Never fails; per-source errors become [SourceFailure] entries.
    pub fn run_all(&self, sites: &[Site]) -> Aggregate {
        let outcomes: Vec<Result<Vec<StoreRecord>, ScraperError>> = if self.concurrent {
            std::thread::scope(|scope| {
                let handles: Vec<_> = sites
                    .iter()
                    .map(|&site| scope.spawn(move || self.run_source(site)))
                    .collect();
                // Join by declared index, not completion order.
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
                    .collect()
            })
        } else {
            sites.iter().map(|&site| self.run_source(site)).collect()
        };

        let mut aggregate = Aggregate::default();
        for (site, outcome) in sites.iter().zip(outcomes) {
            match outcome {
                Ok(records) => aggregate.records.extend(records),
                Err(cause) => aggregate.failures.push(SourceFailure {
                    source_label: site.label().to_string(),
                    cause,
                }),
            }
        }
        aggregate
    }

    /// Fetch, parse and extract one source, reporting to the observer.
    pub fn run_source(&self, site: Site) -> Result<Vec<StoreRecord>, ScraperError> {
        let label = site.label();
        let url = site.profile().listing_url();
        self.observer
            .on_event(&SourceEvent::Started { label, url: &url });
        let outcome = self
            .fetcher
            .fetch(&url, self.timeout)
            .and_then(|body| parse_document(&url, &body))
            .map(|doc| site.extractor().extract(&doc));
        match &outcome {
            Ok(records) => self.observer.on_event(&SourceEvent::Succeeded {
                label,
                count: records.len(),
            }),
            Err(cause) => self.observer.on_event(&SourceEvent::Failed { label, cause }),
        }
        outcome
    }
}
