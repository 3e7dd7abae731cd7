//! netcafe: scrape Tokyo internet cafe store listings from several chains into one record list.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod model;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use catalog::{fetch_record, seed_stores, StoreCatalog};
pub use model::{StoreRecord, CONTINUOUS_HOURS};
pub use scraper::{
    Aggregate, Aggregator, Fetch, HttpFetcher, HttpFetcherBuilder, RetryingFetcher, ScraperError,
    Site, SiteExtractor, SiteProfile, SourceEvent, SourceFailure, SourceObserver,
};
