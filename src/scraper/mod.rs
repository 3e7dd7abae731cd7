//! Site adapters and scraping. Site table, extractor trait, shared fetcher, and aggregation.

mod aggregate;
mod client;
mod error;
mod extract;
pub mod normalize;

pub mod jiqoo;
pub mod kaikatsu;
pub mod manboo;

pub use aggregate::{
    Aggregate, Aggregator, NoopObserver, SourceEvent, SourceFailure, SourceObserver,
    TracingObserver,
};
pub use client::{
    ensure_absolute_url, Fetch, HttpFetcher, HttpFetcherBuilder, RetryingFetcher,
    DEFAULT_TIMEOUT_SECS,
};
pub use error::ScraperError;
pub use extract::{extract_fallback, extract_listing, extract_primary, parse_document};

use crate::model::StoreRecord;
use scraper::Html;

/// Selector vocabulary and identity of one listing source.
///
/// Each field list is tried in order; the first selector whose first match has non-empty text wins.
#[derive(Debug)]
pub struct SiteProfile {
    /// Brand label: prefixed onto store names and used to label failures.
    pub brand: &'static str,
    /// Scheme and host, no trailing slash.
    pub origin: &'static str,
    pub listing_path: &'static str,
    /// Listing containers; any of these marks one store.
    pub containers: &'static [&'static str],
    pub name: &'static [&'static str],
    pub address: &'static [&'static str],
    pub hours: &'static [&'static str],
    pub phone: &'static [&'static str],
}

impl SiteProfile {
    pub fn listing_url(&self) -> String {
        format!("{}{}", self.origin, self.listing_path)
    }
}

/// Implemented by each site adapter. Extraction never fails: an empty list is a valid outcome.
pub trait SiteExtractor: Sync {
    fn profile(&self) -> &'static SiteProfile;

    /// Structured pass, then the line-heuristic pass if the first found nothing.
    fn extract(&self, doc: &Html) -> Vec<StoreRecord> {
        extract_listing(self.profile(), doc)
    }
}

/// Supported listing source. Declaration order is the default aggregation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    Kaikatsu,
    Jiqoo,
    Manboo,
}

impl Site {
    pub const ALL: [Site; 3] = [Site::Kaikatsu, Site::Jiqoo, Site::Manboo];

    /// Stable lowercase key used in config files and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Site::Kaikatsu => "kaikatsu",
            Site::Jiqoo => "jiqoo",
            Site::Manboo => "manboo",
        }
    }

    pub fn from_key(key: &str) -> Option<Site> {
        match key.trim().to_lowercase().as_str() {
            "kaikatsu" | "kaikatsu-club" => Some(Site::Kaikatsu),
            "jiqoo" | "jiyu-kukan" => Some(Site::Jiqoo),
            "manboo" => Some(Site::Manboo),
            _ => None,
        }
    }

    pub fn extractor(self) -> &'static dyn SiteExtractor {
        match self {
            Site::Kaikatsu => &kaikatsu::KaikatsuExtractor,
            Site::Jiqoo => &jiqoo::JiqooExtractor,
            Site::Manboo => &manboo::ManbooExtractor,
        }
    }

    pub fn profile(self) -> &'static SiteProfile {
        self.extractor().profile()
    }

    /// Human-readable source label (the brand).
    pub fn label(self) -> &'static str {
        self.profile().brand
    }
}

/// Parse a comma-separated list of site keys, keeping order and dropping repeats.
pub fn parse_site_list(s: &str) -> Result<Vec<Site>, String> {
    let mut sites = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let site = Site::from_key(part).ok_or_else(|| {
            format!(
                "Unknown source '{}'. Use kaikatsu, jiqoo, or manboo.",
                part
            )
        })?;
        if !sites.contains(&site) {
            sites.push(site);
        }
    }
    if sites.is_empty() {
        return Err("No sources given.".to_string());
    }
    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn every_profile_selector_compiles() {
        for site in Site::ALL {
            let p = site.profile();
            let lists = [p.containers, p.name, p.address, p.hours, p.phone];
            for sel in lists.iter().flat_map(|l| l.iter()) {
                assert!(
                    Selector::parse(sel).is_ok(),
                    "{}: invalid selector {:?}",
                    site.key(),
                    sel
                );
            }
            assert!(!p.containers.is_empty());
            assert!(!p.name.is_empty());
        }
    }

    #[test]
    fn listing_urls_are_absolute() {
        for site in Site::ALL {
            let url = site.profile().listing_url();
            assert!(ensure_absolute_url(&url).is_ok(), "{}", url);
            assert!(!site.profile().origin.ends_with('/'));
        }
    }

    #[test]
    fn site_keys_round_trip() {
        for site in Site::ALL {
            assert_eq!(Site::from_key(site.key()), Some(site));
        }
        assert_eq!(Site::from_key(" Manboo "), Some(Site::Manboo));
        assert_eq!(Site::from_key("dice"), None);
    }

    #[test]
    fn parse_site_list_keeps_order_and_drops_repeats() {
        assert_eq!(
            parse_site_list("manboo, kaikatsu,manboo").unwrap(),
            vec![Site::Manboo, Site::Kaikatsu]
        );
        assert!(parse_site_list("kaikatsu,dice").is_err());
        assert!(parse_site_list(" , ").is_err());
    }

    #[test]
    fn labels_are_brands() {
        assert_eq!(Site::Kaikatsu.label(), "快活CLUB");
        assert_eq!(Site::Jiqoo.label(), "自遊空間");
        assert_eq!(Site::Manboo.label(), "マンボー");
    }
}
