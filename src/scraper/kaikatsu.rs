//! Kaikatsu CLUB adapter. Tokyo shop list at /shop/tokyo/; list items carry `shop-*` classes.

use crate::scraper::{SiteExtractor, SiteProfile};

pub static PROFILE: SiteProfile = SiteProfile {
    brand: "快活CLUB",
    origin: "https://www.kaikatsu.jp",
    listing_path: "/shop/tokyo/",
    containers: &[".shop-list-item"],
    name: &[".shop-name", "h3"],
    address: &[".shop-address", ".address"],
    hours: &[".shop-hours"],
    phone: &[".shop-tel", ".tel"],
};

/// Kaikatsu CLUB listing extractor.
pub struct KaikatsuExtractor;

impl SiteExtractor for KaikatsuExtractor {
    fn profile(&self) -> &'static SiteProfile {
        &PROFILE
    }
}
