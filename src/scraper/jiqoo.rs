//! Jiqoo (自遊空間) adapter. Tokyo listing at /shop/?pref=13; markup mixes `shop-*` and `store-*` classes.

use crate::scraper::{SiteExtractor, SiteProfile};

pub static PROFILE: SiteProfile = SiteProfile {
    brand: "自遊空間",
    origin: "https://jiqoo.jp",
    listing_path: "/shop/?pref=13",
    containers: &[".shop-item", ".store-item"],
    name: &[".shop-name", ".store-name", "h3"],
    address: &[".shop-address", ".store-address", ".address"],
    hours: &[".shop-hours", ".hours"],
    phone: &[".shop-tel", ".store-tel", ".tel"],
};

/// Jiqoo listing extractor.
pub struct JiqooExtractor;

impl SiteExtractor for JiqooExtractor {
    fn profile(&self) -> &'static SiteProfile {
        &PROFILE
    }
}
