//! Manboo adapter. Shop index at /shop/; names are often only in `<strong>`, hours never listed.

use crate::scraper::{SiteExtractor, SiteProfile};

pub static PROFILE: SiteProfile = SiteProfile {
    brand: "マンボー",
    origin: "https://www.manboo.co.jp",
    listing_path: "/shop/",
    containers: &[".shop-list-item", ".store-item"],
    name: &[".shop-name", "h3", "strong"],
    address: &[".address", ".shop-address"],
    hours: &[],
    phone: &[".tel", ".phone"],
};

/// Manboo listing extractor.
pub struct ManbooExtractor;

impl SiteExtractor for ManbooExtractor {
    fn profile(&self) -> &'static SiteProfile {
        &PROFILE
    }
}
