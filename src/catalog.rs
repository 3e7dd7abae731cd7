//! In-memory store catalog: the built-in seed list, keyword search, and single-record JSON fetch.

use crate::model::{StoreRecord, CONTINUOUS_HOURS};
use crate::scraper::{Fetch, ScraperError};
use std::time::Duration;

/// Timeout for [fetch_record].
pub const RECORD_TIMEOUT_SECS: u64 = 10;

fn seed(name: &str, location: &str, phone: &str, url: &str) -> StoreRecord {
    StoreRecord {
        name: name.to_string(),
        location: location.to_string(),
        hours: CONTINUOUS_HOURS.to_string(),
        phone: phone.to_string(),
        url: url.to_string(),
    }
}

/// Built-in list used when live scraping is off or returned nothing.
pub fn seed_stores() -> Vec<StoreRecord> {
    vec![
        seed(
            "快活CLUB 新宿西口店",
            "東京都新宿区西新宿1-12-9",
            "03-5321-6166",
            "https://www.kaikatsu.jp/",
        ),
        seed(
            "自遊空間 池袋西口ROSA店",
            "東京都豊島区西池袋1-37-12",
            "03-5391-7778",
            "https://jiqoo.jp/",
        ),
        seed(
            "DiCE 秋葉原店",
            "東京都千代田区外神田1-11-5",
            "03-5298-1281",
            "https://www.diskcity.co.jp/",
        ),
        seed(
            "マンボー 渋谷宮益坂店",
            "東京都渋谷区渋谷1-12-1",
            "03-5766-6010",
            "https://manboo.co.jp/",
        ),
        seed(
            "アプレシオ 新宿歌舞伎町店",
            "東京都新宿区歌舞伎町1-20-1",
            "03-5155-4486",
            "https://www.aprecio.co.jp/",
        ),
    ]
}

/// Owned list of records with listing and search.
#[derive(Debug, Clone, Default)]
pub struct StoreCatalog {
    stores: Vec<StoreRecord>,
}

impl StoreCatalog {
    pub fn new(stores: Vec<StoreRecord>) -> Self {
        Self { stores }
    }

    pub fn seeded() -> Self {
        Self::new(seed_stores())
    }

    pub fn all(&self) -> &[StoreRecord] {
        &self.stores
    }

    /// Case-insensitive substring match on name or location. An empty keyword matches everything.
    pub fn search(&self, keyword: &str) -> Vec<&StoreRecord> {
        let keyword = keyword.to_lowercase();
        self.stores
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&keyword)
                    || s.location.to_lowercase().contains(&keyword)
            })
            .collect()
    }
}

/// GET `url` and decode a single JSON store record.
pub fn fetch_record<F: Fetch + ?Sized>(
    fetcher: &F,
    url: &str,
    timeout: Duration,
) -> Result<StoreRecord, ScraperError> {
    let body = fetcher.fetch(url, timeout)?;
    serde_json::from_slice(&body).map_err(|e| ScraperError::Decode {
        url: url.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(&'static str);

    impl Fetch for Canned {
        fn fetch(&self, _url: &str, _timeout: Duration) -> Result<Vec<u8>, ScraperError> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    #[test]
    fn seed_list_has_five_stores() {
        let stores = seed_stores();
        assert_eq!(stores.len(), 5);
        assert_eq!(
            stores[0],
            StoreRecord {
                name: "快活CLUB 新宿西口店".to_string(),
                location: "東京都新宿区西新宿1-12-9".to_string(),
                hours: "24時間営業".to_string(),
                phone: "03-5321-6166".to_string(),
                url: "https://www.kaikatsu.jp/".to_string(),
            }
        );
    }

    #[test]
    fn search_matches_name_or_location() {
        let catalog = StoreCatalog::seeded();
        let cases = [
            ("新宿", 2),
            ("渋谷", 1),
            ("池袋", 1),
            ("秋葉原", 1),
            ("快活", 1),
            ("DICE", 1),
            ("横浜", 0),
            ("", 5),
            ("新宿区", 2),
            ("豊島区", 1),
            ("千代田区", 1),
        ];
        for (keyword, expected) in cases {
            assert_eq!(
                catalog.search(keyword).len(),
                expected,
                "keyword {:?}",
                keyword
            );
        }
    }

    #[test]
    fn all_returns_everything_in_order() {
        let catalog = StoreCatalog::seeded();
        assert_eq!(catalog.all(), seed_stores().as_slice());
    }

    #[test]
    fn fetch_record_decodes_json() -> Result<(), ScraperError> {
        let fetcher = Canned(
            r#"{"name":"Test Cafe","location":"Test Location","hours":"10:00-22:00","phone":"03-1234-5678","url":"https://test.com"}"#,
        );
        let record = fetch_record(&fetcher, "https://test.com/api", Duration::from_secs(1))?;
        assert_eq!(record.name, "Test Cafe");
        assert_eq!(record.hours, "10:00-22:00");
        Ok(())
    }

    #[test]
    fn fetch_record_rejects_invalid_json() {
        let result = fetch_record(&Canned("invalid json"), "https://test.com/api", Duration::from_secs(1));
        assert!(matches!(result, Err(ScraperError::Decode { .. })));
    }
}
