//! Canonical data model for scraped store listings.
//!
//! Every site adapter produces this shape; the catalog, the aggregator and the CLI consume it.

use serde::{Deserialize, Serialize};

/// Hours marker used when a listing omits opening hours. All chains in scope run around the clock.
pub const CONTINUOUS_HOURS: &str = "24時間営業";

/// One store from one source.
///
/// `name` is never empty once a record leaves an extractor. `url` is always absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    pub name: String,
    /// Free-text address; empty when the listing had none.
    pub location: String,
    pub hours: String,
    /// Loose phone shape (digits and separators) or empty.
    pub phone: String,
    pub url: String,
}

impl StoreRecord {
    /// Record with the given name and origin URL, continuous hours, and empty location/phone.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: String::new(),
            hours: CONTINUOUS_HOURS.to_string(),
            phone: String::new(),
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn new_record_defaults_hours_and_empty_fields() {
        let r = StoreRecord::new("快活CLUB 新宿西口店", "https://www.kaikatsu.jp");
        assert_eq!(r.hours, CONTINUOUS_HOURS);
        assert!(r.location.is_empty());
        assert!(r.phone.is_empty());
    }

    #[test]
    fn record_serializes_with_short_keys() -> Result<(), Box<dyn Error>> {
        let mut r = StoreRecord::new("マンボー 渋谷宮益坂店", "https://manboo.co.jp/");
        r.location = "東京都渋谷区渋谷1-12-1".to_string();
        r.phone = "03-5766-6010".to_string();
        let value: serde_json::Value = serde_json::to_value(&r)?;
        let obj = value.as_object().ok_or("record must serialize to an object")?;
        for key in ["name", "location", "hours", "phone", "url"] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj["phone"].as_str(), Some("03-5766-6010"));
        let back: StoreRecord = serde_json::from_value(value)?;
        assert_eq!(back, r);
        Ok(())
    }
}
