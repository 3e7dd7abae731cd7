//! Two-tier listing extraction driven by a [SiteProfile]: structured selectors first,
//! line heuristics over `<li>` text when the selectors find nothing.

use crate::model::{StoreRecord, CONTINUOUS_HOURS};
use crate::scraper::error::ScraperError;
use crate::scraper::normalize::{
    absolutize_url, apply_brand, collapse_whitespace, is_address_line, is_phone_line,
    is_store_line, normalize_phone, text_lines,
};
use crate::scraper::SiteProfile;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Parse a page body. Tolerates broken markup; rejects only bytes that are not text markup at all.
pub fn parse_document(url: &str, body: &[u8]) -> Result<Html, ScraperError> {
    let text = std::str::from_utf8(body).map_err(|e| ScraperError::Parse {
        url: url.to_string(),
        reason: format!("body is not valid UTF-8: {}", e),
    })?;
    if !text.contains('<') {
        return Err(ScraperError::Parse {
            url: url.to_string(),
            reason: "body contains no markup".to_string(),
        });
    }
    Ok(Html::parse_document(text))
}

/// Compile a selector, logging and skipping invalid ones so extraction itself never fails.
fn compile(sel: &str) -> Option<Selector> {
    match Selector::parse(sel) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(selector = sel, error = %e, "invalid selector skipped");
            None
        }
    }
}

/// Text of the first element matching the first selector alternative that yields any.
fn first_text(container: ElementRef<'_>, alternatives: &[&str]) -> Option<String> {
    alternatives.iter().find_map(|alt| {
        let sel = compile(alt)?;
        container
            .select(&sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|s| !s.is_empty())
    })
}

fn first_href(container: ElementRef<'_>) -> Option<String> {
    if container.value().name() == "a" {
        return container.value().attr("href").map(String::from);
    }
    let sel = compile("a")?;
    container
        .select(&sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(String::from)
}

/// Structured pass: one record per container that yields a name.
pub fn extract_primary(profile: &SiteProfile, doc: &Html) -> Vec<StoreRecord> {
    // One grouped selector keeps document order and visits nested matches once.
    let Some(containers) = compile(&profile.containers.join(", ")) else {
        return Vec::new();
    };
    let mut records = Vec::new();
    for container in doc.select(&containers) {
        let Some(name) = first_text(container, profile.name) else {
            debug!(brand = profile.brand, "container without name skipped");
            continue;
        };
        let href = first_href(container).unwrap_or_default();
        records.push(StoreRecord {
            name: apply_brand(profile.brand, &name),
            location: first_text(container, profile.address).unwrap_or_default(),
            hours: first_text(container, profile.hours)
                .unwrap_or_else(|| CONTINUOUS_HOURS.to_string()),
            phone: first_text(container, profile.phone)
                .map(|p| normalize_phone(&p))
                .unwrap_or_default(),
            url: absolutize_url(profile.origin, &href),
        });
    }
    records
}

/// Heuristic pass over every `<li>`: the first line claiming each field wins.
///
/// A line sets at most one field, tested in order name, address, phone; fields never change once set.
pub fn extract_fallback(profile: &SiteProfile, doc: &Html) -> Vec<StoreRecord> {
    let Some(items) = compile("li") else {
        return Vec::new();
    };
    let mut records = Vec::new();
    for item in doc.select(&items) {
        let text = item.text().collect::<String>();
        let mut name: Option<&str> = None;
        let mut address: Option<&str> = None;
        let mut phone: Option<&str> = None;
        for line in text_lines(&text) {
            if name.is_none() && is_store_line(line) {
                name = Some(line);
            } else if address.is_none() && is_address_line(line) {
                address = Some(line);
            } else if phone.is_none() && is_phone_line(line) {
                phone = Some(line);
            }
        }
        let Some(name) = name else {
            continue;
        };
        let mut record = StoreRecord::new(apply_brand(profile.brand, name), profile.origin);
        record.location = address.unwrap_or_default().to_string();
        record.phone = phone.unwrap_or_default().to_string();
        records.push(record);
    }
    records
}

/// Full extraction for one source document.
pub fn extract_listing(profile: &SiteProfile, doc: &Html) -> Vec<StoreRecord> {
    let records = extract_primary(profile, doc);
    if !records.is_empty() {
        debug!(brand = profile.brand, count = records.len(), "structured extraction");
        return records;
    }
    let records = extract_fallback(profile, doc);
    debug!(brand = profile.brand, count = records.len(), "heuristic fallback extraction");
    records
}
