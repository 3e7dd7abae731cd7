//! Field normalization shared by every site adapter: URLs, brand prefixes, and line classification.

use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;

/// Store-suffix marker ("shop/branch").
pub const STORE_MARKER: char = '店';
/// Administrative-division markers: ward, city.
pub const DIVISION_MARKERS: [char; 2] = ['区', '市'];

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{2,4}-[0-9]{2,4}-[0-9]{4}").expect("valid phone regex"))
}

/// Rewrite a relative href against `origin` (no trailing slash). Absolute http(s) hrefs are unchanged.
///
/// Empty hrefs and non-web schemes (`tel:`, `mailto:`, `javascript:`) resolve to the origin itself
/// so every record carries an absolute web URL.
pub fn absolutize_url(origin: &str, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return origin.to_string();
    }
    if let Ok(url) = Url::parse(href) {
        return if is_web(&url) {
            href.to_string()
        } else {
            origin.to_string()
        };
    }
    if href.starts_with('/') && !href.starts_with("//") {
        return format!("{}{}", origin, href);
    }
    match Url::parse(origin).and_then(|base| base.join(href)) {
        Ok(url) if is_web(&url) => url.to_string(),
        _ => origin.to_string(),
    }
}

fn is_web(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Prefix `name` with `brand` unless the brand already appears in it. Idempotent.
pub fn apply_brand(brand: &str, name: &str) -> String {
    let name = name.trim();
    if name.contains(brand) {
        name.to_string()
    } else if name.is_empty() {
        brand.to_string()
    } else {
        format!("{} {}", brand, name)
    }
}

/// Collapse runs of whitespace (including newlines from nested markup) into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed, non-blank lines of a text block.
pub fn text_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

pub fn is_store_line(line: &str) -> bool {
    line.contains(STORE_MARKER)
}

pub fn is_address_line(line: &str) -> bool {
    line.contains(DIVISION_MARKERS)
}

/// Fold full-width digits and dash look-alikes to ASCII so one phone pattern covers both.
fn fold_phone_chars(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            '－' | 'ー' | '‐' | '−' | '–' => '-',
            _ => c,
        })
        .collect()
}

/// Heuristic phone test: 2-4 digits, dash, 2-4 digits, dash, 4 digits, anywhere in the line.
pub fn is_phone_line(line: &str) -> bool {
    phone_re().is_match(&fold_phone_chars(line))
}

/// Pull a phone number out of a labeled or annotated field.
///
/// Takes the first dashed number anywhere in the text. Failing that, keeps the unlabeled value if
/// it is only digits and separators with at least six digits. Anything else becomes empty.
pub fn normalize_phone(raw: &str) -> String {
    let folded = fold_phone_chars(raw);
    if let Some(m) = phone_re().find(&folded) {
        return m.as_str().to_string();
    }
    let mut s = folded.trim();
    for label in ["TEL", "Tel", "tel", "ＴＥＬ", "電話番号", "電話"] {
        if let Some(rest) = s.strip_prefix(label) {
            s = rest.trim_start_matches([':', '：', '.', ' ', '\u{3000}']).trim();
            break;
        }
    }
    let digits = s.chars().filter(char::is_ascii_digit).count();
    let shaped = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | '(' | ')' | '+' | ' ' | '.'));
    if digits >= 6 && shaped {
        s.to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.kaikatsu.jp";

    #[test]
    fn relative_href_gets_origin_prefix() {
        assert_eq!(
            absolutize_url(ORIGIN, "/shop/detail/20345.html"),
            "https://www.kaikatsu.jp/shop/detail/20345.html"
        );
        assert_eq!(
            absolutize_url(ORIGIN, "shop/20345"),
            "https://www.kaikatsu.jp/shop/20345"
        );
    }

    #[test]
    fn absolute_href_is_unchanged() {
        let href = "https://jiqoo.jp/shop/detail/?id=1";
        assert_eq!(absolutize_url(ORIGIN, href), href);
        assert_eq!(
            absolutize_url(ORIGIN, "http://example.com/a"),
            "http://example.com/a"
        );
    }

    #[test]
    fn empty_and_protocol_relative_hrefs() {
        assert_eq!(absolutize_url(ORIGIN, ""), ORIGIN);
        assert_eq!(absolutize_url(ORIGIN, "  "), ORIGIN);
        assert_eq!(
            absolutize_url(ORIGIN, "//cdn.kaikatsu.jp/x"),
            "https://cdn.kaikatsu.jp/x"
        );
    }

    #[test]
    fn non_web_schemes_resolve_to_origin() {
        assert_eq!(absolutize_url(ORIGIN, "tel:03-5321-6166"), ORIGIN);
        assert_eq!(absolutize_url(ORIGIN, "mailto:info@kaikatsu.jp"), ORIGIN);
        assert_eq!(absolutize_url(ORIGIN, "javascript:void(0)"), ORIGIN);
    }

    #[test]
    fn brand_prefix_is_applied_once() {
        let once = apply_brand("快活CLUB", "新宿西口店");
        assert_eq!(once, "快活CLUB 新宿西口店");
        assert_eq!(apply_brand("快活CLUB", &once), once);
        assert_eq!(apply_brand("自遊空間", "自遊空間 池袋西口ROSA店"), "自遊空間 池袋西口ROSA店");
    }

    #[test]
    fn brand_prefix_idempotent_over_samples() {
        for name in ["Shinjuku-West Branch", "  渋谷宮益坂店 ", "マンボー新宿", ""] {
            let once = apply_brand("マンボー", name);
            assert_eq!(apply_brand("マンボー", &once), once, "name {:?}", name);
        }
    }

    #[test]
    fn line_classifiers() {
        assert!(is_store_line("新宿西口店"));
        assert!(!is_store_line("東京都新宿区西新宿1-12-9"));
        assert!(is_address_line("東京都新宿区西新宿1-12-9"));
        assert!(is_address_line("神奈川県横浜市西区"));
        assert!(!is_address_line("03-5321-6166"));
        assert!(is_phone_line("03-5321-6166"));
        assert!(is_phone_line("TEL 045-123-4567"));
        assert!(!is_phone_line("1-12-9"));
        assert!(is_phone_line("ＴＥＬ：０３－５３２１－６１６６"));
    }

    #[test]
    fn text_lines_trims_and_drops_blanks() {
        let lines: Vec<_> = text_lines("\n  新宿西口店 \n\n\t東京都新宿区\n   \n").collect();
        assert_eq!(lines, vec!["新宿西口店", "東京都新宿区"]);
    }

    #[test]
    fn normalize_phone_strips_label_and_rejects_text() {
        assert_eq!(normalize_phone(" 03-5321-6166 "), "03-5321-6166");
        assert_eq!(normalize_phone("TEL：03-5321-6166"), "03-5321-6166");
        assert_eq!(normalize_phone("電話 03 5321 6166"), "03 5321 6166");
        assert_eq!(normalize_phone("お問い合わせ"), "");
        assert_eq!(normalize_phone("12-3"), "");
    }

    #[test]
    fn normalize_phone_folds_full_width_and_drops_annotations() {
        assert_eq!(normalize_phone("TEL：03－5321－6166"), "03-5321-6166");
        assert_eq!(normalize_phone("０３ー１２３４ー５６７８"), "03-1234-5678");
        assert_eq!(normalize_phone("03-1234-5678（代表）"), "03-1234-5678");
        assert_eq!(normalize_phone("電話 ０３ ５３２１ ６１６６"), "03 5321 6166");
    }

    #[test]
    fn collapse_whitespace_joins_nested_text() {
        assert_eq!(
            collapse_whitespace("東京都新宿区\n    西新宿1-12-9 "),
            "東京都新宿区 西新宿1-12-9"
        );
    }
}
