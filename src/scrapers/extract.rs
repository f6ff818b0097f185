//! Best-effort rate extraction from a quote page.
//!
//! The page layout changes every few months, so the extractor walks a fixed
//! list of selectors that have historically held the last traded price. The
//! first selector whose element text reduces to a valid number wins.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, trace};

/// Selectors tried in order, newest layout first.
pub const RATE_SELECTORS: [&str; 5] = [
    ".last-price-value",
    ".text-5xl",
    "#last_last",
    r#"div[data-test="instrument-price-last"]"#,
    ".instrument-price_last",
];

static COMPILED: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    RATE_SELECTORS
        .iter()
        .filter_map(|css| Selector::parse(css).ok().map(|s| (*css, s)))
        .collect()
});

/// Reduce noisy element text to a rate.
///
/// Keeps ASCII digits and `.` only, then parses as `f64`. Currency symbols,
/// spaces and thousands separators disappear; a string left with two decimal
/// points fails to parse. Zero, negative and non-finite values are rejected
/// so that a bad page never produces a bogus reading.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_rate(" 91.23 RUB "), Some(91.23));
/// assert_eq!(parse_rate("1.234.5"), None);
/// ```
pub fn parse_rate(text: &str) -> Option<f64> {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    digits
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Extract the rate from a parsed document.
///
/// Only the first element matched by each selector is considered. Returns
/// `None` when no selector matches or no match parses.
pub fn extract(document: &Html) -> Option<f64> {
    for (css, selector) in COMPILED.iter() {
        let Some(element) = document.select(selector).next() else {
            trace!(selector = css, "Selector matched nothing");
            continue;
        };

        let text = element.text().collect::<String>();
        match parse_rate(&text) {
            Some(value) => {
                debug!(selector = css, value, "Extracted rate");
                return Some(value);
            }
            None => {
                debug!(selector = css, text = %text.trim(), "Matched element did not parse");
            }
        }
    }
    None
}

/// Parse raw markup and extract the rate from it.
pub fn extract_from_markup(markup: &str) -> Option<f64> {
    let document = Html::parse_document(markup);
    extract(&document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_selectors_compile() {
        assert_eq!(COMPILED.len(), RATE_SELECTORS.len());
    }

    #[test]
    fn test_parse_rate_strips_noise() {
        assert_eq!(parse_rate("91.23 RUB"), Some(91.23));
        assert_eq!(parse_rate("  ₽ 92.5\n"), Some(92.5));
        assert_eq!(parse_rate("1,234.56"), Some(1234.56));
    }

    #[test]
    fn test_parse_rate_rejects_malformed() {
        assert_eq!(parse_rate("1.234.56"), None);
        assert_eq!(parse_rate("."), None);
        assert_eq!(parse_rate(""), None);
        assert_eq!(parse_rate("n/a"), None);
    }

    #[test]
    fn test_parse_rate_never_negative() {
        assert_eq!(parse_rate("-91.23"), Some(91.23));
        assert_eq!(parse_rate("0.00"), None);
        assert_eq!(parse_rate("-0"), None);
        for noisy in ["−5", "+-3.2e10", "NaN", "inf", "1e308", "--.--"] {
            if let Some(v) = parse_rate(noisy) {
                assert!(v > 0.0, "{noisy} produced {v}");
            }
        }
    }

    #[test]
    fn test_extract_last_price_value() {
        let html = r#"<html><body><span class="last-price-value">91.23 RUB</span></body></html>"#;
        assert_eq!(extract_from_markup(html), Some(91.23));
    }

    #[test]
    fn test_extract_first_selector_wins() {
        let html = r#"
            <div class="instrument-price_last">70.00</div>
            <span class="last-price-value">91.23</span>
            <div id="last_last">80.00</div>
        "#;
        assert_eq!(extract_from_markup(html), Some(91.23));
    }

    #[test]
    fn test_extract_falls_through_unparseable_match() {
        let html = r#"
            <span class="last-price-value">1.2.3</span>
            <div class="text-5xl">--</div>
            <div data-test="instrument-price-last">92.10</div>
        "#;
        assert_eq!(extract_from_markup(html), Some(92.10));
    }

    #[test]
    fn test_extract_uses_first_element_only() {
        let html = r#"
            <span class="last-price-value">pending</span>
            <span class="last-price-value">91.23</span>
            <div id="last_last">88.8</div>
        "#;
        assert_eq!(extract_from_markup(html), Some(88.8));
    }

    #[test]
    fn test_extract_skips_zero_rate() {
        let html = r#"
            <span class="last-price-value">0.00</span>
            <div id="last_last">91.2</div>
        "#;
        assert_eq!(extract_from_markup(html), Some(91.2));
    }

    #[test]
    fn test_extract_nested_text() {
        let html = r#"<div id="last_last"><b>9</b><i>1.</i>23</div>"#;
        assert_eq!(extract_from_markup(html), Some(91.23));
    }

    #[test]
    fn test_extract_not_found() {
        let html = r#"<html><body><p class="price">91.23</p></body></html>"#;
        assert_eq!(extract_from_markup(html), None);
        assert_eq!(extract_from_markup(""), None);
    }
}
