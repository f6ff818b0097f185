//! Rotating desktop user-agent strings.
//!
//! The quote page serves a different (selector-less) layout to mobile
//! browsers, so only desktop platforms are generated.

use rand::Rng;

const CHROME_VERSIONS: [&str; 12] = [
    "133.0.6943.60",
    "133.0.6943.88",
    "132.0.6834.83",
    "132.0.6834.110",
    "131.0.6778.85",
    "131.0.6778.108",
    "130.0.6723.92",
    "130.0.6723.117",
    "129.0.6668.89",
    "128.0.6613.138",
    "127.0.6533.119",
    "126.0.6478.182",
];

const FIREFOX_VERSIONS: [&str; 10] = [
    "133.0", "132.0", "131.0", "130.0", "129.0", "128.0", "127.0", "126.0", "125.0", "115.0",
];

const EDGE_VERSIONS: [&str; 8] = [
    "133.0.3048.56",
    "132.0.2957.55",
    "131.0.2903.86",
    "130.0.2849.68",
    "129.0.2792.52",
    "128.0.2739.79",
    "127.0.2651.98",
    "126.0.2592.87",
];

const SAFARI_VERSIONS: [&str; 5] = ["18.2", "18.1", "17.6", "17.5", "16.6"];

const DESKTOP_OS: [&str; 12] = [
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; WOW64",
    "Windows NT 6.1; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 13_6_9",
    "Macintosh; Intel Mac OS X 14_7_2",
    "Macintosh; Intel Mac OS X 15_2",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
    "X11; Fedora; Linux x86_64",
    "X11; Debian; Linux x86_64",
    "X11; CrOS x86_64 15917.22.0",
];

fn pick<'a>(items: &[&'a str]) -> &'a str {
    items[rand::rng().random_range(0..items.len())]
}

fn gen_chrome_ua() -> String {
    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        pick(&DESKTOP_OS),
        pick(&CHROME_VERSIONS)
    )
}

fn gen_firefox_ua() -> String {
    let version = pick(&FIREFOX_VERSIONS);
    format!(
        "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
        pick(&DESKTOP_OS),
        version,
        version
    )
}

fn gen_edge_ua() -> String {
    let edge = pick(&EDGE_VERSIONS);
    // Edge ships on the matching Chromium major.
    let major = edge.split('.').next().unwrap_or("133");
    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36 Edg/{}",
        pick(&DESKTOP_OS[..3]),
        major,
        edge
    )
}

fn gen_safari_ua() -> String {
    format!(
        "Mozilla/5.0 ({}) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{} Safari/605.1.15",
        pick(&DESKTOP_OS[3..7]),
        pick(&SAFARI_VERSIONS)
    )
}

/// Generate a random desktop user agent, weighted roughly by market share.
pub fn gen_random_ua() -> String {
    match rand::rng().random_range(0..10) {
        0..=5 => gen_chrome_ua(),
        6..=7 => gen_firefox_ua(),
        8 => gen_edge_ua(),
        _ => gen_safari_ua(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_random_ua_shape() {
        for _ in 0..50 {
            let ua = gen_random_ua();
            assert!(ua.starts_with("Mozilla/5.0 ("), "{ua}");
            assert!(!ua.contains("Mobile"), "{ua}");
            assert!(ua.is_ascii());
        }
    }

    #[test]
    fn test_edge_matches_chromium_major() {
        for _ in 0..20 {
            let ua = gen_edge_ua();
            let edge = ua.rsplit("Edg/").next().unwrap();
            let major = edge.split('.').next().unwrap();
            assert!(ua.contains(&format!("Chrome/{major}.0.0.0")), "{ua}");
            assert!(ua.contains("Windows NT"), "{ua}");
        }
    }

    #[test]
    fn test_safari_is_mac_only() {
        for _ in 0..20 {
            assert!(gen_safari_ua().contains("Macintosh"));
        }
    }
}
