//! Text-level extraction helpers: price strings, JSON-LD blocks, image URL
//! cleanup, and product-name inference from URL slugs.

use regex::Regex;

use crate::types::Source;

/// Parse a human-readable price string ("₹1,299.00", "Rs. 499") to a
/// positive float.
pub fn parse_price(text: &str) -> Option<f64> {
    let normalized = text.replace('₹', "").replace("Rs.", "").replace("Rs", "");
    let re = Regex::new(r"(\d[\d,]*\.?\d*)").ok()?;
    let captured = re.captures(normalized.trim())?.get(1)?.as_str().replace(',', "");
    let value: f64 = captured.parse().ok()?;
    (value > 0.0).then_some(value)
}

/// Pull a price out of embedded JSON-LD when CSS selectors find nothing.
pub fn price_from_ld_json(html: &str) -> Option<f64> {
    let patterns = [
        r#""price"\s*:\s*"?(\d[\d,]*\.?\d*)"?"#,
        r#""currentPrice"\s*:\s*"?(\d[\d,]*\.?\d*)"?"#,
    ];
    for pattern in patterns {
        let re = Regex::new(pattern).ok()?;
        if let Some(captures) = re.captures(html) {
            if let Some(price) = parse_price(captures.get(1)?.as_str()) {
                return Some(price);
            }
        }
    }
    None
}

/// Make a scraped image URL absolute where possible.
pub fn normalize_image_url(url: &str) -> Option<String> {
    let clean = url.trim();
    if clean.is_empty() {
        return None;
    }
    if let Some(rest) = clean.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    Some(clean.to_string())
}

/// Infer a product name from a storefront URL slug when no title could be
/// scraped, e.g. `/apple-iphone-15-pro/dp/B0XYZ` → "Apple Iphone 15 Pro".
pub fn infer_name_from_url(url: &str, source: Source) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let segments: Vec<String> = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .map(percent_decode)
        .collect();

    match source {
        Source::Amazon => {
            if let Some(idx) = segments.iter().position(|s| s == "dp") {
                if idx > 0 {
                    return prettify(&segments[idx - 1]);
                }
            }
            if let Some(idx) = segments.iter().position(|s| s == "gp") {
                if idx > 0 && segments.iter().any(|s| s == "product") {
                    return prettify(&segments[idx - 1]);
                }
            }
        }
        Source::Flipkart => {
            if let Some(idx) = segments.iter().position(|s| s == "p") {
                if idx > 0 {
                    return prettify(&segments[idx - 1]);
                }
            }
        }
        Source::Myntra => {
            for segment in &segments {
                if !segment.eq_ignore_ascii_case("buy") && !segment.chars().all(|c| c.is_ascii_digit())
                {
                    return prettify(segment);
                }
            }
        }
        Source::Query | Source::Unknown => {}
    }

    // Last resort for any source: first slug-looking segment.
    const SKIP: &[&str] = &["dp", "gp", "product", "p", "buy", "d"];
    segments
        .iter()
        .filter(|s| !SKIP.contains(&s.to_lowercase().as_str()))
        .filter(|s| !s.chars().all(|c| c.is_ascii_digit()))
        .find_map(|s| prettify(s))
}

/// Turn a URL slug into a display name: strip URL punctuation, split on
/// dashes/pluses, capitalize each word.
fn prettify(segment: &str) -> Option<String> {
    let cleaned: String = segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == ' ' { c } else { ' ' })
        .collect();

    let words: Vec<String> = cleaned
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        return None;
    }
    Some(words.join(" "))
}

/// Decode %XX escapes; leaves malformed escapes untouched.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rupee_and_comma_formats() {
        assert_eq!(parse_price("₹1,29,900"), Some(129_900.0));
        assert_eq!(parse_price("Rs. 499"), Some(499.0));
        assert_eq!(parse_price("  1,299.50  "), Some(1299.5));
        assert_eq!(parse_price("Currently unavailable"), None);
        assert_eq!(parse_price("₹0"), None);
    }

    #[test]
    fn finds_price_in_ld_json() {
        let html = r#"<script type="application/ld+json">{"@type":"Product","price": "1,499"}</script>"#;
        assert_eq!(price_from_ld_json(html), Some(1499.0));

        let html = r#"{"offers":{"currentPrice":2999}}"#;
        assert_eq!(price_from_ld_json(html), Some(2999.0));

        assert_eq!(price_from_ld_json("<html></html>"), None);
    }

    #[test]
    fn image_urls_become_absolute() {
        assert_eq!(
            normalize_image_url("//img.example.com/a.jpg"),
            Some("https://img.example.com/a.jpg".to_string())
        );
        assert_eq!(normalize_image_url("   "), None);
        assert_eq!(
            normalize_image_url("https://x.com/a.jpg"),
            Some("https://x.com/a.jpg".to_string())
        );
    }

    #[test]
    fn amazon_name_comes_from_segment_before_dp() {
        let name = infer_name_from_url(
            "https://www.amazon.in/Apple-iPhone-15-Pro-Max/dp/B0CHX1W1XY",
            Source::Amazon,
        );
        assert_eq!(name.as_deref(), Some("Apple Iphone 15 Pro Max"));
    }

    #[test]
    fn flipkart_name_comes_from_segment_before_p() {
        let name = infer_name_from_url(
            "https://www.flipkart.com/samsung-galaxy-s24-ultra/p/itm123",
            Source::Flipkart,
        );
        assert_eq!(name.as_deref(), Some("Samsung Galaxy S24 Ultra"));
    }

    #[test]
    fn myntra_name_skips_buy_and_numeric_segments() {
        let name = infer_name_from_url(
            "https://www.myntra.com/buy/12345/nike-air-max-270",
            Source::Myntra,
        );
        assert_eq!(name.as_deref(), Some("Nike Air Max 270"));
    }

    #[test]
    fn unparseable_urls_yield_nothing() {
        assert_eq!(infer_name_from_url("not a url", Source::Amazon), None);
    }
}
