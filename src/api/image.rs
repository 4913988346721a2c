//! Local SVG placeholder served as a data URI when no product image could
//! be scraped.

use crate::types::Source;

/// Maximum characters of the product name shown on the placeholder.
const LABEL_MAX: usize = 22;

pub fn placeholder_image_url(product_name: &str, source: Source) -> String {
    let label: String = product_name
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '&'))
        .take(LABEL_MAX)
        .collect();
    let label = if label.is_empty() { "Product".to_string() } else { label };
    let source_label = source.to_string().to_uppercase();

    let svg = format!(
        concat!(
            "<svg xmlns='http://www.w3.org/2000/svg' width='300' height='300'>",
            "<defs><linearGradient id='bg' x1='0' y1='0' x2='1' y2='1'>",
            "<stop offset='0%' stop-color='#1e293b'/>",
            "<stop offset='100%' stop-color='#0f172a'/>",
            "</linearGradient></defs>",
            "<rect width='100%' height='100%' fill='url(#bg)'/>",
            "<rect x='18' y='18' width='264' height='264' rx='16' fill='none' stroke='#334155' stroke-width='2'/>",
            "<text x='50%' y='47%' text-anchor='middle' fill='#94a3b8' font-size='20' font-family='Arial, sans-serif'>No Image</text>",
            "<text x='50%' y='57%' text-anchor='middle' fill='#6366f1' font-size='14' font-family='Arial, sans-serif'>{label}</text>",
            "<text x='50%' y='66%' text-anchor='middle' fill='#64748b' font-size='12' font-family='Arial, sans-serif'>{source}</text>",
            "</svg>",
        ),
        label = label,
        source = source_label,
    );

    format!("data:image/svg+xml;utf8,{}", percent_encode(&svg))
}

/// Encode everything outside the URI-unreserved set (plus '/').
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_a_data_uri() {
        let url = placeholder_image_url("Apple iPhone 15", Source::Amazon);
        assert!(url.starts_with("data:image/svg+xml;utf8,"));
        assert!(url.contains("AMAZON"));
        assert!(!url.contains(' '), "spaces must be percent-encoded");
    }

    #[test]
    fn long_names_are_truncated() {
        let url = placeholder_image_url(&"x".repeat(100), Source::Query);
        // 22 chars of label, never the full 100.
        assert!(!url.contains(&"x".repeat(23)));
        assert!(url.contains(&"x".repeat(22)));
    }

    #[test]
    fn markup_characters_are_dropped_from_label() {
        let url = placeholder_image_url("<script>alert</script>", Source::Unknown);
        assert!(!url.contains("%3Cscript%3E"));
    }
}
