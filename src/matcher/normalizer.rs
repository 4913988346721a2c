//! Turns free-text product descriptions (scraped titles, URL slugs, user
//! queries) into comparable token sets.

/// Storefront boilerplate stripped from titles before tokenizing.
const NOISE_PHRASES: &[&str] = &[
    "online at best price",
    "buy online",
    "price in india",
    "flipkart.com",
    "amazon.in",
    "amazon.com",
];

/// Words that carry no matching signal: articles, prepositions, unit words,
/// storefront brand words.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for",
    "with", "without", "by", "from", "best", "price", "online",
    "storage", "ram", "gb", "tb", "inch", "cm", "mm", "new",
    "amazon", "flipkart", "myntra", "product", "india", "buy",
];

/// Placeholder names that must not drive model matching; callers fall back
/// to a name inferred from the source URL instead.
const GENERIC_NAMES: &[&str] = &["amazon product", "flipkart product", "myntra product", "product"];

/// Lowercase, strip noise phrases, collapse every non-alphanumeric run to a
/// single space, trim.
pub fn normalize(text: &str) -> String {
    let mut cleaned = text.to_lowercase();
    for phrase in NOISE_PHRASES {
        while let Some(pos) = cleaned.find(phrase) {
            cleaned.replace_range(pos..pos + phrase.len(), " ");
        }
    }

    let mut out = String::with_capacity(cleaned.len());
    let mut last_was_space = true;
    for c in cleaned.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim_end().to_string()
}

/// Normalized tokens minus stop words and tokens of length ≤ 2, first
/// occurrence order, deduplicated. The leading tokens are the
/// highest-priority keywords for substring matching.
pub fn keywords(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let mut out: Vec<String> = Vec::new();
    for word in normalized.split_whitespace() {
        if word.len() <= 2 || STOP_WORDS.contains(&word) {
            continue;
        }
        if !out.iter().any(|w| w == word) {
            out.push(word.to_string());
        }
    }
    out
}

/// True for placeholder names ("Amazon Product", …) that should not be
/// matched against the catalog.
pub fn is_generic_name(name: &str) -> bool {
    let normalized = normalize(name);
    GENERIC_NAMES.contains(&normalized.as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_storefront_suffix_and_punctuation() {
        assert_eq!(normalize("iPhone 15 Pro Max — Amazon.in"), "iphone 15 pro max");
    }

    #[test]
    fn keywords_drop_stop_words_and_short_tokens() {
        // "15" survives normalization but falls to the length filter;
        // "gb" is a stop word.
        let kw = keywords("iPhone 15 Pro Max — Amazon.in");
        assert_eq!(kw, vec!["iphone", "pro", "max"]);

        let kw = keywords("Samsung Galaxy 256 GB storage for the best price");
        assert_eq!(kw, vec!["samsung", "galaxy", "256"]);
    }

    #[test]
    fn noise_phrases_are_removed_before_tokenizing() {
        assert_eq!(
            normalize("Sony WH-1000XM5 Buy Online Price in India"),
            "sony wh 1000xm5"
        );
    }

    #[test]
    fn generic_placeholder_names_are_flagged() {
        assert!(is_generic_name("Amazon Product"));
        assert!(is_generic_name("product"));
        assert!(is_generic_name("  Flipkart   Product  "));
        assert!(!is_generic_name("Apple iPhone 15"));
    }

    #[test]
    fn keywords_keep_first_occurrence_order() {
        let kw = keywords("Canon Camera Canon Lens");
        assert_eq!(kw, vec!["canon", "camera", "lens"]);
    }
}
