//! Selector-level extraction from storefront product pages. Selector chains
//! are ordered most-specific first; storefronts rotate their markup, so each
//! field tries several generations of selectors before the meta-tag and
//! JSON-LD fallbacks.

use scraper::{ElementRef, Html, Selector};

use crate::scrape::parse::{normalize_image_url, parse_price, price_from_ld_json};
use crate::scrape::ScrapedDetails;
use crate::types::Source;

struct PageSelectors {
    title: &'static [&'static str],
    title_suffixes: &'static [&'static str],
    image: &'static [&'static str],
    price: &'static [&'static str],
}

const AMAZON: PageSelectors = PageSelectors {
    title: &["#productTitle", "span#title", "h1.a-size-large"],
    title_suffixes: &[": Amazon.in", "| Amazon.in"],
    image: &[
        "#landingImage",
        "#imgTagWrapperId img",
        "img[data-old-hires]",
        "img.a-dynamic-image",
    ],
    price: &[
        "span.a-price.aok-align-center span.a-offscreen",
        "span.a-price-whole",
        "span.a-price span.a-offscreen",
        "span#priceblock_ourprice",
        "span#priceblock_dealprice",
        "span.a-color-price",
    ],
};

const FLIPKART: PageSelectors = PageSelectors {
    title: &["span.VU-ZEz", "span.B_NuCI", "h1.yhB1nd span", "h1"],
    title_suffixes: &["| Flipkart.com", "| Flipkart"],
    image: &["img._396cs4", "img._2r_T1I", "img.DByuf4", "img.CXW8mj", "div._3kidJX img"],
    price: &[
        "div.Nx9bqj.CxhGGd",
        "div.Nx9bqj",
        "div._30jeq3",
        "div._1vC4OE",
        "div._3I9_wc",
        "div.CEmiEU",
    ],
};

const MYNTRA: PageSelectors = PageSelectors {
    title: &["h1.pdp-name", "h1.pdp-title", "h1", "span.pdp-name"],
    title_suffixes: &["| Myntra", "| Myntra.com"],
    image: &["img.img-responsive", "picture img", "img.pdp-image"],
    price: &[
        "span.pdp-price strong",
        "span.pdp-price",
        "div.pdp-price-info span",
        "span[data-testid=\"price\"]",
    ],
};

/// Search-results selectors: the first visible price on the page.
pub const AMAZON_SEARCH_PRICE: &[&str] =
    &["span.a-price span.a-offscreen", ".s-result-item span.a-price-whole"];
pub const FLIPKART_SEARCH_PRICE: &[&str] = &["div.Nx9bqj", "div._30jeq3", "div._1vC4OE"];

/// Extract title, price and image from a product page body.
pub fn extract_details(html: &str, source: Source) -> ScrapedDetails {
    let selectors = match source {
        Source::Amazon => &AMAZON,
        Source::Flipkart => &FLIPKART,
        Source::Myntra => &MYNTRA,
        Source::Query | Source::Unknown => return ScrapedDetails::default(),
    };

    let doc = Html::parse_document(html);
    ScrapedDetails {
        title: extract_title(&doc, selectors.title, selectors.title_suffixes),
        image_url: extract_image(&doc, selectors.image),
        price: extract_price(&doc, html, selectors.price),
    }
}

/// First price found anywhere in a search-results page.
pub fn extract_search_price(html: &str, selectors: &[&str]) -> Option<f64> {
    let doc = Html::parse_document(html);
    selectors
        .iter()
        .filter_map(|s| select_first(&doc, s))
        .find_map(|elem| parse_price(&element_text(elem)))
}

fn extract_title(doc: &Html, selectors: &[&str], suffixes: &[&str]) -> Option<String> {
    for selector in selectors {
        if let Some(elem) = select_first(doc, selector) {
            let title = element_text(elem);
            if !title.is_empty() {
                return Some(strip_suffixes(title, suffixes));
            }
        }
    }

    const META_TITLES: &[&str] =
        &["meta[property=\"og:title\"]", "meta[name=\"title\"]", "meta[name=\"twitter:title\"]"];
    for selector in META_TITLES {
        if let Some(content) = meta_content(doc, selector) {
            return Some(strip_suffixes(content, suffixes));
        }
    }

    select_first(doc, "title")
        .map(element_text)
        .filter(|t| !t.is_empty())
        .map(|t| strip_suffixes(t, suffixes))
}

fn extract_image(doc: &Html, selectors: &[&str]) -> Option<String> {
    for selector in selectors {
        if let Some(elem) = select_first(doc, selector) {
            let src = ["src", "data-src", "data-original", "content"]
                .iter()
                .find_map(|attr| elem.value().attr(attr));
            if let Some(url) = src.and_then(normalize_image_url) {
                return Some(url);
            }
        }
    }

    meta_content(doc, "meta[property=\"og:image\"]")
        .or_else(|| meta_content(doc, "meta[name=\"twitter:image\"]"))
        .and_then(|url| normalize_image_url(&url))
}

fn extract_price(doc: &Html, html: &str, selectors: &[&str]) -> Option<f64> {
    for selector in selectors {
        if let Some(elem) = select_first(doc, selector) {
            if let Some(price) = parse_price(&element_text(elem)) {
                return Some(price);
            }
        }
    }

    if let Some(price) =
        meta_content(doc, "meta[property=\"product:price:amount\"]").and_then(|c| parse_price(&c))
    {
        return Some(price);
    }

    price_from_ld_json(html)
}

fn select_first<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let parsed = Selector::parse(selector).ok()?;
    doc.select(&parsed).next()
}

fn meta_content(doc: &Html, selector: &str) -> Option<String> {
    let content = select_first(doc, selector)?.value().attr("content")?;
    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

fn element_text(elem: ElementRef<'_>) -> String {
    elem.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_suffixes(mut title: String, suffixes: &[&str]) -> String {
    for suffix in suffixes {
        let lower = title.to_lowercase();
        if lower.ends_with(&suffix.to_lowercase()) {
            title.truncate(title.len() - suffix.len());
            title = title.trim_end().to_string();
        }
    }
    title
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
