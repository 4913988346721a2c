//! Best-effort storefront scraping. Nothing in here errors past the module
//! boundary: a page that cannot be fetched or parsed yields `None` fields,
//! and the analysis pipeline carries on with whatever signal is left.

pub mod page;
pub mod parse;

use std::time::Duration;

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::config::{AMAZON_SEARCH_URL, FLIPKART_SEARCH_URL, SCRAPE_TIMEOUT_SECS};
use crate::error::Result;
use crate::types::{MarketplacePrices, Source};

/// What a product-page scrape managed to recover. Absence is a valid
/// outcome, not an error.
#[derive(Debug, Clone, Default)]
pub struct ScrapedDetails {
    pub price: Option<f64>,
    pub title: Option<String>,
    pub image_url: Option<String>,
}

/// Rotated per request to avoid trivial blocking.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
];

#[derive(Clone)]
pub struct Scraper {
    client: reqwest::Client,
}

impl Scraper {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SCRAPE_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Scrape price/title/image from a product page.
    pub async fn scrape_details(&self, url: &str, source: Source) -> ScrapedDetails {
        if !source.is_storefront() {
            return ScrapedDetails::default();
        }
        let Some(html) = self.fetch_text(url).await else {
            return ScrapedDetails::default();
        };
        let details = page::extract_details(&html, source);
        debug!(
            %source,
            price = ?details.price,
            has_title = details.title.is_some(),
            has_image = details.image_url.is_some(),
            "Scraped product page"
        );
        details
    }

    /// Best-effort: first visible price on a marketplace search-results page.
    pub async fn search_price(&self, product_name: &str, source: Source) -> Option<f64> {
        let (base, param, selectors) = match source {
            Source::Amazon => (AMAZON_SEARCH_URL, "k", page::AMAZON_SEARCH_PRICE),
            Source::Flipkart => (FLIPKART_SEARCH_URL, "q", page::FLIPKART_SEARCH_PRICE),
            _ => return None,
        };
        let url = reqwest::Url::parse_with_params(base, &[(param, product_name)]).ok()?;
        let html = self.fetch_text(url.as_str()).await?;
        page::extract_search_price(&html, selectors)
    }

    /// Search both marketplaces for a product by name.
    pub async fn marketplace_prices(&self, product_name: &str) -> MarketplacePrices {
        MarketplacePrices {
            amazon: self.search_price(product_name, Source::Amazon).await,
            flipkart: self.search_price(product_name, Source::Flipkart).await,
        }
    }

    async fn fetch_text(&self, url: &str) -> Option<String> {
        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let response = self
            .client
            .get(url)
            .header("User-Agent", user_agent)
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Referer", "https://www.google.com/")
            .send()
            .await;

        match response {
            Ok(resp) => match resp.text().await {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!(url, "Failed to read scrape response body: {e}");
                    None
                }
            },
            Err(e) => {
                warn!(url, "Scrape request failed: {e}");
                None
            }
        }
    }
}
