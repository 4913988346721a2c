use crate::error::{AppError, Result};

pub const AMAZON_SEARCH_URL: &str = "https://www.amazon.in/s";
pub const FLIPKART_SEARCH_URL: &str = "https://www.flipkart.com/search";

/// Minimum observations a single product series needs before a per-product
/// trend model is trained. Series below this are skipped and the resolver
/// escalates to the next fallback tier.
pub const MIN_PRODUCT_ROWS: usize = 5;

/// Minimum rows a pooled category series needs before a category model is
/// trained. Pools below this fall back to the entire dataset.
pub const MIN_POOL_ROWS: usize = 10;

/// Similarity score below which a catalog product is not considered a match.
pub const MIN_MATCH_SCORE: f64 = 2.0;

/// How many similar products the matcher hands to the resolver.
pub const MATCHER_TOP_N: usize = 5;

/// How many similar products are echoed back in the analysis response.
pub const REPORTED_SIMILAR: usize = 3;

/// A projected price must undercut the current price by more than this
/// fraction at some horizon before WAIT fires.
pub const WAIT_THRESHOLD: f64 = 0.05;

/// Confidence reported when a model's R² is degenerate (constant-price series).
pub const FALLBACK_CONFIDENCE: f64 = 0.70;

/// Width in rupees of the price buckets used to key category fallback models.
pub const PRICE_BUCKET_SIZE: f64 = 5000.0;

/// Category pools are narrowed to products whose mean price lies within
/// [PRICE_BAND_LOWER, PRICE_BAND_UPPER] × target price, provided at least
/// MIN_BAND_PRODUCTS products qualify.
pub const PRICE_BAND_LOWER: f64 = 0.6;
pub const PRICE_BAND_UPPER: f64 = 1.4;
pub const MIN_BAND_PRODUCTS: usize = 2;

/// Forward day offsets for which prices are projected.
pub const PROJECTION_HORIZONS: &[u32] = &[7, 15, 30, 60, 90, 120, 150, 180, 210];

/// Per-request timeout for storefront scraping (seconds).
pub const SCRAPE_TIMEOUT_SECS: u64 = 10;

/// Coefficient-of-variation thresholds (percent) for volatility classification.
pub mod volatility_thresholds {
    pub const LOW_MAX: f64 = 10.0;
    pub const MEDIUM_MAX: f64 = 25.0;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    /// CSV file auto-loaded on startup when present (DATA_PATH)
    pub data_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            data_path: std::env::var("DATA_PATH").unwrap_or_else(|_| "data.csv".to_string()),
        })
    }
}
