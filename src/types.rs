use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Historical observations
// ---------------------------------------------------------------------------

/// One cleaned, aggregated price record: the unit of history.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    pub product_name: String,
    pub date: NaiveDate,
    pub price: f64,
    /// Day offset from the global minimum date across the whole dataset,
    /// not per-product.
    pub day_offset: i64,
}

// ---------------------------------------------------------------------------
// Query inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Amazon,
    Flipkart,
    Myntra,
    Query,
    Unknown,
}

impl Source {
    pub fn parse(s: &str) -> Source {
        match s.to_lowercase().as_str() {
            "amazon" => Source::Amazon,
            "flipkart" => Source::Flipkart,
            "myntra" => Source::Myntra,
            "query" => Source::Query,
            _ => Source::Unknown,
        }
    }

    /// True for sources we can scrape a product page from.
    pub fn is_storefront(self) -> bool {
        matches!(self, Source::Amazon | Source::Flipkart | Source::Myntra)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Source::Amazon => "amazon",
            Source::Flipkart => "flipkart",
            Source::Myntra => "myntra",
            Source::Query => "query",
            Source::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Unknown
    }
}

/// Current prices observed on the two marketplaces we can search by name.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MarketplacePrices {
    pub amazon: Option<f64>,
    pub flipkart: Option<f64>,
}

impl MarketplacePrices {
    pub fn observed(&self) -> Vec<f64> {
        [self.amazon, self.flipkart]
            .into_iter()
            .flatten()
            .filter(|p| *p > 0.0)
            .collect()
    }

    pub fn mean(&self) -> Option<f64> {
        let observed = self.observed();
        if observed.is_empty() {
            return None;
        }
        Some(observed.iter().sum::<f64>() / observed.len() as f64)
    }
}

/// A fully assembled analysis query: the name to match, where it came from,
/// and whatever live price signal the scraping layer managed to observe.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub name: String,
    pub source: Source,
    pub url: Option<String>,
    pub scraped_price: Option<f64>,
    pub marketplace_prices: MarketplacePrices,
}

impl ProductQuery {
    /// Price used to drive the nearest-price and category-bucket fallbacks:
    /// scraped price first, else the mean of observed marketplace prices.
    pub fn target_price(&self) -> Option<f64> {
        self.scraped_price
            .filter(|p| *p > 0.0)
            .or_else(|| self.marketplace_prices.mean())
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Fashion,
    Home,
    Books,
    Sports,
    General,
}

impl Category {
    /// Display label used when a category pool stands in for a real product,
    /// e.g. "Electronics Category".
    pub fn title(self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Fashion => "Fashion",
            Category::Home => "Home",
            Category::Books => "Books",
            Category::Sports => "Sports",
            Category::General => "General",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Electronics => "electronics",
            Category::Fashion => "fashion",
            Category::Home => "home",
            Category::Books => "books",
            Category::Sports => "sports",
            Category::General => "general",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Ephemeral per-query match result, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub product_name: String,
    pub score: f64,
}

/// Which fallback tier produced the trend model used for an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    /// Tier 1: a text-similar catalog product's model.
    SimilarProduct,
    /// Tier 2: the catalog product whose mean price is closest to the target.
    PriceNearestProduct,
    /// Tier 3 with a known target price: category pool keyed by price bucket.
    CategoryPriceBucket,
    /// Tier 3 without a price signal: plain category pool.
    Category,
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModelSource::SimilarProduct => "similar_product",
            ModelSource::PriceNearestProduct => "price_nearest_product",
            ModelSource::CategoryPriceBucket => "category_price_bucket",
            ModelSource::Category => "category",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// Projected prices keyed by forward horizon, kept in horizon-ascending
/// order. Serializes as `{"7_days": 123.0, ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Projections {
    entries: Vec<(u32, f64)>,
}

impl Projections {
    pub fn new(entries: Vec<(u32, f64)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, days: u32) -> Option<f64> {
        self.entries.iter().find(|(d, _)| *d == days).map(|(_, p)| *p)
    }

    /// Multiply every projected price by `factor` (price-scale reconciliation).
    pub fn scaled(mut self, factor: f64) -> Self {
        for (_, price) in &mut self.entries {
            *price *= factor;
        }
        self
    }
}

impl Serialize for Projections {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(days, price)| (format!("{days}_days"), price)))
    }
}

// ---------------------------------------------------------------------------
// Recommendation & statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    BuyNow,
    Wait,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::BuyNow => write!(f, "BUY_NOW"),
            Action::Wait => write!(f, "WAIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recommendation {
    pub action: Action,
    /// Largest projected drop below the current price, clamped at zero.
    pub savings: f64,
    /// Horizon of the largest drop; only reported when action is WAIT.
    pub best_time_days: Option<u32>,
    /// Resolved model's R², or the fallback when the fit is degenerate.
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Volatility {
    Low,
    Medium,
    High,
    Unknown,
}

impl std::fmt::Display for Volatility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Volatility::Low => "Low",
            Volatility::Medium => "Medium",
            Volatility::High => "High",
            Volatility::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceStatistics {
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub volatility: Volatility,
    pub r2_score: f64,
    pub trend: Trend,
}

// ---------------------------------------------------------------------------
// Analysis output
// ---------------------------------------------------------------------------

/// Everything the core engine derives for one query. The API layer wraps
/// this with scraping-side extras (display name, image, marketplace prices).
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub matched_product: String,
    pub model_source: ModelSource,
    pub category: Category,
    pub current_price: f64,
    pub predictions: Projections,
    pub recommendation: Recommendation,
    pub statistics: PriceStatistics,
    pub similar_products: Vec<String>,
}
