use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::image::placeholder_image_url;
use crate::dataset::Dataset;
use crate::engine::Engine;
use crate::error::AppError;
use crate::matcher;
use crate::scrape::parse::infer_name_from_url;
use crate::scrape::{ScrapedDetails, Scraper};
use crate::types::{
    Category, MarketplacePrices, ModelSource, PriceStatistics, ProductQuery, Projections,
    Recommendation, Source,
};

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<Engine>,
    pub scraper: Scraper,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/products", get(products))
        .route("/api/initialize", post(initialize))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub product_name: String,
    pub source: Option<String>,
    pub url: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub product: ProductBlock,
    pub predictions: Projections,
    pub recommendation: Recommendation,
    pub statistics: PriceStatistics,
}

#[derive(Serialize)]
pub struct ProductBlock {
    pub name: String,
    pub matched_product: String,
    pub current_price: f64,
    pub source: Source,
    pub category: Category,
    pub image_url: String,
    pub model_source: ModelSource,
    pub price_scraped: bool,
    pub marketplace_prices: MarketplacePrices,
    pub similar_products: Vec<String>,
}

#[derive(Deserialize)]
pub struct InitializeRequest {
    pub filepath: Option<String>,
}

#[derive(Serialize)]
pub struct InitializeResponse {
    pub success: bool,
    pub message: String,
    pub records: usize,
    pub unique_products: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub models_loaded: usize,
    pub data_loaded: bool,
    pub scraping_enabled: bool,
}

#[derive(Serialize)]
pub struct ProductEntry {
    pub name: String,
    pub data_points: usize,
}

#[derive(Serialize)]
pub struct ProductsResponse {
    pub total_products: usize,
    pub products: Vec<ProductEntry>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        models_loaded: state.engine.models_trained(),
        data_loaded: state.engine.is_initialized(),
        scraping_enabled: true,
    })
}

/// Full analysis: scrape whatever the URL and marketplaces will give us,
/// then hand the assembled query to the engine.
async fn analyze(
    State(state): State<ApiState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if req.product_name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Product name is required".to_string()));
    }
    let source = Source::parse(req.source.as_deref().unwrap_or("unknown"));
    let url = req.url.as_deref().filter(|u| !u.is_empty());
    info!(product = %req.product_name, %source, "Analyzing product");

    let mut display_name = req.product_name.clone();
    let mut scraped = ScrapedDetails::default();
    let mut marketplace = MarketplacePrices::default();

    if let Some(url) = url {
        if source.is_storefront() {
            scraped = state.scraper.scrape_details(url, source).await;
            match (source, scraped.price) {
                (Source::Amazon, Some(price)) => marketplace.amazon = Some(price),
                (Source::Flipkart, Some(price)) => marketplace.flipkart = Some(price),
                _ => {}
            }
            // Prefer the scraped title; failing that, rescue placeholder
            // names from the URL slug.
            if let Some(title) = &scraped.title {
                display_name = title.clone();
            } else if matcher::is_generic_name(&display_name) {
                if let Some(inferred) = infer_name_from_url(url, source) {
                    info!(name = %inferred, "Inferred product name from URL");
                    display_name = inferred;
                }
            }
        }
    }

    // Fill in whichever marketplace prices a page scrape didn't cover.
    match source {
        Source::Query => {
            marketplace = state.scraper.marketplace_prices(&display_name).await;
        }
        Source::Amazon if marketplace.flipkart.is_none() => {
            marketplace.flipkart = state.scraper.search_price(&display_name, Source::Flipkart).await;
        }
        Source::Flipkart if marketplace.amazon.is_none() => {
            marketplace.amazon = state.scraper.search_price(&display_name, Source::Amazon).await;
        }
        _ => {}
    }

    let query = ProductQuery {
        name: display_name.clone(),
        source,
        url: url.map(|u| u.to_string()),
        scraped_price: scraped.price,
        marketplace_prices: marketplace,
    };
    let report = state.engine.analyze(&query)?;

    let image_url = scraped
        .image_url
        .unwrap_or_else(|| placeholder_image_url(&display_name, source));

    Ok(Json(AnalyzeResponse {
        success: true,
        product: ProductBlock {
            name: display_name,
            matched_product: report.matched_product,
            current_price: report.current_price,
            source,
            category: report.category,
            image_url,
            model_source: report.model_source,
            price_scraped: scraped.price.is_some(),
            marketplace_prices: marketplace,
            similar_products: report.similar_products,
        },
        predictions: report.predictions,
        recommendation: report.recommendation,
        statistics: report.statistics,
    }))
}

/// The 50 most-observed catalog products.
async fn products(State(state): State<ApiState>) -> Result<Json<ProductsResponse>, AppError> {
    let counts = state.engine.products()?;
    let total_products = counts.len();
    Ok(Json(ProductsResponse {
        total_products,
        products: counts
            .into_iter()
            .take(50)
            .map(|(name, data_points)| ProductEntry { name, data_points })
            .collect(),
    }))
}

/// Load (or reload) the historical dataset, dropping all cached models.
async fn initialize(
    State(state): State<ApiState>,
    Json(req): Json<InitializeRequest>,
) -> Result<Json<InitializeResponse>, AppError> {
    let filepath = req.filepath.unwrap_or_else(|| "data.csv".to_string());
    info!(%filepath, "Initializing dataset");

    let dataset = Dataset::load(&filepath)?;
    state.engine.reinitialize(dataset);
    let (records, unique_products) = state.engine.dataset_summary()?;

    Ok(Json(InitializeResponse {
        success: true,
        message: "System initialized successfully".to_string(),
        records,
        unique_products,
    }))
}
