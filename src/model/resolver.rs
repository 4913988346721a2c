use std::sync::Arc;

use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{AppError, Result};
use crate::matcher::category_of;
use crate::model::store::ModelStore;
use crate::model::trend::TrendModel;
use crate::types::{MatchCandidate, ModelSource, ProductQuery};

/// The outcome of model resolution: which model to project with, the name
/// reported as the match, and the tier that produced it.
pub struct Resolved {
    pub model: Arc<TrendModel>,
    pub matched_product: String,
    pub model_source: ModelSource,
}

pub struct ResolveContext<'a> {
    pub dataset: &'a Dataset,
    pub store: &'a ModelStore,
    pub query: &'a ProductQuery,
    pub candidates: &'a [MatchCandidate],
}

/// One fallback tier. `Ok(None)` means "not applicable here, try the next
/// tier"; a series that is too small for this tier also answers `Ok(None)`.
pub trait ResolverStrategy {
    fn name(&self) -> &'static str;
    fn try_resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<Resolved>>;
}

/// Tier 1: the top-ranked text match from the similarity scorer.
pub struct TextMatch;

impl ResolverStrategy for TextMatch {
    fn name(&self) -> &'static str {
        "text_match"
    }

    fn try_resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<Resolved>> {
        let Some(top) = ctx.candidates.first() else {
            return Ok(None);
        };
        match ctx.store.product_model(ctx.dataset, &top.product_name) {
            Ok(model) => Ok(Some(Resolved {
                model,
                matched_product: top.product_name.clone(),
                model_source: ModelSource::SimilarProduct,
            })),
            Err(AppError::InsufficientData { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Tier 2: the catalog product whose mean price is closest to the target.
pub struct NearestPrice;

impl ResolverStrategy for NearestPrice {
    fn name(&self) -> &'static str {
        "nearest_price"
    }

    fn try_resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<Resolved>> {
        let Some(target) = ctx.query.target_price() else {
            return Ok(None);
        };
        let Some(nearest) = ctx.dataset.nearest_product_by_price(target) else {
            return Ok(None);
        };
        let nearest = nearest.to_string();
        match ctx.store.product_model(ctx.dataset, &nearest) {
            Ok(model) => Ok(Some(Resolved {
                model,
                matched_product: nearest,
                model_source: ModelSource::PriceNearestProduct,
            })),
            Err(AppError::InsufficientData { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Tier 3: a pooled category model, price-bucketed when a target price is
/// known. Never passes: its failures mean the dataset itself is unusable.
pub struct CategoryBucket;

impl ResolverStrategy for CategoryBucket {
    fn name(&self) -> &'static str {
        "category_bucket"
    }

    fn try_resolve(&self, ctx: &ResolveContext<'_>) -> Result<Option<Resolved>> {
        let category = category_of(&ctx.query.name);
        let target = ctx.query.target_price();
        let model = ctx.store.category_model(ctx.dataset, category, target)?;
        let (matched_product, model_source) = if target.is_some() {
            (
                format!("{} Category (price-bucketed)", category.title()),
                ModelSource::CategoryPriceBucket,
            )
        } else {
            (format!("{} Category", category.title()), ModelSource::Category)
        };
        Ok(Some(Resolved { model, matched_product, model_source }))
    }
}

/// Walk the fallback chain in order; the first tier to produce a model wins.
pub fn resolve(ctx: &ResolveContext<'_>) -> Result<Resolved> {
    let strategies: &[&dyn ResolverStrategy] = &[&TextMatch, &NearestPrice, &CategoryBucket];
    for strategy in strategies {
        if let Some(resolved) = strategy.try_resolve(ctx)? {
            debug!(
                strategy = strategy.name(),
                matched = %resolved.matched_product,
                source = %resolved.model_source,
                "Model resolved"
            );
            return Ok(resolved);
        }
    }
    // Reachable only when every tier passed, which requires an empty catalog.
    Err(AppError::EmptyDataset)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
