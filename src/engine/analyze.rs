use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::config::{MATCHER_TOP_N, MIN_MATCH_SCORE, REPORTED_SIMILAR, WAIT_THRESHOLD};
use crate::dataset::Dataset;
use crate::engine::{decision, reconcile, stats};
use crate::error::{AppError, Result};
use crate::matcher::{category_of, find_similar};
use crate::model::resolver::{self, ResolveContext};
use crate::model::store::ModelStore;
use crate::types::{AnalysisReport, ProductQuery};

/// One immutable dataset snapshot together with the model caches trained
/// against it. Replaced wholesale on reinitialization so a request can never
/// read a model trained on a dataset that was since swapped out.
struct EngineState {
    dataset: Dataset,
    models: ModelStore,
}

/// The matching-and-prediction core. Requests clone the current snapshot
/// once at entry and run to completion against it.
pub struct Engine {
    state: RwLock<Option<Arc<EngineState>>>,
}

impl Engine {
    pub fn new() -> Self {
        Self { state: RwLock::new(None) }
    }

    /// Install a new dataset and drop every cached model with the old one.
    pub fn reinitialize(&self, dataset: Dataset) {
        let state = Arc::new(EngineState { dataset, models: ModelStore::new() });
        *self.state.write().expect("engine state lock poisoned") = Some(state);
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().expect("engine state lock poisoned").is_some()
    }

    /// Models trained so far in the current snapshot; 0 before initialization.
    pub fn models_trained(&self) -> usize {
        self.state
            .read()
            .expect("engine state lock poisoned")
            .as_ref()
            .map_or(0, |s| s.models.models_trained())
    }

    /// (total rows, distinct products) of the current dataset.
    pub fn dataset_summary(&self) -> Result<(usize, usize)> {
        let state = self.snapshot()?;
        Ok((state.dataset.len(), state.dataset.product_count()))
    }

    /// (product name, observation count) pairs, most-observed first.
    pub fn products(&self) -> Result<Vec<(String, usize)>> {
        let state = self.snapshot()?;
        Ok(state.dataset.observation_counts())
    }

    fn snapshot(&self) -> Result<Arc<EngineState>> {
        self.state
            .read()
            .expect("engine state lock poisoned")
            .clone()
            .ok_or(AppError::DatasetNotInitialized)
    }

    /// Run the full matching-and-prediction pipeline for one query.
    pub fn analyze(&self, query: &ProductQuery) -> Result<AnalysisReport> {
        let state = self.snapshot()?;
        debug!(name = %query.name, source = %query.source, url = ?query.url, "Resolving query");

        let candidates = find_similar(&query.name, &state.dataset, MATCHER_TOP_N, MIN_MATCH_SCORE);
        let resolved = resolver::resolve(&ResolveContext {
            dataset: &state.dataset,
            store: &state.models,
            query,
            candidates: &candidates,
        })?;

        let historical_mean = resolved.model.training().mean_price();
        let current = reconcile::current_price(query, historical_mean)?;
        let projections = reconcile::reconcile(resolved.model.project(), current, historical_mean);

        let recommendation = decision::decide(
            current.value,
            &projections,
            WAIT_THRESHOLD,
            resolved.model.confidence(),
        );
        let statistics = stats::build_statistics(&resolved.model);

        info!(
            query = %query.name,
            matched = %resolved.matched_product,
            source = %resolved.model_source,
            current_price = current.value,
            action = %recommendation.action,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            matched_product: resolved.matched_product,
            model_source: resolved.model_source,
            category: category_of(&query.name),
            current_price: current.value,
            predictions: projections,
            recommendation,
            statistics,
            similar_products: candidates
                .into_iter()
                .take(REPORTED_SIMILAR)
                .map(|c| c.product_name)
                .collect(),
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
