use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::config::{
    MIN_BAND_PRODUCTS, MIN_POOL_ROWS, MIN_PRODUCT_ROWS, PRICE_BAND_LOWER, PRICE_BAND_UPPER,
    PRICE_BUCKET_SIZE,
};
use crate::dataset::Dataset;
use crate::error::{AppError, Result};
use crate::matcher::category_of;
use crate::model::trend::TrendModel;
use crate::types::Category;

/// Lazily trained trend models, keyed by exact product name or by category
/// bucket. Entries are never evicted: the catalog is bounded, so unbounded
/// growth is an accepted tradeoff. A cache miss always trains synchronously;
/// two requests racing on the same key may both train, and the first insert
/// wins; training is deterministic, so the loser's work is merely wasted.
pub struct ModelStore {
    product_models: DashMap<String, Arc<TrendModel>>,
    category_models: DashMap<String, Arc<TrendModel>>,
}

impl ModelStore {
    pub fn new() -> Self {
        Self { product_models: DashMap::new(), category_models: DashMap::new() }
    }

    /// Total models trained so far, across both caches.
    pub fn models_trained(&self) -> usize {
        self.product_models.len() + self.category_models.len()
    }

    /// Get-or-train the model for an exact catalog product name.
    pub fn product_model(&self, dataset: &Dataset, name: &str) -> Result<Arc<TrendModel>> {
        if let Some(model) = self.product_models.get(name) {
            return Ok(Arc::clone(&model));
        }
        let series = dataset.product_series(name);
        let model = TrendModel::fit(name, &series, MIN_PRODUCT_ROWS)?;
        debug!(key = name, rows = series.len(), "Trained product model");
        let entry = self.product_models.entry(name.to_string()).or_insert(model);
        Ok(Arc::clone(&entry))
    }

    /// Cache key for the category tier: `category` when no price is known,
    /// `category:bucket` otherwise.
    pub fn category_key(category: Category, target_price: Option<f64>) -> String {
        match target_price.filter(|p| *p > 0.0) {
            Some(price) => format!("{category}:{}", (price / PRICE_BUCKET_SIZE).floor() as i64),
            None => category.to_string(),
        }
    }

    /// Get-or-train a pooled category model, optionally narrowed to the
    /// price band around `target_price`.
    pub fn category_model(
        &self,
        dataset: &Dataset,
        category: Category,
        target_price: Option<f64>,
    ) -> Result<Arc<TrendModel>> {
        let key = Self::category_key(category, target_price);
        if let Some(model) = self.category_models.get(&key) {
            return Ok(Arc::clone(&model));
        }
        let series = pooled_series(dataset, category, target_price)?;
        let model = TrendModel::fit(&key, &series, 1)?;
        debug!(key = %key, rows = series.len(), "Trained category model");
        let entry = self.category_models.entry(key).or_insert(model);
        Ok(Arc::clone(&entry))
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the pooled (day, mean price) series for a category.
///
/// Products whose mean price lies within the band around the target are
/// preferred when at least MIN_BAND_PRODUCTS qualify; a pool below
/// MIN_POOL_ROWS falls back to the entire dataset. Rows are aggregated by
/// date across the pool before fitting.
fn pooled_series(
    dataset: &Dataset,
    category: Category,
    target_price: Option<f64>,
) -> Result<Vec<(i64, f64)>> {
    let mut pool: HashSet<&str> = dataset
        .products()
        .iter()
        .filter(|name| category_of(name) == category)
        .map(|name| name.as_str())
        .collect();

    if let Some(target) = target_price.filter(|p| *p > 0.0) {
        let lower = target * PRICE_BAND_LOWER;
        let upper = target * PRICE_BAND_UPPER;
        let banded: HashSet<&str> = pool
            .iter()
            .copied()
            .filter(|name| {
                dataset
                    .mean_price(name)
                    .is_some_and(|mean| mean >= lower && mean <= upper)
            })
            .collect();
        if banded.len() >= MIN_BAND_PRODUCTS {
            pool = banded;
        }
    }

    let mut rows: Vec<(i64, f64)> = dataset
        .rows()
        .iter()
        .filter(|row| pool.contains(row.product_name.as_str()))
        .map(|row| (row.day_offset, row.price))
        .collect();

    if rows.len() < MIN_POOL_ROWS {
        rows = dataset.rows().iter().map(|row| (row.day_offset, row.price)).collect();
    }
    if rows.len() < MIN_POOL_ROWS {
        // Even the full dataset is too small for the final tier.
        return Err(AppError::EmptyDataset);
    }

    let mut by_day: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for (day, price) in rows {
        let entry = by_day.entry(day).or_insert((0.0, 0));
        entry.0 += price;
        entry.1 += 1;
    }

    Ok(by_day.into_iter().map(|(day, (sum, count))| (day, sum / count as f64)).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series(name: &str, base: f64, days: u32) -> Vec<(String, NaiveDate, f64)> {
        (1..=days).map(|d| (name.to_string(), date(d), base + d as f64)).collect()
    }

    #[test]
    fn product_model_is_cached_by_identity() {
        let dataset = Dataset::from_records(series("Dell XPS 15 Laptop", 1000.0, 6)).unwrap();
        let store = ModelStore::new();

        let first = store.product_model(&dataset, "Dell XPS 15 Laptop").unwrap();
        let second = store.product_model(&dataset, "Dell XPS 15 Laptop").unwrap();
        assert!(Arc::ptr_eq(&first, &second), "second resolve must hit the cache");
        assert_eq!(store.models_trained(), 1);
    }

    #[test]
    fn short_series_does_not_train() {
        let dataset = Dataset::from_records(series("Dell XPS 15 Laptop", 1000.0, 3)).unwrap();
        let store = ModelStore::new();
        let result = store.product_model(&dataset, "Dell XPS 15 Laptop");
        assert!(matches!(result, Err(AppError::InsufficientData { .. })));
    }

    #[test]
    fn category_keys_encode_price_bucket() {
        assert_eq!(ModelStore::category_key(Category::Electronics, None), "electronics");
        assert_eq!(
            ModelStore::category_key(Category::Electronics, Some(12_000.0)),
            "electronics:2"
        );
        assert_eq!(ModelStore::category_key(Category::Fashion, Some(4_999.0)), "fashion:0");
    }

    #[test]
    fn price_band_restricts_pool_when_enough_products_qualify() {
        // Three laptops; target 1000 keeps the two with means in [600, 1400]
        // and excludes the 10k one.
        let mut records = series("Budget Laptop", 700.0, 6);
        records.extend(series("Value Laptop", 1300.0, 6));
        records.extend(series("Flagship Laptop", 10_000.0, 6));
        let dataset = Dataset::from_records(records).unwrap();

        let pooled = pooled_series(&dataset, Category::Electronics, Some(1000.0)).unwrap();
        let mean = pooled.iter().map(|(_, p)| p).sum::<f64>() / pooled.len() as f64;
        assert!(
            mean < 2000.0,
            "flagship prices must be excluded from the pooled series, mean={mean}"
        );
    }

    #[test]
    fn price_band_is_skipped_when_too_few_products_qualify() {
        // Only one laptop sits inside the band; the restriction is dropped
        // and the whole category pools together.
        let mut records = series("Budget Laptop", 700.0, 6);
        records.extend(series("Flagship Laptop", 10_000.0, 6));
        let dataset = Dataset::from_records(records).unwrap();

        let pooled = pooled_series(&dataset, Category::Electronics, Some(1000.0)).unwrap();
        let mean = pooled.iter().map(|(_, p)| p).sum::<f64>() / pooled.len() as f64;
        assert!(mean > 2000.0, "whole category should pool together, mean={mean}");
    }

    #[test]
    fn small_category_pool_falls_back_to_whole_dataset() {
        // Books has a single 4-row series; the pool is under MIN_POOL_ROWS so
        // the entire dataset (12 rows) trains the model instead.
        let mut records = series("Atomic Habits Book", 500.0, 4);
        records.extend(series("Dell XPS 15 Laptop", 80_000.0, 8));
        let dataset = Dataset::from_records(records).unwrap();

        let pooled = pooled_series(&dataset, Category::Books, None).unwrap();
        assert_eq!(pooled.len(), 8, "pool must cover every dataset date");
    }

    #[test]
    fn category_model_is_cached_per_bucket() {
        let dataset = Dataset::from_records(series("Dell XPS 15 Laptop", 1000.0, 12)).unwrap();
        let store = ModelStore::new();

        let a = store.category_model(&dataset, Category::Electronics, Some(1000.0)).unwrap();
        let b = store.category_model(&dataset, Category::Electronics, Some(1200.0)).unwrap();
        assert!(Arc::ptr_eq(&a, &b), "same bucket must share one model");

        let c = store.category_model(&dataset, Category::Electronics, Some(9000.0)).unwrap();
        assert!(!Arc::ptr_eq(&a, &c), "a different bucket trains its own model");
    }
}
