use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::types::PriceObservation;

/// Raw CSV row as exported by the retail dataset. Prices and dates are
/// validated during cleaning, not at deserialization time.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "InvoiceDate")]
    invoice_date: String,
    #[serde(rename = "UnitPrice")]
    unit_price: Option<f64>,
}

/// The cleaned, aggregated historical dataset: one row per (product, date)
/// with the mean price for that day, plus the indexes every resolver tier
/// needs. Immutable after construction; reinitialization builds a fresh
/// snapshot rather than mutating in place.
#[derive(Debug)]
pub struct Dataset {
    /// Aggregated rows sorted by (product_name, date).
    rows: Vec<PriceObservation>,
    /// Distinct product names in row order: the catalog enumeration order
    /// used for match-score tie-breaking.
    products: Vec<String>,
    /// product name → indexes into `rows`, date-ascending.
    by_product: HashMap<String, Vec<usize>>,
    /// product name → mean of that product's aggregated prices.
    means: HashMap<String, f64>,
    first_date: NaiveDate,
}

impl Dataset {
    /// Load and clean a CSV file: drop rows with missing fields or
    /// non-positive prices, compute day offsets from the global minimum
    /// date, and aggregate duplicate (product, date) pairs by mean price.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let mut records = Vec::new();
        let mut dropped = 0usize;

        for row in reader.deserialize::<RawRow>() {
            let row = row?;
            let name = row.description.trim();
            let price = match row.unit_price {
                Some(p) if p > 0.0 => p,
                _ => {
                    dropped += 1;
                    continue;
                }
            };
            let Some(date) = parse_date(&row.invoice_date) else {
                dropped += 1;
                continue;
            };
            if name.is_empty() {
                dropped += 1;
                continue;
            }
            records.push((name.to_string(), date, price));
        }

        if dropped > 0 {
            debug!("Dropped {dropped} rows during cleaning");
        }

        let dataset = Self::from_records(records)?;
        info!(
            "Dataset loaded: {} rows, {} products, first date {}",
            dataset.len(),
            dataset.product_count(),
            dataset.first_date
        );
        Ok(dataset)
    }

    /// Build a dataset from already-cleaned (name, date, price) records.
    /// Rejects non-positive prices, aggregates by (product, date), and
    /// computes day offsets from the global minimum date.
    pub fn from_records(records: Vec<(String, NaiveDate, f64)>) -> Result<Self> {
        let records: Vec<_> = records
            .into_iter()
            .filter(|(name, _, price)| !name.is_empty() && *price > 0.0)
            .collect();

        let first_date = records
            .iter()
            .map(|(_, date, _)| *date)
            .min()
            .ok_or(AppError::EmptyDataset)?;

        // Mean price per (product, date).
        let mut grouped: HashMap<(String, NaiveDate), (f64, usize)> = HashMap::new();
        for (name, date, price) in records {
            let entry = grouped.entry((name, date)).or_insert((0.0, 0));
            entry.0 += price;
            entry.1 += 1;
        }

        let mut rows: Vec<PriceObservation> = grouped
            .into_iter()
            .map(|((product_name, date), (sum, count))| PriceObservation {
                day_offset: (date - first_date).num_days(),
                product_name,
                date,
                price: sum / count as f64,
            })
            .collect();
        rows.sort_by(|a, b| a.product_name.cmp(&b.product_name).then(a.date.cmp(&b.date)));

        let mut products = Vec::new();
        let mut by_product: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            let indexes = by_product.entry(row.product_name.clone()).or_default();
            if indexes.is_empty() {
                products.push(row.product_name.clone());
            }
            indexes.push(idx);
        }

        let means = by_product
            .iter()
            .map(|(name, indexes)| {
                let sum: f64 = indexes.iter().map(|&i| rows[i].price).sum();
                (name.clone(), sum / indexes.len() as f64)
            })
            .collect();

        Ok(Self { rows, products, by_product, means, first_date })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn rows(&self) -> &[PriceObservation] {
        &self.rows
    }

    /// Distinct product names in catalog enumeration order.
    pub fn products(&self) -> &[String] {
        &self.products
    }

    pub fn first_date(&self) -> NaiveDate {
        self.first_date
    }

    /// (day_offset, price) pairs for one product, date-ascending.
    pub fn product_series(&self, name: &str) -> Vec<(i64, f64)> {
        self.by_product
            .get(name)
            .map(|indexes| {
                indexes
                    .iter()
                    .map(|&i| (self.rows[i].day_offset, self.rows[i].price))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn mean_price(&self, name: &str) -> Option<f64> {
        self.means.get(name).copied()
    }

    /// The product whose mean price is closest to `target` in absolute value.
    /// Ties keep the earlier product in catalog order.
    pub fn nearest_product_by_price(&self, target: f64) -> Option<&str> {
        if !(target > 0.0) {
            return None;
        }
        self.products
            .iter()
            .min_by(|a, b| {
                let da = (self.means[a.as_str()] - target).abs();
                let db = (self.means[b.as_str()] - target).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|s| s.as_str())
    }

    /// (product name, observation count) pairs, most-observed first.
    pub fn observation_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .products
            .iter()
            .map(|name| (name.clone(), self.by_product[name].len()))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

/// Accepts the timestamp formats seen in the retail exports.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    // Online-retail exports use m/d/yy h:mm.
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%m/%d/%Y %H:%M") {
        return Some(dt.date());
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
