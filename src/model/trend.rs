use std::sync::Arc;

use crate::config::{FALLBACK_CONFIDENCE, PROJECTION_HORIZONS};
use crate::error::{AppError, Result};
use crate::types::Projections;

// ---------------------------------------------------------------------------
// TrainingSeries
// ---------------------------------------------------------------------------

/// The (day offset, price) series a model was fitted on, kept with the model
/// so statistics and reconciliation read the same data the fit saw.
#[derive(Debug, Clone)]
pub struct TrainingSeries {
    points: Vec<(i64, f64)>,
    mean_price: f64,
    last_day: i64,
}

impl TrainingSeries {
    fn new(points: Vec<(i64, f64)>) -> Self {
        let mean_price = points.iter().map(|(_, p)| p).sum::<f64>() / points.len() as f64;
        let last_day = points.iter().map(|(d, _)| *d).max().unwrap_or(0);
        Self { points, mean_price, last_day }
    }

    pub fn points(&self) -> &[(i64, f64)] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|(_, p)| *p).collect()
    }

    pub fn mean_price(&self) -> f64 {
        self.mean_price
    }

    /// "Today" relative to history: the maximum day offset in the series.
    pub fn last_day(&self) -> i64 {
        self.last_day
    }
}

// ---------------------------------------------------------------------------
// TrendModel
// ---------------------------------------------------------------------------

/// One least-squares regression of price on day offset. Immutable once
/// trained; dropped only when the owning snapshot is replaced.
#[derive(Debug)]
pub struct TrendModel {
    key: String,
    slope: f64,
    intercept: f64,
    /// None when the fit is degenerate (constant prices), in which case
    /// `confidence` falls back to a fixed default.
    r2: Option<f64>,
    training: TrainingSeries,
}

impl TrendModel {
    /// Fit a model over `points`, requiring at least `min_rows` of them.
    pub fn fit(key: impl Into<String>, points: &[(i64, f64)], min_rows: usize) -> Result<Arc<Self>> {
        let key = key.into();
        if points.is_empty() || points.len() < min_rows {
            return Err(AppError::InsufficientData {
                rows: points.len(),
                min: min_rows.max(1),
                key,
            });
        }

        let n = points.len() as f64;
        let x_mean = points.iter().map(|(d, _)| *d as f64).sum::<f64>() / n;
        let y_mean = points.iter().map(|(_, p)| *p).sum::<f64>() / n;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for &(day, price) in points {
            let dx = day as f64 - x_mean;
            sxy += dx * (price - y_mean);
            sxx += dx * dx;
        }
        let slope = if sxx != 0.0 { sxy / sxx } else { 0.0 };
        let intercept = y_mean - slope * x_mean;

        let ss_res: f64 = points
            .iter()
            .map(|&(day, price)| {
                let fitted = slope * day as f64 + intercept;
                (price - fitted) * (price - fitted)
            })
            .sum();
        let ss_tot: f64 = points.iter().map(|&(_, p)| (p - y_mean) * (p - y_mean)).sum();
        let r2 = if ss_tot > 0.0 { Some(1.0 - ss_res / ss_tot) } else { None };

        Ok(Arc::new(Self { key, slope, intercept, r2, training: TrainingSeries::new(points.to_vec()) }))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn r2(&self) -> Option<f64> {
        self.r2
    }

    /// The model's R², or the fixed fallback when the fit was degenerate.
    pub fn confidence(&self) -> f64 {
        self.r2.unwrap_or(FALLBACK_CONFIDENCE)
    }

    pub fn training(&self) -> &TrainingSeries {
        &self.training
    }

    pub fn predicted_at(&self, day: i64) -> f64 {
        self.slope * day as f64 + self.intercept
    }

    /// Project prices for the default horizons ahead of the training data's
    /// last day. Negative raw projections clamp to zero.
    pub fn project(&self) -> Projections {
        self.project_from(self.training.last_day)
    }

    pub fn project_from(&self, current_day: i64) -> Projections {
        Projections::new(
            PROJECTION_HORIZONS
                .iter()
                .map(|&h| (h, self.predicted_at(current_day + h as i64).max(0.0)))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn line(slope: f64, intercept: f64, days: std::ops::Range<i64>) -> Vec<(i64, f64)> {
        days.map(|d| (d, slope * d as f64 + intercept)).collect()
    }

    #[test]
    fn recovers_exact_linear_trend() {
        let model = TrendModel::fit("test", &line(-2.0, 100.0, 0..10), 5).unwrap();
        assert_eq!(model.key(), "test");
        assert!((model.slope() + 2.0).abs() < 1e-9);
        assert!((model.predicted_at(0) - 100.0).abs() < 1e-9);
        assert_eq!(model.r2(), Some(1.0));
        assert_eq!(model.training().points().len(), 10);
    }

    #[test]
    fn projections_are_never_negative() {
        // Steep decline: raw projection at 210 days is far below zero.
        let model = TrendModel::fit("test", &line(-10.0, 50.0, 0..10), 5).unwrap();
        let projections = model.project();
        for (_, price) in projections.iter() {
            assert!(price >= 0.0, "projection must be clamped at zero, got {price}");
        }
        assert_eq!(projections.get(210), Some(0.0));
    }

    #[test]
    fn projects_from_last_training_day() {
        let model = TrendModel::fit("test", &line(1.0, 0.0, 0..10), 5).unwrap();
        // Last training day is 9, so the 7-day horizon lands on day 16.
        assert_eq!(model.project().get(7), Some(16.0));
    }

    #[test]
    fn constant_series_has_degenerate_r2() {
        let points: Vec<(i64, f64)> = (0..10).map(|d| (d, 42.0)).collect();
        let model = TrendModel::fit("test", &points, 5).unwrap();
        assert_eq!(model.r2(), None);
        assert!((model.confidence() - 0.70).abs() < 1e-9);
        assert!((model.predicted_at(100) - 42.0).abs() < 1e-9);
    }

    #[test]
    fn too_few_rows_is_insufficient_data() {
        let result = TrendModel::fit("test", &line(1.0, 0.0, 0..3), 5);
        assert!(matches!(result, Err(crate::error::AppError::InsufficientData { rows: 3, min: 5, .. })));
    }

    #[test]
    fn projection_horizon_count_matches_config() {
        let model = TrendModel::fit("test", &line(0.5, 10.0, 0..10), 5).unwrap();
        let projections = model.project();
        assert!(!projections.is_empty());
        assert_eq!(projections.len(), crate::config::PROJECTION_HORIZONS.len());
    }
}
