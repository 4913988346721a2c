use crate::config::volatility_thresholds::{LOW_MAX, MEDIUM_MAX};
use crate::model::trend::TrendModel;
use crate::types::{PriceStatistics, Trend, Volatility};

/// Classify price volatility by coefficient of variation (percent).
pub fn volatility(prices: &[f64]) -> Volatility {
    if prices.len() < 2 {
        return Volatility::Unknown;
    }
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    if mean <= 0.0 {
        return Volatility::Unknown;
    }
    let variance = prices.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / prices.len() as f64;
    let cv = variance.sqrt() / mean * 100.0;

    if cv < LOW_MAX {
        Volatility::Low
    } else if cv < MEDIUM_MAX {
        Volatility::Medium
    } else {
        Volatility::High
    }
}

/// Summary statistics over the resolved model's training series.
pub fn build_statistics(model: &TrendModel) -> PriceStatistics {
    let prices = model.training().prices();
    let min_price = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max_price = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    PriceStatistics {
        avg_price: model.training().mean_price(),
        min_price,
        max_price,
        volatility: volatility(&prices),
        r2_score: model.confidence(),
        trend: if model.slope() < 0.0 { Trend::Decreasing } else { Trend::Increasing },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_prices_are_low_volatility() {
        assert_eq!(volatility(&[100.0, 100.0, 100.0]), Volatility::Low);
    }

    #[test]
    fn wide_swings_are_high_volatility() {
        assert_eq!(volatility(&[100.0, 150.0, 50.0]), Volatility::High);
    }

    #[test]
    fn moderate_swings_are_medium_volatility() {
        // cv is roughly 14%, between the low and medium cutoffs.
        assert_eq!(volatility(&[100.0, 120.0, 90.0, 110.0, 80.0]), Volatility::Medium);
    }

    #[test]
    fn short_series_is_unknown() {
        assert_eq!(volatility(&[100.0]), Volatility::Unknown);
        assert_eq!(volatility(&[]), Volatility::Unknown);
    }

    #[test]
    fn statistics_summarize_training_series() {
        let points: Vec<(i64, f64)> = vec![(0, 120.0), (1, 110.0), (2, 100.0), (3, 90.0), (4, 80.0)];
        let model = TrendModel::fit("test", &points, 5).unwrap();
        let stats = build_statistics(&model);

        assert!((stats.avg_price - 100.0).abs() < 1e-9);
        assert_eq!(stats.min_price, 80.0);
        assert_eq!(stats.max_price, 120.0);
        assert_eq!(stats.trend, Trend::Decreasing);
        assert!((stats.r2_score - 1.0).abs() < 1e-9);
    }
}
