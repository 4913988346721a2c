use tracing::debug;

use crate::error::{AppError, Result};
use crate::types::{ProductQuery, Projections};

/// Where the reconciled current price came from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBasis {
    Scraped,
    Marketplace,
    HistoricalMean,
}

#[derive(Debug, Clone, Copy)]
pub struct CurrentPrice {
    pub value: f64,
    pub basis: PriceBasis,
}

/// Pick the current price: explicit scraped price, else the mean of observed
/// marketplace prices, else the historical mean of the training series.
pub fn current_price(query: &ProductQuery, historical_mean: f64) -> Result<CurrentPrice> {
    if let Some(price) = query.scraped_price.filter(|p| *p > 0.0) {
        return Ok(CurrentPrice { value: price, basis: PriceBasis::Scraped });
    }
    if let Some(mean) = query.marketplace_prices.mean() {
        return Ok(CurrentPrice { value: mean, basis: PriceBasis::Marketplace });
    }
    if historical_mean > 0.0 {
        return Ok(CurrentPrice { value: historical_mean, basis: PriceBasis::HistoricalMean });
    }
    Err(AppError::MissingPriceSignal)
}

/// Rescale projections onto the live price level.
///
/// The trend model was trained on a proxy product whose absolute price level
/// may be far from the query product's; a scraped price anchors the level, so
/// every projection is multiplied by `current / historical_mean`, preserving
/// the relative trend shape. Without a scraped price the projections pass
/// through unscaled.
pub fn reconcile(
    projections: Projections,
    current: CurrentPrice,
    historical_mean: f64,
) -> Projections {
    if current.basis != PriceBasis::Scraped || historical_mean <= 0.0 {
        return projections;
    }
    let factor = current.value / historical_mean;
    debug!(factor, "Rescaling projections to scraped price level");
    projections.scaled(factor)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarketplacePrices;

    fn query(scraped: Option<f64>, amazon: Option<f64>, flipkart: Option<f64>) -> ProductQuery {
        ProductQuery {
            name: "test".to_string(),
            scraped_price: scraped,
            marketplace_prices: MarketplacePrices { amazon, flipkart },
            ..Default::default()
        }
    }

    #[test]
    fn scraped_price_has_top_priority() {
        let current = current_price(&query(Some(500.0), Some(800.0), None), 1000.0).unwrap();
        assert_eq!(current.basis, PriceBasis::Scraped);
        assert_eq!(current.value, 500.0);
    }

    #[test]
    fn marketplace_mean_is_second_choice() {
        let current = current_price(&query(None, Some(800.0), Some(1000.0)), 1200.0).unwrap();
        assert_eq!(current.basis, PriceBasis::Marketplace);
        assert_eq!(current.value, 900.0);
    }

    #[test]
    fn historical_mean_is_last_resort() {
        let current = current_price(&query(None, None, None), 1200.0).unwrap();
        assert_eq!(current.basis, PriceBasis::HistoricalMean);
        assert_eq!(current.value, 1200.0);
    }

    #[test]
    fn nothing_at_all_is_missing_price_signal() {
        let result = current_price(&query(None, None, None), 0.0);
        assert!(matches!(result, Err(AppError::MissingPriceSignal)));
    }

    #[test]
    fn scraped_price_rescales_projections() {
        let projections = Projections::new(vec![(7, 100.0), (30, 80.0)]);
        let current = CurrentPrice { value: 500.0, basis: PriceBasis::Scraped };
        let scaled = reconcile(projections, current, 100.0);
        assert_eq!(scaled.get(7), Some(500.0));
        assert_eq!(scaled.get(30), Some(400.0));
    }

    #[test]
    fn marketplace_price_does_not_rescale() {
        let projections = Projections::new(vec![(7, 100.0)]);
        let current = CurrentPrice { value: 500.0, basis: PriceBasis::Marketplace };
        let untouched = reconcile(projections.clone(), current, 100.0);
        assert_eq!(untouched, projections);
    }
}
