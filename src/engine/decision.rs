use crate::types::{Action, Projections, Recommendation};

/// Convert a price trajectory into a buy/wait call.
///
/// WAIT requires some horizon to undercut the current price by more than
/// `threshold` as a fraction, and the best saving to be positive; the best
/// horizon is the first maximum in horizon-ascending order.
pub fn decide(
    current_price: f64,
    projections: &Projections,
    threshold: f64,
    confidence: f64,
) -> Recommendation {
    let mut should_wait = false;
    let mut max_savings = 0.0_f64;
    let mut best_time: Option<u32> = None;

    for (days, projected) in projections.iter() {
        let diff = current_price - projected;
        if diff > max_savings {
            max_savings = diff;
            best_time = Some(days);
        }
        if diff / current_price > threshold {
            should_wait = true;
        }
    }

    let action = if should_wait && max_savings > 0.0 { Action::Wait } else { Action::BuyNow };
    Recommendation {
        action,
        savings: max_savings.max(0.0),
        best_time_days: if action == Action::Wait { best_time } else { None },
        confidence,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WAIT_THRESHOLD;

    #[test]
    fn deep_drop_triggers_wait() {
        let projections = Projections::new(vec![(30, 900.0)]);
        let rec = decide(1000.0, &projections, WAIT_THRESHOLD, 0.9);
        assert_eq!(rec.action, Action::Wait);
        assert!((rec.savings - 100.0).abs() < 1e-9);
        assert_eq!(rec.best_time_days, Some(30));
    }

    #[test]
    fn shallow_drop_stays_buy_now() {
        // 2% below current, under the 5% threshold.
        let projections = Projections::new(vec![(30, 980.0)]);
        let rec = decide(1000.0, &projections, WAIT_THRESHOLD, 0.9);
        assert_eq!(rec.action, Action::BuyNow);
        assert_eq!(rec.best_time_days, None);
    }

    #[test]
    fn rising_prices_mean_buy_now_with_zero_savings() {
        let projections = Projections::new(vec![(7, 1010.0), (30, 1100.0)]);
        let rec = decide(1000.0, &projections, WAIT_THRESHOLD, 0.9);
        assert_eq!(rec.action, Action::BuyNow);
        assert_eq!(rec.savings, 0.0);
        assert_eq!(rec.best_time_days, None);
    }

    #[test]
    fn first_maximum_wins_on_ties() {
        let projections = Projections::new(vec![(30, 900.0), (60, 900.0), (90, 950.0)]);
        let rec = decide(1000.0, &projections, WAIT_THRESHOLD, 0.9);
        assert_eq!(rec.best_time_days, Some(30));
    }

    #[test]
    fn savings_track_deepest_horizon() {
        let projections = Projections::new(vec![(7, 980.0), (30, 900.0), (60, 850.0), (90, 870.0)]);
        let rec = decide(1000.0, &projections, WAIT_THRESHOLD, 0.9);
        assert_eq!(rec.action, Action::Wait);
        assert!((rec.savings - 150.0).abs() < 1e-9);
        assert_eq!(rec.best_time_days, Some(60));
    }
}
