//! Trade Journal Insights
//!
//! Compares the newest traded amount of each asset in a pair with the
//! moving average of its recent trades. A last trade well above the average
//! of asset A flags `buy`; one well above the average of asset B flags
//! `sell`; a last trade well below either average flags `rebalance`. At most
//! one flag is set, checked in that order.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::strategy::params::InsightConfig;

/// Flags derived from the recent trade history of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RebalanceInsights {
    pub buy: bool,
    pub sell: bool,
    pub rebalance: bool,
    /// Journal trades seen for each asset
    pub samples_a: usize,
    pub samples_b: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: InsightConfig,
}

impl InsightEngine {
    pub fn new(config: InsightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Evaluate trade amounts of each asset, oldest first.
    ///
    /// Nothing is flagged until both assets have a full window of trades.
    pub fn evaluate(&self, amounts_a: &[Decimal], amounts_b: &[Decimal]) -> RebalanceInsights {
        let mut insights = RebalanceInsights {
            samples_a: amounts_a.len(),
            samples_b: amounts_b.len(),
            ..Default::default()
        };

        let (Some(a), Some(b)) = (self.band(amounts_a), self.band(amounts_b)) else {
            tracing::debug!(
                "Insights need {} trades per asset, have {}/{}",
                self.config.window,
                amounts_a.len(),
                amounts_b.len()
            );
            return insights;
        };

        if a.last > a.upper {
            insights.buy = true;
        } else if b.last > b.upper {
            insights.sell = true;
        } else if a.last < a.lower || b.last < b.lower {
            insights.rebalance = true;
        }

        tracing::debug!(
            "Insights: A last {} avg {} | B last {} avg {} -> {:?}",
            a.last,
            a.average,
            b.last,
            b.average,
            insights
        );
        insights
    }

    /// Moving average of the last `window` amounts and the bounds around it
    fn band(&self, amounts: &[Decimal]) -> Option<Band> {
        let window = self.config.window;
        if window == 0 || amounts.len() < window {
            return None;
        }
        let recent = &amounts[amounts.len() - window..];
        let sum = recent
            .iter()
            .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(*amount))?;
        let average = sum.checked_div(Decimal::from(window))?;

        Some(Band {
            last: *recent.last()?,
            average,
            upper: average.checked_mul(Decimal::ONE + self.config.threshold)?,
            lower: average.checked_mul(Decimal::ONE - self.config.threshold)?,
        })
    }
}

struct Band {
    last: Decimal,
    average: Decimal,
    upper: Decimal,
    lower: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Nine trades of `base` followed by `last`
    fn window_ending(base: Decimal, last: Decimal) -> Vec<Decimal> {
        let mut amounts = vec![base; 9];
        amounts.push(last);
        amounts
    }

    fn engine() -> InsightEngine {
        InsightEngine::default()
    }

    #[test]
    fn test_short_history_flags_nothing() {
        let insights = engine().evaluate(&[dec!(1), dec!(50)], &window_ending(dec!(10), dec!(10)));
        assert_eq!(
            insights,
            RebalanceInsights {
                samples_a: 2,
                samples_b: 10,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_steady_trades_flag_nothing() {
        let steady = window_ending(dec!(10), dec!(10));
        let insights = engine().evaluate(&steady, &steady);
        assert!(!insights.buy && !insights.sell && !insights.rebalance);
    }

    #[test]
    fn test_large_last_a_flags_buy() {
        // average (9 * 10 + 30) / 10 = 12, upper bound 13.2
        let insights = engine().evaluate(&window_ending(dec!(10), dec!(30)), &window_ending(dec!(5), dec!(1)));
        assert!(insights.buy);
        assert!(!insights.sell);
        assert!(!insights.rebalance);
    }

    #[test]
    fn test_large_last_b_flags_sell() {
        let insights = engine().evaluate(&window_ending(dec!(10), dec!(10)), &window_ending(dec!(5), dec!(20)));
        assert!(insights.sell);
        assert!(!insights.buy);
    }

    #[test]
    fn test_small_last_trade_flags_rebalance() {
        // average 9.1, lower bound 8.19
        let insights = engine().evaluate(&window_ending(dec!(10), dec!(1)), &window_ending(dec!(5), dec!(5)));
        assert!(insights.rebalance);

        let insights = engine().evaluate(&window_ending(dec!(10), dec!(10)), &window_ending(dec!(5), dec!(0)));
        assert!(insights.rebalance);
    }

    #[test]
    fn test_bounds_are_exclusive() {
        // average 9, last exactly 10% above -> within the band
        let mut amounts = vec![dec!(8.9); 9];
        amounts.push(dec!(9.9));
        let insights = engine().evaluate(&amounts, &window_ending(dec!(5), dec!(5)));
        assert!(!insights.buy);
        assert!(!insights.rebalance);
    }

    #[test]
    fn test_only_the_window_counts() {
        // old outliers fall outside the 10-trade window
        let mut amounts = vec![dec!(1000); 5];
        amounts.extend(window_ending(dec!(10), dec!(10)));
        let insights = engine().evaluate(&amounts, &window_ending(dec!(5), dec!(5)));
        assert_eq!(insights.samples_a, 15);
        assert!(!insights.buy && !insights.sell && !insights.rebalance);
    }

    #[test]
    fn test_custom_window_and_threshold() {
        let engine = InsightEngine::new(InsightConfig {
            window: 2,
            threshold: dec!(0.5),
        });
        // average 15, upper 22.5
        assert!(!engine.evaluate(&[dec!(10), dec!(20)], &[dec!(1), dec!(1)]).buy);
        // average 25, upper 37.5
        assert!(engine.evaluate(&[dec!(10), dec!(40)], &[dec!(1), dec!(1)]).buy);
    }

    #[test]
    fn test_unrepresentable_average_flags_nothing() {
        let huge = vec![Decimal::MAX; 10];
        let insights = engine().evaluate(&huge, &window_ending(dec!(5), dec!(5)));
        assert_eq!(insights.samples_a, 10);
        assert!(!insights.buy && !insights.sell && !insights.rebalance);
    }
}
