//! Trend Analyzer
//!
//! Turns a price series into a direction and a 0-100 confidence score.
//!
//! - Period returns: r[i] = (p[i] - p[i-1]) / p[i-1]
//! - Net return: (last - first) / first
//! - Volatility: population standard deviation of the returns
//! - Score: |net| / volatility, scaled and clamped to [0, 100]
//!
//! Normalising by volatility keeps one large tick on a noisy token from
//! reading as a confident trend, while a small steady move on a quiet token
//! still registers.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::domain::{PriceSeries, TrendDirection, TrendSignal};
use crate::strategy::params::AnalyzerConfig;

/// Minimum number of points for a return to exist
pub const MIN_POINTS: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Insufficient data for analysis: requires {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },
}

/// Whether the move is speeding up or fading, judged by comparing the mean
/// return of the later half of the window with the earlier half
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Momentum {
    Accelerating,
    Decelerating,
    Steady,
}

/// Full analysis output, including the figures behind the signal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub signal: TrendSignal,
    pub net_return: f64,
    pub volatility: f64,
    pub early_mean_return: f64,
    pub late_mean_return: f64,
    pub momentum: Momentum,
    pub sample_count: usize,
}

/// Stateless trend analyzer; every call depends only on its input series
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    config: AnalyzerConfig,
}

impl TrendAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Classify the series. Fails only when it has fewer than two points.
    pub fn analyze(&self, series: &PriceSeries) -> Result<TrendSignal, AnalysisError> {
        self.analyze_detailed(series).map(|report| report.signal)
    }

    /// Same as `analyze`, keeping the intermediate statistics
    pub fn analyze_detailed(&self, series: &PriceSeries) -> Result<TrendReport, AnalysisError> {
        if series.len() < MIN_POINTS {
            return Err(AnalysisError::InsufficientData {
                required: MIN_POINTS,
                actual: series.len(),
            });
        }

        let prices: Vec<f64> = series
            .prices()
            .map(|p| p.to_f64().unwrap_or(0.0))
            .collect();

        let returns = period_returns(&prices);
        let (early, late) = split_halves(&returns);
        let early_mean_return = mean_or_zero(early);
        let late_mean_return = mean_or_zero(late);

        let first = prices[0];
        let last = prices[prices.len() - 1];
        let net_return = if first == 0.0 { 0.0 } else { (last - first) / first };

        let volatility = returns.iter().population_std_dev();

        let direction = self.classify(net_return);
        let score = match direction {
            TrendDirection::Neutral => 0,
            _ => self.score(net_return, volatility),
        };
        // A score that rounds to zero cannot carry a direction
        let signal = TrendSignal::new(direction, score);

        let momentum = classify_momentum(
            signal.direction(),
            late_mean_return - early_mean_return,
            self.config.momentum_epsilon,
        );

        tracing::debug!(
            samples = series.len(),
            net_return,
            volatility,
            early_mean_return,
            late_mean_return,
            score = signal.score(),
            "trend analysis: {}",
            signal
        );

        Ok(TrendReport {
            signal,
            net_return,
            volatility,
            early_mean_return,
            late_mean_return,
            momentum,
            sample_count: series.len(),
        })
    }

    fn classify(&self, net_return: f64) -> TrendDirection {
        if net_return > self.config.deadband {
            TrendDirection::Up
        } else if net_return < -self.config.deadband {
            TrendDirection::Down
        } else {
            TrendDirection::Neutral
        }
    }

    fn score(&self, net_return: f64, volatility: f64) -> u8 {
        let raw = if volatility >= self.config.volatility_epsilon {
            net_return.abs() / volatility * self.config.scale_factor
        } else {
            net_return.abs() / self.config.cap_return * 100.0
        };

        if raw.is_nan() {
            return 0;
        }
        raw.round().clamp(0.0, TrendSignal::MAX_SCORE as f64) as u8
    }
}

/// Period-over-period returns; a zero previous price counts as flat
fn period_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]) / w[0] })
        .collect()
}

/// Split by index; the later half takes the extra element on odd lengths
fn split_halves(returns: &[f64]) -> (&[f64], &[f64]) {
    returns.split_at(returns.len() / 2)
}

fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().mean()
    }
}

fn classify_momentum(direction: TrendDirection, acceleration: f64, epsilon: f64) -> Momentum {
    let along_trend = match direction {
        TrendDirection::Up => acceleration,
        TrendDirection::Down => -acceleration,
        TrendDirection::Neutral => return Momentum::Steady,
    };

    if along_trend > epsilon {
        Momentum::Accelerating
    } else if along_trend < -epsilon {
        Momentum::Decelerating
    } else {
        Momentum::Steady
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal::Decimal;

    fn series(prices: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                PricePoint::new(
                    start + Duration::days(i as i64),
                    Decimal::from_f64(*p).unwrap(),
                )
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    /// Prices compounding from `start` by each return in turn
    fn series_from_returns(start: f64, returns: &[f64]) -> PriceSeries {
        let mut prices = vec![start];
        for r in returns {
            let last = *prices.last().unwrap();
            prices.push(last * (1.0 + r));
        }
        series(&prices)
    }

    /// Alternating +/-noise around a constant drift: volatility equals
    /// `noise` regardless of `drift`
    fn drift_with_noise(drift: f64, noise: f64) -> PriceSeries {
        series_from_returns(
            100.0,
            &[drift + noise, drift - noise, drift + noise, drift - noise],
        )
    }

    fn analyzer() -> TrendAnalyzer {
        TrendAnalyzer::default()
    }

    #[test]
    fn test_empty_series_is_insufficient() {
        let result = analyzer().analyze(&PriceSeries::default());
        assert_eq!(
            result,
            Err(AnalysisError::InsufficientData { required: 2, actual: 0 })
        );
    }

    #[test]
    fn test_single_point_is_insufficient() {
        let result = analyzer().analyze(&series(&[42.0]));
        assert_eq!(
            result,
            Err(AnalysisError::InsufficientData { required: 2, actual: 1 })
        );
    }

    #[test]
    fn test_flat_series_is_neutral() {
        let signal = analyzer().analyze(&series(&[5.0; 8])).unwrap();
        assert_eq!(signal.direction(), TrendDirection::Neutral);
        assert_eq!(signal.score(), 0);
    }

    #[test]
    fn test_reference_series() {
        let report = analyzer()
            .analyze_detailed(&series(&[100.0, 101.0, 99.0, 102.0, 105.0, 110.0]))
            .unwrap();

        assert_relative_eq!(report.net_return, 0.10, epsilon = 1e-9);
        assert_relative_eq!(report.volatility, 0.02298, epsilon = 1e-4);
        assert_eq!(report.signal.direction(), TrendDirection::Up);
        assert!(report.signal.score() > 0);
        assert!(report.signal.score() <= 100);
        assert_eq!(report.sample_count, 6);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let input = series(&[3.0, 3.2, 2.9, 3.4, 3.1, 3.3, 3.6]);
        let a = analyzer();
        let first = a.analyze_detailed(&input).unwrap();
        for _ in 0..10 {
            assert_eq!(a.analyze_detailed(&input).unwrap(), first);
        }
    }

    #[test]
    fn test_constant_step_series_trends_up() {
        let prices: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let signal = analyzer().analyze(&series(&prices)).unwrap();
        assert_eq!(signal.direction(), TrendDirection::Up);
        assert!(signal.score() > 0);
    }

    #[test]
    fn test_descending_series_trends_down() {
        let signal = analyzer()
            .analyze(&series(&[110.0, 105.0, 102.0, 99.0, 101.0, 100.0]))
            .unwrap();
        assert_eq!(signal.direction(), TrendDirection::Down);
        assert!(signal.score() > 0);
    }

    #[test]
    fn test_score_grows_with_step_at_fixed_volatility() {
        let a = analyzer();
        let small = a.analyze(&drift_with_noise(0.005, 0.05)).unwrap();
        let medium = a.analyze(&drift_with_noise(0.01, 0.05)).unwrap();
        let large = a.analyze(&drift_with_noise(0.02, 0.05)).unwrap();

        for s in [small, medium, large] {
            assert_eq!(s.direction(), TrendDirection::Up);
        }
        assert!(small.score() < medium.score());
        assert!(medium.score() < large.score());
        assert!(large.score() < 100);
    }

    #[test]
    fn test_score_shrinks_as_volatility_grows() {
        // every series goes 100 -> 110, only the swings in between differ
        let a = analyzer();
        let calm = a.analyze(&series(&[100.0, 115.0, 100.0, 115.0, 110.0])).unwrap();
        let choppy = a.analyze(&series(&[100.0, 130.0, 100.0, 130.0, 110.0])).unwrap();
        let wild = a.analyze(&series(&[100.0, 150.0, 100.0, 150.0, 110.0])).unwrap();

        assert!(calm.score() > choppy.score());
        assert!(choppy.score() > wild.score());
        assert!(wild.score() > 0);
    }

    #[test]
    fn test_move_inside_deadband_is_neutral() {
        let signal = analyzer().analyze(&series(&[100.0, 100.1])).unwrap();
        assert_eq!(signal, TrendSignal::neutral());
    }

    #[test]
    fn test_negligible_volatility_uses_cap_return() {
        // a single return has zero spread: 5% of a 10% cap -> 50
        let signal = analyzer().analyze(&series(&[100.0, 105.0])).unwrap();
        assert_eq!(signal.direction(), TrendDirection::Up);
        assert_eq!(signal.score(), 50);

        let capped = analyzer().analyze(&series(&[100.0, 120.0])).unwrap();
        assert_eq!(capped.score(), 100);
    }

    #[test]
    fn test_zero_price_is_treated_as_flat() {
        let report = analyzer().analyze_detailed(&series(&[0.0, 10.0, 11.0])).unwrap();
        assert!(report.volatility.is_finite());
        assert_eq!(report.net_return, 0.0);
        assert_eq!(report.signal, TrendSignal::neutral());
    }

    #[test]
    fn test_weak_score_collapses_to_neutral() {
        // net +0.3% is outside the deadband but tiny against the swings
        let signal = analyzer()
            .analyze(&series(&[100.0, 200.0, 50.0, 100.3]))
            .unwrap();
        assert_eq!(signal, TrendSignal::neutral());
    }

    #[test]
    fn test_momentum_dead_zone_is_its_own_knob() {
        let speeding = series(&[100.0, 101.0, 102.0, 104.0, 107.0, 111.0]);

        let wide_momentum = TrendAnalyzer::new(AnalyzerConfig {
            momentum_epsilon: 1.0,
            ..Default::default()
        });
        let report = wide_momentum.analyze_detailed(&speeding).unwrap();
        assert_eq!(report.momentum, Momentum::Steady);
        assert_eq!(report.signal, analyzer().analyze(&speeding).unwrap());

        let wide_volatility = TrendAnalyzer::new(AnalyzerConfig {
            volatility_epsilon: 1.0,
            ..Default::default()
        });
        let report = wide_volatility.analyze_detailed(&speeding).unwrap();
        assert_eq!(report.momentum, Momentum::Accelerating);
    }

    #[test]
    fn test_custom_deadband() {
        let config = AnalyzerConfig {
            deadband: 0.2,
            ..Default::default()
        };
        let signal = TrendAnalyzer::new(config)
            .analyze(&series(&[100.0, 101.0, 99.0, 102.0, 105.0, 110.0]))
            .unwrap();
        assert!(signal.is_neutral());
    }

    #[test]
    fn test_momentum_classification() {
        let a = analyzer();
        let speeding = a
            .analyze_detailed(&series(&[100.0, 101.0, 102.0, 104.0, 107.0, 111.0]))
            .unwrap();
        assert_eq!(speeding.momentum, Momentum::Accelerating);
        assert!(speeding.late_mean_return > speeding.early_mean_return);

        let fading = a
            .analyze_detailed(&series(&[100.0, 105.0, 109.0, 112.0, 113.0, 113.5]))
            .unwrap();
        assert_eq!(fading.momentum, Momentum::Decelerating);

        let flat = a.analyze_detailed(&series(&[7.0, 7.0, 7.0])).unwrap();
        assert_eq!(flat.momentum, Momentum::Steady);
    }

    #[test]
    fn test_split_halves_gives_extra_to_later_half() {
        let returns = [1.0, 2.0, 3.0, 4.0, 5.0];
        let (early, late) = split_halves(&returns);
        assert_eq!(early, &[1.0, 2.0]);
        assert_eq!(late, &[3.0, 4.0, 5.0]);
    }
}
