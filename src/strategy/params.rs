//! Strategy Parameters
//!
//! Tunable knobs for the trend analyzer and the rebalance planner.
//! The defaults give a mid-range score (~50) for a net move of about one
//! standard deviation of the period returns.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::Interval;

/// Combined strategy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Trend analysis settings
    pub analyzer: AnalyzerConfig,
    /// Rebalance settings
    pub planner: PlannerConfig,
    /// Journal insight settings
    pub insights: InsightConfig,
    /// Days of history fed to the analyzer during a rebalance
    pub lookback_days: u32,
    /// Sampling interval for that history
    pub interval: Interval,
    /// Default value share of asset A
    pub target_ratio: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            planner: PlannerConfig::default(),
            insights: InsightConfig::default(),
            lookback_days: 30,
            interval: Interval::Day,
            target_ratio: dec!(0.5),
        }
    }
}

impl StrategyConfig {
    /// Create a new config with custom target ratio
    pub fn with_target_ratio(mut self, ratio: Decimal) -> Self {
        self.target_ratio = ratio;
        self
    }

    /// Create a new config with custom tolerance
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.planner.tolerance = tolerance;
        self
    }

    /// Create a new config with custom lookback
    pub fn with_lookback(mut self, days: u32, interval: Interval) -> Self {
        self.lookback_days = days;
        self.interval = interval;
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.lookback_days == 0 {
            return Err(ParamError::InvalidLookback(self.lookback_days));
        }
        if self.target_ratio <= Decimal::ZERO || self.target_ratio >= Decimal::ONE {
            return Err(ParamError::InvalidTargetRatio(self.target_ratio));
        }
        self.analyzer.validate()?;
        self.planner.validate()?;
        self.insights.validate()?;
        Ok(())
    }
}

/// Trend analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// |net return| at or below this is noise (0.002 = 0.2%)
    pub deadband: f64,
    /// Net return treated as fully confident when volatility is negligible
    pub cap_return: f64,
    /// Multiplier from |net return| / volatility to score points
    pub scale_factor: f64,
    /// Volatility below this is treated as zero
    pub volatility_epsilon: f64,
    /// Late-minus-early mean return within +/- this is steady momentum
    pub momentum_epsilon: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            deadband: 0.002,
            cap_return: 0.10,
            scale_factor: 50.0,
            volatility_epsilon: 1e-6,
            momentum_epsilon: 1e-6,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.deadband >= 0.0 && self.deadband < 1.0) {
            return Err(ParamError::InvalidDeadband(self.deadband));
        }
        if !(self.cap_return > 0.0 && self.cap_return.is_finite()) {
            return Err(ParamError::InvalidCapReturn(self.cap_return));
        }
        if !(self.scale_factor > 0.0 && self.scale_factor.is_finite()) {
            return Err(ParamError::InvalidScaleFactor(self.scale_factor));
        }
        if !(self.volatility_epsilon >= 0.0 && self.volatility_epsilon.is_finite()) {
            return Err(ParamError::InvalidVolatilityEpsilon(self.volatility_epsilon));
        }
        if !(self.momentum_epsilon >= 0.0 && self.momentum_epsilon.is_finite()) {
            return Err(ParamError::InvalidMomentumEpsilon(self.momentum_epsilon));
        }
        Ok(())
    }
}

/// Rebalance planner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Allowed |current ratio - target ratio| before any trade (dead zone)
    pub tolerance: Decimal,
    /// Emit `Swap` (direct pair trade) instead of `Sell` for corrections
    pub prefer_swap: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            tolerance: dec!(0.02),
            prefer_swap: true,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.tolerance < Decimal::ZERO || self.tolerance >= Decimal::ONE {
            return Err(ParamError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// Moving-average insight configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Number of recent trades per asset in the moving average
    pub window: usize,
    /// Relative distance from the average that counts as unusual (0.10 = 10%)
    pub threshold: Decimal,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            window: 10,
            threshold: dec!(0.10),
        }
    }
}

impl InsightConfig {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.window == 0 {
            return Err(ParamError::InvalidInsightWindow(self.window));
        }
        if self.threshold <= Decimal::ZERO || self.threshold >= Decimal::ONE {
            return Err(ParamError::InvalidInsightThreshold(self.threshold));
        }
        Ok(())
    }
}

/// Parameter validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("Invalid lookback: {0} days (must be > 0)")]
    InvalidLookback(u32),
    #[error("Invalid target ratio: {0} (must be 0 < ratio < 1)")]
    InvalidTargetRatio(Decimal),
    #[error("Invalid deadband: {0} (must be 0 <= deadband < 1)")]
    InvalidDeadband(f64),
    #[error("Invalid cap return: {0} (must be > 0)")]
    InvalidCapReturn(f64),
    #[error("Invalid scale factor: {0} (must be > 0)")]
    InvalidScaleFactor(f64),
    #[error("Invalid volatility epsilon: {0} (must be >= 0)")]
    InvalidVolatilityEpsilon(f64),
    #[error("Invalid momentum epsilon: {0} (must be >= 0)")]
    InvalidMomentumEpsilon(f64),
    #[error("Invalid tolerance: {0} (must be 0 <= tolerance < 1)")]
    InvalidTolerance(Decimal),
    #[error("Invalid insight window: {0} (must be > 0)")]
    InvalidInsightWindow(usize),
    #[error("Invalid insight threshold: {0} (must be 0 < threshold < 1)")]
    InvalidInsightThreshold(Decimal),
}
