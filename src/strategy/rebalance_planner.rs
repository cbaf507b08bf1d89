//! Rebalance Planner
//!
//! Computes the single trade that moves a two-asset portfolio toward its
//! target value split. A trend that opposes the correction shrinks the trade
//! by `1 - score/100`; a trend that agrees with it (or no trend) leaves it
//! whole. The trade never carries the ratio past the target.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    AllocationTarget, PortfolioSnapshot, TradeInstruction, TrendDirection, TrendSignal,
};
use crate::strategy::params::PlannerConfig;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
    #[error("Invalid price for {asset}: {price} (must be > 0)")]
    InvalidPrice { asset: String, price: Decimal },
    #[error("Invalid holding for {asset}: {amount} (must be >= 0)")]
    InvalidHolding { asset: String, amount: Decimal },
    #[error("Invalid tolerance: {0} (must be >= 0)")]
    InvalidTolerance(Decimal),
    #[error("Value of {0} is outside the representable range")]
    ValueOverflow(String),
}

/// Why a plan resolved to no trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    /// Both holdings are worth nothing
    EmptyPortfolio,
    /// Deviation from target is inside the dead zone
    WithinTolerance,
    /// An opposing trend damped the correction to zero
    FullyDamped,
}

impl std::fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoOpReason::EmptyPortfolio => write!(f, "portfolio is empty"),
            NoOpReason::WithinTolerance => write!(f, "allocation within tolerance"),
            NoOpReason::FullyDamped => write!(f, "correction fully damped by trend"),
        }
    }
}

/// Planner output: the instruction plus the figures that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalancePlan {
    pub instruction: TradeInstruction,
    /// Set exactly when `instruction` is a no-op
    pub reason: Option<NoOpReason>,
    /// Current value share of asset A (`None` for an empty portfolio)
    pub current_ratio: Option<Decimal>,
    /// current_ratio - target ratio
    pub deviation: Decimal,
    /// Fraction of the full correction that was kept, in [0, 1]
    pub damping_factor: Decimal,
    /// Value moved out of the overweight asset
    pub move_value: Decimal,
}

impl RebalancePlan {
    fn no_op(
        asset: &str,
        reason: NoOpReason,
        current_ratio: Option<Decimal>,
        deviation: Decimal,
        damping_factor: Decimal,
    ) -> Self {
        Self {
            instruction: TradeInstruction::no_op(asset),
            reason: Some(reason),
            current_ratio,
            deviation,
            damping_factor,
            move_value: Decimal::ZERO,
        }
    }

    pub fn is_no_op(&self) -> bool {
        self.instruction.is_no_op()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RebalancePlanner {
    config: PlannerConfig,
}

impl RebalancePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan with the configured tolerance
    pub fn plan(
        &self,
        snapshot: &PortfolioSnapshot,
        target: &AllocationTarget,
        signal: &TrendSignal,
    ) -> Result<RebalancePlan, PlanError> {
        self.plan_with_tolerance(snapshot, target, signal, self.config.tolerance)
    }

    pub fn plan_with_tolerance(
        &self,
        snapshot: &PortfolioSnapshot,
        target: &AllocationTarget,
        signal: &TrendSignal,
        tolerance: Decimal,
    ) -> Result<RebalancePlan, PlanError> {
        validate(snapshot, target, tolerance)?;

        let overflow = || PlanError::ValueOverflow(format!("{}/{}", target.asset_a, target.asset_b));
        let value_a = snapshot.value_a().ok_or_else(overflow)?;
        let total = snapshot.total_value().ok_or_else(overflow)?;

        if total.is_zero() {
            tracing::info!("Rebalance skipped: {} and {} hold no value", target.asset_a, target.asset_b);
            return Ok(RebalancePlan::no_op(
                &target.asset_a,
                NoOpReason::EmptyPortfolio,
                None,
                Decimal::ZERO,
                Decimal::ONE,
            ));
        }

        let current_ratio = value_a / total;
        let deviation = current_ratio - target.ratio_a;
        if deviation.abs() <= tolerance {
            tracing::info!(
                "Rebalance skipped: {} share {:.4} within {} of target {}",
                target.asset_a,
                current_ratio,
                tolerance,
                target.ratio_a
            );
            return Ok(RebalancePlan::no_op(
                &target.asset_a,
                NoOpReason::WithinTolerance,
                Some(current_ratio),
                deviation,
                Decimal::ONE,
            ));
        }

        // Value that would land exactly on target; same as |deviation| * total
        // but without the rounding of the ratio division.
        let excess_a = value_a - target.ratio_a * total;
        let a_overweight = excess_a > Decimal::ZERO;

        let damping_factor = damping_factor(signal, a_overweight);
        let move_value = (excess_a.abs() * damping_factor).min(excess_a.abs());

        let (sell_asset, sell_price, buy_asset) = if a_overweight {
            (&target.asset_a, snapshot.price_a, &target.asset_b)
        } else {
            (&target.asset_b, snapshot.price_b, &target.asset_a)
        };
        let amount = move_value
            .checked_div(sell_price)
            .ok_or_else(|| PlanError::ValueOverflow(sell_asset.clone()))?;

        if amount.is_zero() {
            tracing::warn!(
                "Rebalance deferred: {} trend opposes selling {} (deviation {:.4})",
                signal,
                sell_asset,
                deviation
            );
            return Ok(RebalancePlan::no_op(
                &target.asset_a,
                NoOpReason::FullyDamped,
                Some(current_ratio),
                deviation,
                damping_factor,
            ));
        }

        let instruction = if self.config.prefer_swap {
            TradeInstruction::swap(sell_asset.clone(), amount, buy_asset.clone())
        } else {
            TradeInstruction::sell(sell_asset.clone(), amount, Some(buy_asset.clone()))
        };

        tracing::info!(
            "Rebalance planned: {} (share {:.4} -> target {}, damping {}, trend {})",
            instruction,
            current_ratio,
            target.ratio_a,
            damping_factor,
            signal
        );

        Ok(RebalancePlan {
            instruction,
            reason: None,
            current_ratio: Some(current_ratio),
            deviation,
            damping_factor,
            move_value,
        })
    }
}

/// Share of the correction to keep. The signal describes asset A: a falling
/// A reinforces selling A, a rising A reinforces selling B.
fn damping_factor(signal: &TrendSignal, a_overweight: bool) -> Decimal {
    let opposes = matches!(
        (signal.direction(), a_overweight),
        (TrendDirection::Up, true) | (TrendDirection::Down, false)
    );
    if !opposes {
        return Decimal::ONE;
    }
    let strength = Decimal::from(signal.score()) / dec!(100);
    (Decimal::ONE - strength).max(Decimal::ZERO)
}

fn validate(
    snapshot: &PortfolioSnapshot,
    target: &AllocationTarget,
    tolerance: Decimal,
) -> Result<(), PlanError> {
    if !target.is_valid_ratio() {
        return Err(PlanError::InvalidTarget(format!(
            "ratio {} must be strictly between 0 and 1",
            target.ratio_a
        )));
    }
    if snapshot.holding_a.asset != target.asset_a || snapshot.holding_b.asset != target.asset_b {
        return Err(PlanError::InvalidTarget(format!(
            "holdings {}/{} do not match target {}/{}",
            snapshot.holding_a.asset, snapshot.holding_b.asset, target.asset_a, target.asset_b
        )));
    }
    for (asset, price) in [
        (&target.asset_a, snapshot.price_a),
        (&target.asset_b, snapshot.price_b),
    ] {
        if price <= Decimal::ZERO {
            return Err(PlanError::InvalidPrice {
                asset: asset.clone(),
                price,
            });
        }
    }
    for holding in [&snapshot.holding_a, &snapshot.holding_b] {
        if holding.amount.is_sign_negative() && !holding.amount.is_zero() {
            return Err(PlanError::InvalidHolding {
                asset: holding.asset.clone(),
                amount: holding.amount,
            });
        }
    }
    if tolerance.is_sign_negative() && !tolerance.is_zero() {
        return Err(PlanError::InvalidTolerance(tolerance));
    }
    Ok(())
}
