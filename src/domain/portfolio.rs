use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current balance of one asset, fetched fresh for every rebalance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub asset: String,
    pub amount: Decimal,
}

impl Holding {
    pub fn new(asset: impl Into<String>, amount: Decimal) -> Self {
        Holding {
            asset: asset.into(),
            amount,
        }
    }

    /// `amount * price`, or `None` when the product overflows
    pub fn value(&self, price: Decimal) -> Option<Decimal> {
        self.amount.checked_mul(price)
    }
}

/// Desired value-weighted split between two assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationTarget {
    pub asset_a: String,
    pub asset_b: String,
    /// Fraction of portfolio value that should sit in `asset_a`, in (0, 1)
    pub ratio_a: Decimal,
}

impl AllocationTarget {
    pub fn new(asset_a: impl Into<String>, asset_b: impl Into<String>, ratio_a: Decimal) -> Self {
        AllocationTarget {
            asset_a: asset_a.into(),
            asset_b: asset_b.into(),
            ratio_a,
        }
    }

    pub fn ratio_b(&self) -> Decimal {
        Decimal::ONE - self.ratio_a
    }

    pub fn is_valid_ratio(&self) -> bool {
        self.ratio_a > Decimal::ZERO && self.ratio_a < Decimal::ONE
    }
}

/// Holdings and spot prices of the two assets at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub holding_a: Holding,
    pub holding_b: Holding,
    pub price_a: Decimal,
    pub price_b: Decimal,
}

impl PortfolioSnapshot {
    pub fn new(holding_a: Holding, holding_b: Holding, price_a: Decimal, price_b: Decimal) -> Self {
        PortfolioSnapshot {
            holding_a,
            holding_b,
            price_a,
            price_b,
        }
    }

    pub fn value_a(&self) -> Option<Decimal> {
        self.holding_a.value(self.price_a)
    }

    pub fn value_b(&self) -> Option<Decimal> {
        self.holding_b.value(self.price_b)
    }

    /// Combined value, `None` if either side or the sum overflows
    pub fn total_value(&self) -> Option<Decimal> {
        self.value_a()?.checked_add(self.value_b()?)
    }

    /// Share of value held in asset A; `None` for an empty portfolio or one
    /// whose value cannot be represented
    pub fn ratio_a(&self) -> Option<Decimal> {
        let total = self.total_value()?;
        if total.is_zero() {
            None
        } else {
            self.value_a()?.checked_div(total)
        }
    }
}
