use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{Holding, Interval, PriceSeries};

/// Market data error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Price history could not be produced for the token
    #[error("Price history unavailable for {token}: {reason}")]
    DataUnavailable { token: String, reason: String },

    /// Spot price or balance could not be fetched
    #[error("Quote unavailable for {asset}: {reason}")]
    QuoteUnavailable { asset: String, reason: String },
}

impl MarketDataError {
    pub fn data_unavailable(token: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            token: token.into(),
            reason: reason.to_string(),
        }
    }

    pub fn quote_unavailable(asset: impl Into<String>, reason: impl ToString) -> Self {
        Self::QuoteUnavailable {
            asset: asset.into(),
            reason: reason.to_string(),
        }
    }
}

/// Source of historical prices
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceHistoryPort: Send + Sync {
    /// Ordered series covering the last `days` days, sampled at `interval`
    async fn fetch_price_series(
        &self,
        token: &str,
        days: u32,
        interval: Interval,
    ) -> Result<PriceSeries, MarketDataError>;
}

/// Source of current wallet balances
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HoldingsPort: Send + Sync {
    async fn fetch_holding(&self, asset: &str) -> Result<Holding, MarketDataError>;
}

/// Source of current spot prices (USD)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PricePort: Send + Sync {
    async fn fetch_price(&self, asset: &str) -> Result<Decimal, MarketDataError>;
}
