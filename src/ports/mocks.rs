//! In-memory port implementations for tests and dry runs.
//!
//! Each one records the calls it receives so tests can assert on them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{Holding, Interval, PriceSeries, TradeInstruction, TransactionId};
use crate::ports::execution::{ExecutionError, ExecutionPort};
use crate::ports::market_data::{HoldingsPort, MarketDataError, PriceHistoryPort, PricePort};

/// Price history served from a fixed map of token -> series
#[derive(Debug, Default, Clone)]
pub struct StaticPriceHistory {
    series: Arc<Mutex<HashMap<String, PriceSeries>>>,
    calls: Arc<Mutex<Vec<(String, u32, Interval)>>>,
}

impl StaticPriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the series returned for a token
    pub fn with_series(self, token: &str, series: PriceSeries) -> Self {
        self.series.lock().unwrap().insert(token.to_string(), series);
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<(String, u32, Interval)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceHistoryPort for StaticPriceHistory {
    async fn fetch_price_series(
        &self,
        token: &str,
        days: u32,
        interval: Interval,
    ) -> Result<PriceSeries, MarketDataError> {
        self.calls.lock().unwrap().push((token.to_string(), days, interval));
        self.series
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| MarketDataError::data_unavailable(token, "no series configured"))
    }
}

/// Balances and spot prices held in memory
#[derive(Debug, Default, Clone)]
pub struct StaticMarket {
    balances: Arc<Mutex<HashMap<String, Decimal>>>,
    prices: Arc<Mutex<HashMap<String, Decimal>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StaticMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, asset: &str, amount: Decimal) -> Self {
        self.set_balance(asset, amount);
        self
    }

    pub fn with_price(self, asset: &str, price: Decimal) -> Self {
        self.prices.lock().unwrap().insert(asset.to_string(), price);
        self
    }

    pub fn set_balance(&self, asset: &str, amount: Decimal) {
        self.balances.lock().unwrap().insert(asset.to_string(), amount);
    }

    /// Get all recorded calls, as "holding:ASSET" or "price:ASSET"
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HoldingsPort for StaticMarket {
    async fn fetch_holding(&self, asset: &str) -> Result<Holding, MarketDataError> {
        self.calls.lock().unwrap().push(format!("holding:{}", asset));
        self.balances
            .lock()
            .unwrap()
            .get(asset)
            .map(|amount| Holding::new(asset, *amount))
            .ok_or_else(|| MarketDataError::quote_unavailable(asset, "no balance configured"))
    }
}

#[async_trait]
impl PricePort for StaticMarket {
    async fn fetch_price(&self, asset: &str) -> Result<Decimal, MarketDataError> {
        self.calls.lock().unwrap().push(format!("price:{}", asset));
        self.prices
            .lock()
            .unwrap()
            .get(asset)
            .copied()
            .ok_or_else(|| MarketDataError::quote_unavailable(asset, "no price configured"))
    }
}

/// Executor that records every instruction instead of trading
#[derive(Debug, Default, Clone)]
pub struct RecordingExecutor {
    submitted: Arc<Mutex<Vec<TradeInstruction>>>,
    failure: Arc<Mutex<Option<ExecutionError>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent submission fail with `error`
    pub fn failing_with(self, error: ExecutionError) -> Self {
        *self.failure.lock().unwrap() = Some(error);
        self
    }

    /// Get all recorded submissions, including failed ones
    pub fn submitted(&self) -> Vec<TradeInstruction> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionPort for RecordingExecutor {
    async fn submit_trade(
        &self,
        instruction: &TradeInstruction,
    ) -> Result<TransactionId, ExecutionError> {
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(instruction.clone());
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(TransactionId::new(format!("mock-tx-{}", submitted.len())))
    }
}
