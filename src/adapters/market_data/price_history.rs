//! Historical prices from a CoinGecko-compatible `market_chart` API.
//!
//! The API picks its own granularity from the requested window (minutes for
//! one day, hours up to 90 days, days beyond), so the raw points are
//! resampled to the caller's interval.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{Interval, PricePoint, PriceSeries, TokenRegistry};
use crate::ports::market_data::{MarketDataError, PriceHistoryPort};

#[derive(Debug, Clone)]
pub struct PriceHistoryConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Asset platform id used for contract lookups
    pub platform: String,
    /// Coin id used for native SOL, which has no contract
    pub native_coin_id: String,
    pub vs_currency: String,
    pub timeout: Duration,
}

impl Default for PriceHistoryConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.coingecko.com/api/v3".to_string(),
            api_key: None,
            platform: "solana".to_string(),
            native_coin_id: "solana".to_string(),
            vs_currency: "usd".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PriceHistoryClient {
    config: PriceHistoryConfig,
    http: Client,
    registry: Arc<TokenRegistry>,
}

impl PriceHistoryClient {
    pub fn new(config: PriceHistoryConfig, registry: Arc<TokenRegistry>) -> Result<Self, MarketDataError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MarketDataError::data_unavailable("*", e))?;
        Ok(Self {
            config,
            http,
            registry,
        })
    }

    /// Endpoint for a token's chart: by coin id for native SOL, by contract
    /// address for everything else
    pub fn chart_url(&self, token: &str) -> Result<String, MarketDataError> {
        let info = self
            .registry
            .resolve(token)
            .map_err(|e| MarketDataError::data_unavailable(token, e))?;

        let base = self.config.api_url.trim_end_matches('/');
        Ok(if info.is_native_sol() {
            format!("{}/coins/{}/market_chart", base, self.config.native_coin_id)
        } else {
            format!(
                "{}/coins/{}/contract/{}/market_chart",
                base, self.config.platform, info.mint
            )
        })
    }
}

#[async_trait]
impl PriceHistoryPort for PriceHistoryClient {
    async fn fetch_price_series(
        &self,
        token: &str,
        days: u32,
        interval: Interval,
    ) -> Result<PriceSeries, MarketDataError> {
        if days == 0 {
            return Err(MarketDataError::data_unavailable(token, "window must be at least one day"));
        }

        let url = self.chart_url(token)?;
        let mut req = self.http.get(&url).query(&[
            ("vs_currency", self.config.vs_currency.clone()),
            ("days", days.to_string()),
        ]);
        if let Some(ref key) = self.config.api_key {
            req = req.header("x-cg-demo-api-key", key);
        }

        tracing::debug!("Fetching {} days of {} prices from {}", days, token, url);
        let response = req
            .send()
            .await
            .map_err(|e| MarketDataError::data_unavailable(token, e))?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(MarketDataError::data_unavailable(
                token,
                format!("HTTP {}: {}", status, text),
            ));
        }

        let chart: MarketChart = response
            .json()
            .await
            .map_err(|e| MarketDataError::data_unavailable(token, e))?;

        let series = chart.into_series(interval);
        if series.is_empty() {
            return Err(MarketDataError::data_unavailable(token, "no prices returned"));
        }
        tracing::debug!("{} {} points for {} ({} days)", series.len(), interval, token, days);
        Ok(series)
    }
}

/// `{"prices": [[unix_ms, price], ...], ...}`
#[derive(Debug, Deserialize)]
pub struct MarketChart {
    prices: Vec<(f64, f64)>,
}

impl MarketChart {
    /// Drop unparseable samples, order by time and resample
    pub fn into_series(self, interval: Interval) -> PriceSeries {
        let points = self
            .prices
            .into_iter()
            .filter_map(|(ms, price)| {
                let timestamp = DateTime::from_timestamp_millis(ms as i64)?;
                let price = Decimal::from_f64(price)?;
                Some(PricePoint::new(timestamp, price))
            })
            .collect();
        PriceSeries::from_unordered(points).resample(interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TokenInfo;
    use rust_decimal_macros::dec;

    const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn client() -> PriceHistoryClient {
        let registry = TokenRegistry::new(vec![TokenInfo::new("USDC", USDC_MINT, 6)]);
        PriceHistoryClient::new(PriceHistoryConfig::default(), Arc::new(registry)).unwrap()
    }

    #[test]
    fn test_chart_urls() {
        let c = client();
        assert_eq!(
            c.chart_url("SOL").unwrap(),
            "https://api.coingecko.com/api/v3/coins/solana/market_chart"
        );
        assert_eq!(
            c.chart_url("usdc").unwrap(),
            format!("https://api.coingecko.com/api/v3/coins/solana/contract/{}/market_chart", USDC_MINT)
        );
        assert!(matches!(
            c.chart_url("NOPE"),
            Err(MarketDataError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_market_chart_resampled_to_daily() {
        // 2026-01-01T00:00Z, +12h, 2026-01-02T00:00Z, +12h (out of order)
        let json = r#"{
            "prices": [
                [1767225600000, 100.0],
                [1767268800000, 101.5],
                [1767355200000, 99.25],
                [1767312000000, 102.0]
            ],
            "market_caps": [],
            "total_volumes": []
        }"#;
        let chart: MarketChart = serde_json::from_str(json).unwrap();
        let series = chart.into_series(Interval::Day);

        assert_eq!(series.len(), 2);
        let prices: Vec<Decimal> = series.prices().collect();
        assert_eq!(prices, vec![dec!(101.5), dec!(99.25)]);
    }

    #[test]
    fn test_market_chart_hourly_keeps_points() {
        let json = r#"{"prices": [[1767225600000, 1.0], [1767229200000, 2.0]]}"#;
        let chart: MarketChart = serde_json::from_str(json).unwrap();
        assert_eq!(chart.into_series(Interval::Hour).len(), 2);
    }

    #[tokio::test]
    async fn test_zero_day_window_rejected() {
        let result = client().fetch_price_series("SOL", 0, Interval::Day).await;
        assert!(matches!(result, Err(MarketDataError::DataUnavailable { .. })));
    }
}
