use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::TokenRegistry;
use crate::ports::market_data::{MarketDataError, PricePort};

pub const JUPITER_PRICE_API: &str = "https://api.jup.ag/price/v2";

/// Spot USD prices from the Jupiter price API
#[derive(Debug, Clone)]
pub struct JupiterPriceClient {
    http: Client,
    api_url: String,
    api_key: Option<String>,
    registry: Arc<TokenRegistry>,
}

impl JupiterPriceClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        registry: Arc<TokenRegistry>,
    ) -> Result<Self, MarketDataError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MarketDataError::quote_unavailable("*", e))?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            api_key,
            registry,
        })
    }

    /// USD price for a mint address
    pub async fn get_price(&self, mint: &str) -> Result<Decimal, MarketDataError> {
        let mut req = self.http.get(&self.api_url).query(&[("ids", mint)]);
        if let Some(ref key) = self.api_key {
            req = req.header("x-api-key", key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| MarketDataError::quote_unavailable(mint, e))?;
        if !response.status().is_success() {
            return Err(MarketDataError::quote_unavailable(
                mint,
                format!("HTTP {}", response.status()),
            ));
        }

        let body: PriceResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::quote_unavailable(mint, e))?;
        body.price_of(mint)
    }
}

#[async_trait]
impl PricePort for JupiterPriceClient {
    async fn fetch_price(&self, asset: &str) -> Result<Decimal, MarketDataError> {
        let token = self
            .registry
            .resolve(asset)
            .map_err(|e| MarketDataError::quote_unavailable(asset, e))?;
        let price = self.get_price(&token.mint).await?;
        tracing::debug!("Spot price {}: ${}", token.symbol, price);
        Ok(price)
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    data: HashMap<String, Option<PriceData>>,
}

#[derive(Debug, Deserialize)]
struct PriceData {
    price: String,
}

impl PriceResponse {
    fn price_of(&self, mint: &str) -> Result<Decimal, MarketDataError> {
        let data = self
            .data
            .get(mint)
            .and_then(Option::as_ref)
            .ok_or_else(|| MarketDataError::quote_unavailable(mint, "no price data"))?;

        let price = Decimal::from_str(&data.price)
            .or_else(|_| Decimal::from_scientific(&data.price))
            .map_err(|e| MarketDataError::quote_unavailable(mint, format!("bad price {:?}: {}", data.price, e)))?;

        if price <= Decimal::ZERO {
            return Err(MarketDataError::quote_unavailable(mint, format!("non-positive price {}", price)));
        }
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SOL: &str = "So11111111111111111111111111111111111111112";

    #[test]
    fn test_parse_price_response() {
        let json = r#"{
            "data": {
                "So11111111111111111111111111111111111111112": {
                    "id": "So11111111111111111111111111111111111111112",
                    "type": "derivedPrice",
                    "price": "147.2301"
                },
                "Unpriced111": null
            },
            "timeTaken": 0.003
        }"#;
        let body: PriceResponse = serde_json::from_str(json).unwrap();

        assert_eq!(body.price_of(SOL).unwrap(), dec!(147.2301));
        assert!(matches!(
            body.price_of("Unpriced111"),
            Err(MarketDataError::QuoteUnavailable { .. })
        ));
        assert!(body.price_of("Missing").is_err());
    }

    #[test]
    fn test_zero_price_rejected() {
        let json = r#"{"data": {"M": {"price": "0"}}}"#;
        let body: PriceResponse = serde_json::from_str(json).unwrap();
        assert!(body.price_of("M").is_err());
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let client = JupiterPriceClient::new(JUPITER_PRICE_API, None, Arc::new(TokenRegistry::default())).unwrap();
        let result = client.fetch_price("NOPE").await;
        assert!(matches!(result, Err(MarketDataError::QuoteUnavailable { .. })));
    }
}
