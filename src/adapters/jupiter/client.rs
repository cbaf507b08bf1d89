//! Jupiter API Client
//!
//! HTTP client for the Jupiter swap API: quotes and unsigned swap
//! transactions. Signing and submission happen in the Solana adapter.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::quote::{QuoteRequest, QuoteResponse};
use super::swap::{SwapRequest, SwapResponse};
use crate::ports::execution::ExecutionError;

/// Jupiter API client configuration
#[derive(Debug, Clone)]
pub struct JupiterConfig {
    pub api_base_url: String,
    /// Optional API key for higher rate limits
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Attempts per request, including the first
    pub max_retries: u32,
    /// Default slippage for quotes, in basis points
    pub slippage_bps: u16,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.jup.ag/swap/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            slippage_bps: 50,
        }
    }
}

/// Jupiter DEX aggregator client
#[derive(Debug, Clone)]
pub struct JupiterClient {
    config: JupiterConfig,
    http: Client,
}

impl JupiterClient {
    pub fn with_config(config: JupiterConfig) -> Result<Self, ExecutionError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExecutionError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn slippage_bps(&self) -> u16 {
        self.config.slippage_bps
    }

    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }

    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ExecutionError> {
        let url = format!("{}/quote", self.config.api_base_url);
        let req = self.authorize(self.http.get(&url).query(&request.query_pairs()));

        tracing::debug!(
            "Quote {} {} -> {} ({})",
            request.amount,
            request.input_mint,
            request.output_mint,
            request.swap_mode
        );
        let response = self.execute_with_retry(req).await?;
        self.handle_response(response).await
    }

    /// Build the unsigned swap transaction for a quote.
    ///
    /// Building is read-only on the chain side, so it shares the retry policy
    /// of quotes.
    pub async fn get_swap_transaction(
        &self,
        request: &SwapRequest,
    ) -> Result<SwapResponse, ExecutionError> {
        let url = format!("{}/swap", self.config.api_base_url);
        let req = self.authorize(self.http.post(&url).json(request));

        let response = self.execute_with_retry(req).await?;
        self.handle_response(response).await
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.config.api_key {
            Some(ref api_key) => req.header("x-api-key", api_key),
            None => req,
        }
    }

    /// Send with retries: exponential backoff on 429, linear on 5xx and
    /// transport errors. Other statuses are returned for `handle_response`.
    async fn execute_with_retry(&self, req: RequestBuilder) -> Result<reqwest::Response, ExecutionError> {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries.max(1) {
            let attempt_req = req
                .try_clone()
                .ok_or_else(|| ExecutionError::ApiError("Failed to clone request".into()))?;

            match attempt_req.send().await {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let backoff = Duration::from_secs(2u64.pow(attempt + 1));
                    tracing::warn!(
                        "Rate limited (429), backing off for {:?} (attempt {}/{})",
                        backoff,
                        attempt + 1,
                        self.config.max_retries
                    );
                    last_error = Some(ExecutionError::ApiError("Rate limit exceeded".into()));
                    tokio::time::sleep(backoff).await;
                }
                Ok(response) if response.status().is_server_error() => {
                    tracing::warn!("Jupiter server error {} (attempt {})", response.status(), attempt + 1);
                    last_error = Some(ExecutionError::ApiError(format!(
                        "Server error: {}",
                        response.status()
                    )));
                    tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                }
                Ok(response) => return Ok(response),
                Err(e) => {
                    last_error = Some(ExecutionError::ApiError(e.to_string()));
                    tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ExecutionError::ApiError("Max retries exceeded".into())))
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ExecutionError> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ExecutionError::ApiError(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ExecutionError::ApiError(format!("Failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jupiter_config_default() {
        let config = JupiterConfig::default();
        assert_eq!(config.api_base_url, "https://api.jup.ag/swap/v1");
        assert!(config.api_key.is_none());
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.slippage_bps, 50);
    }

    #[test]
    fn test_jupiter_client_creation() {
        let config = JupiterConfig {
            api_key: Some("test-key".to_string()),
            slippage_bps: 100,
            ..Default::default()
        };
        let client = JupiterClient::with_config(config).unwrap();
        assert_eq!(client.slippage_bps(), 100);
        assert_eq!(client.api_base_url(), "https://api.jup.ag/swap/v1");
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_after_retries() {
        let config = JupiterConfig {
            api_base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_millis(200),
            max_retries: 1,
            ..Default::default()
        };
        let client = JupiterClient::with_config(config).unwrap();
        let request = QuoteRequest::new("A".into(), "B".into(), 1, 50);

        let result = client.get_quote(&request).await;
        assert!(matches!(result, Err(ExecutionError::ApiError(_))));
    }
}
