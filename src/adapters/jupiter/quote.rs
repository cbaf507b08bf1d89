//! Jupiter Quote Types
//!
//! Request and response structures for the Jupiter quote API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the swap `amount` fixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwapMode {
    /// Spend exactly `amount` of the input token
    #[default]
    ExactIn,
    /// Receive exactly `amount` of the output token
    ExactOut,
}

impl fmt::Display for SwapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapMode::ExactIn => write!(f, "ExactIn"),
            SwapMode::ExactOut => write!(f, "ExactOut"),
        }
    }
}

/// Request parameters for getting a swap quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Input token mint address
    pub input_mint: String,
    /// Output token mint address
    pub output_mint: String,
    /// Amount in base units of the input (ExactIn) or output (ExactOut) token
    pub amount: u64,
    /// Slippage tolerance in basis points (1 = 0.01%)
    pub slippage_bps: u16,
    #[serde(default)]
    pub swap_mode: SwapMode,
    /// Only use direct routes (no intermediate tokens)
    #[serde(default)]
    pub only_direct_routes: bool,
}

impl QuoteRequest {
    /// Create an ExactIn quote request
    pub fn new(input_mint: String, output_mint: String, amount: u64, slippage_bps: u16) -> Self {
        Self {
            input_mint,
            output_mint,
            amount,
            slippage_bps,
            swap_mode: SwapMode::ExactIn,
            only_direct_routes: false,
        }
    }

    pub fn with_swap_mode(mut self, mode: SwapMode) -> Self {
        self.swap_mode = mode;
        self
    }

    pub fn with_direct_routes(mut self, direct: bool) -> Self {
        self.only_direct_routes = direct;
        self
    }

    /// Query string pairs in the API's parameter names
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("inputMint", self.input_mint.clone()),
            ("outputMint", self.output_mint.clone()),
            ("amount", self.amount.to_string()),
            ("slippageBps", self.slippage_bps.to_string()),
            ("swapMode", self.swap_mode.to_string()),
        ];
        if self.only_direct_routes {
            pairs.push(("onlyDirectRoutes", "true".to_string()));
        }
        pairs
    }
}

/// Response from the Jupiter quote API.
///
/// Passed back verbatim to `/swap`, so unknown fields are kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub input_mint: String,
    pub output_mint: String,
    /// Input amount in base units
    pub in_amount: String,
    /// Output amount in base units
    pub out_amount: String,
    /// Slippage bound: minimum out (ExactIn) or maximum in (ExactOut)
    pub other_amount_threshold: String,
    pub swap_mode: SwapMode,
    pub slippage_bps: u16,
    #[serde(default)]
    pub price_impact_pct: String,
    #[serde(flatten)]
    pub extra: std::collections::HashMap<String, serde_json::Value>,
}

impl QuoteResponse {
    pub fn input_amount(&self) -> u64 {
        self.in_amount.parse().unwrap_or(0)
    }

    pub fn output_amount(&self) -> u64 {
        self.out_amount.parse().unwrap_or(0)
    }

    /// Price impact as a percentage
    pub fn price_impact(&self) -> f64 {
        self.price_impact_pct.parse().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL: &str = "So11111111111111111111111111111111111111112";
    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    #[test]
    fn test_quote_request_defaults_to_exact_in() {
        let req = QuoteRequest::new(SOL.to_string(), USDC.to_string(), 1_000_000_000, 50);
        assert_eq!(req.swap_mode, SwapMode::ExactIn);
        assert!(!req.only_direct_routes);
    }

    #[test]
    fn test_query_pairs() {
        let req = QuoteRequest::new(USDC.to_string(), SOL.to_string(), 2_000_000_000, 100)
            .with_swap_mode(SwapMode::ExactOut)
            .with_direct_routes(true);
        let pairs = req.query_pairs();

        assert!(pairs.contains(&("swapMode", "ExactOut".to_string())));
        assert!(pairs.contains(&("amount", "2000000000".to_string())));
        assert!(pairs.contains(&("onlyDirectRoutes", "true".to_string())));
    }

    #[test]
    fn test_quote_response_parsing_keeps_route() {
        let json = r#"{
            "inputMint": "So11111111111111111111111111111111111111112",
            "outputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "inAmount": "1000000000",
            "outAmount": "150000000",
            "otherAmountThreshold": "149250000",
            "swapMode": "ExactIn",
            "slippageBps": 50,
            "priceImpactPct": "0.12",
            "routePlan": [{"swapInfo": {"label": "Orca"}, "percent": 100}]
        }"#;

        let quote: QuoteResponse = serde_json::from_str(json).unwrap();
        assert_eq!(quote.input_amount(), 1_000_000_000);
        assert_eq!(quote.output_amount(), 150_000_000);
        assert!((quote.price_impact() - 0.12).abs() < 0.001);
        assert!(quote.extra.contains_key("routePlan"));

        let echoed = serde_json::to_value(&quote).unwrap();
        assert_eq!(echoed["routePlan"][0]["percent"], 100);
        assert_eq!(echoed["swapMode"], "ExactIn");
    }
}
