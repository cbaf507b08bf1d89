//! Market Data Adapters
//!
//! External price sources:
//! - `JupiterPriceClient`: spot USD prices from the Jupiter price API
//! - `PriceHistoryClient`: historical series from a CoinGecko-style API

mod jupiter_price;
mod price_history;

pub use jupiter_price::{JupiterPriceClient, JUPITER_PRICE_API};
pub use price_history::{MarketChart, PriceHistoryClient, PriceHistoryConfig};
