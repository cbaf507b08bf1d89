//! Domain Layer - Value types for the analysis and rebalance engine
//!
//! Pure, request-scoped types with no I/O. Everything the analyzer and
//! planner consume or produce lives here; the chain is reached only
//! through the ports layer.

pub mod price_series;
pub mod signal;
pub mod portfolio;
pub mod trade;
pub mod token;

pub use price_series::{Interval, PricePoint, PriceSeries, SeriesError};
pub use signal::{TrendDirection, TrendSignal};
pub use portfolio::{AllocationTarget, Holding, PortfolioSnapshot};
pub use trade::{TradeInstruction, TradeKind, TransactionId};
pub use token::{TokenError, TokenInfo, TokenRegistry, NATIVE_SOL_DECIMALS, NATIVE_SOL_MINT};
