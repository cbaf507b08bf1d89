//! Ports Layer - Trait definitions for external dependencies
//!
//! The analysis and rebalance core never touches the network. Everything it
//! needs from outside arrives through these traits:
//! - Price history and spot prices
//! - Wallet holdings
//! - Trade execution

pub mod market_data;
pub mod execution;
pub mod mocks;

pub use market_data::{HoldingsPort, MarketDataError, PriceHistoryPort, PricePort};
pub use execution::{ExecutionError, ExecutionPort};
