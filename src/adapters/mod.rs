//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Jupiter: DEX aggregator quote and swap API client
//! - Solana: RPC client, wallet, holdings and trade execution
//! - Market Data: spot prices and price history
//! - Paper: simulated execution
//! - Journal: CSV log of submitted trades
//! - CLI: Command-line interface definitions

pub mod cli;
pub mod journal;
pub mod jupiter;
pub mod market_data;
pub mod paper;
pub mod solana;

pub use cli::CliApp;
pub use journal::{JournalEntry, JournalError, TradeJournal};
pub use jupiter::JupiterClient;
pub use market_data::{JupiterPriceClient, PriceHistoryClient};
pub use paper::PaperExecutor;
pub use solana::{SolanaClient, SolanaExecutor, WalletHoldings, WalletManager};
