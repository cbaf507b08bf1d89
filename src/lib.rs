//! Trend Rebalancer Library
//!
//! Scores the recent trend of a token and rebalances a two-asset Solana
//! portfolio toward a target allocation through Jupiter, damping
//! corrections that would trade against a strong trend.
//!
//! # Modules
//!
//! - `domain`: Core types (PriceSeries, TrendSignal, Portfolio, TradeInstruction, Tokens)
//! - `ports`: Trait abstractions (PriceHistoryPort, HoldingsPort, PricePort, ExecutionPort)
//! - `strategy`: Trend analysis and rebalance planning
//! - `adapters`: External implementations (Jupiter, Solana, price history, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Trading service use cases

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod strategy;
