//! Application Layer
//!
//! Use cases that wire strategy logic to the outside world through ports.

pub mod service;

pub use service::{
    RebalanceOutcome, RebalanceProposal, RebalanceRequest, ServiceError, TradeReceipt, TradingService,
};
