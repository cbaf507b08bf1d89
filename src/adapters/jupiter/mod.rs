//! Jupiter Adapter
//!
//! Quote and swap-transaction building against the Jupiter DEX aggregator.

mod client;
mod quote;
mod swap;

pub use client::{JupiterClient, JupiterConfig};
pub use quote::{QuoteRequest, QuoteResponse, SwapMode};
pub use swap::{SwapDecodeError, SwapRequest, SwapResponse};
