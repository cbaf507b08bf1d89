use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{TradeInstruction, TransactionId};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("API request failed: {0}")]
    ApiError(String),
    #[error("Transaction signing failed: {0}")]
    SigningError(String),
    #[error("Transaction submission failed: {0}")]
    SubmissionFailed(String),
    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),
}

/// Submits trades to the chain.
///
/// Implementations must not resubmit on failure: without idempotency from
/// the chain layer a retried trade can execute twice.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionPort: Send + Sync {
    async fn submit_trade(
        &self,
        instruction: &TradeInstruction,
    ) -> Result<TransactionId, ExecutionError>;
}
