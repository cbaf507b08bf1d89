//! Paper trading: instructions are logged, never submitted.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{TradeInstruction, TradeKind, TransactionId};
use crate::ports::execution::{ExecutionError, ExecutionPort};

#[derive(Debug, Clone, Default)]
pub struct PaperExecutor;

impl PaperExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExecutionPort for PaperExecutor {
    async fn submit_trade(&self, instruction: &TradeInstruction) -> Result<TransactionId, ExecutionError> {
        if instruction.kind == TradeKind::NoOp {
            return Err(ExecutionError::InvalidInstruction("nothing to submit for a no-op".into()));
        }
        if instruction.amount <= Decimal::ZERO {
            return Err(ExecutionError::InvalidInstruction(format!(
                "amount must be positive: {}",
                instruction
            )));
        }

        let id = TransactionId::new(format!("paper-{:016x}", rand::random::<u64>()));
        tracing::info!("PAPER TRADE - {} ({})", instruction, id);
        Ok(id)
    }
}
