//! On-chain trade execution.
//!
//! Buy/Sell/Swap go through a Jupiter quote and swap transaction, signed by
//! the local wallet. Send is a plain native SOL transfer.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::rpc::{parse_pubkey, SolanaClient};
use super::wallet::WalletManager;
use crate::adapters::jupiter::{JupiterClient, QuoteRequest, SwapMode, SwapRequest};
use crate::domain::{TokenInfo, TokenRegistry, TradeInstruction, TradeKind, TransactionId};
use crate::ports::execution::{ExecutionError, ExecutionPort};

/// Token pair, direction and base-unit amount of one Jupiter swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRoute {
    pub input: TokenInfo,
    pub output: TokenInfo,
    pub amount: u64,
    pub mode: SwapMode,
}

pub struct SolanaExecutor {
    rpc: SolanaClient,
    jupiter: JupiterClient,
    wallet: Arc<WalletManager>,
    registry: Arc<TokenRegistry>,
    /// Settlement token when an instruction names no counterparty
    quote_token: TokenInfo,
}

impl SolanaExecutor {
    pub fn new(
        rpc: SolanaClient,
        jupiter: JupiterClient,
        wallet: Arc<WalletManager>,
        registry: Arc<TokenRegistry>,
        quote_token: TokenInfo,
    ) -> Self {
        Self {
            rpc,
            jupiter,
            wallet,
            registry,
            quote_token,
        }
    }

    fn resolve(&self, asset: &str) -> Result<TokenInfo, ExecutionError> {
        self.registry
            .resolve(asset)
            .cloned()
            .map_err(|_| ExecutionError::UnknownAsset(asset.to_string()))
    }

    fn counterparty(&self, instruction: &TradeInstruction) -> Result<TokenInfo, ExecutionError> {
        match instruction.counterparty {
            Some(ref cp) => self.resolve(cp),
            None => Ok(self.quote_token.clone()),
        }
    }

    /// Work out which swap fulfils a Buy, Sell or Swap instruction.
    ///
    /// Buy fixes the amount received (ExactOut); Sell and Swap fix the amount
    /// spent (ExactIn).
    pub fn swap_route(&self, instruction: &TradeInstruction) -> Result<SwapRoute, ExecutionError> {
        if instruction.amount <= Decimal::ZERO {
            return Err(ExecutionError::InvalidInstruction(format!(
                "amount must be positive: {}",
                instruction
            )));
        }

        let asset = self.resolve(&instruction.asset)?;
        let (input, output, fixed) = match instruction.kind {
            TradeKind::Buy => {
                let pay_with = self.counterparty(instruction)?;
                (pay_with, asset.clone(), asset)
            }
            TradeKind::Sell => {
                let receive = self.counterparty(instruction)?;
                (asset.clone(), receive, asset)
            }
            TradeKind::Swap => {
                if instruction.counterparty.is_none() {
                    return Err(ExecutionError::InvalidInstruction(
                        "swap requires a counterparty asset".into(),
                    ));
                }
                let into = self.counterparty(instruction)?;
                (asset.clone(), into, asset)
            }
            TradeKind::Send | TradeKind::NoOp => {
                return Err(ExecutionError::InvalidInstruction(format!(
                    "{} is not a swap",
                    instruction.kind
                )))
            }
        };

        if input.mint == output.mint {
            return Err(ExecutionError::InvalidInstruction(format!(
                "cannot swap {} into itself",
                input.symbol
            )));
        }

        let amount = fixed
            .to_base_units(instruction.amount)
            .map_err(|e| ExecutionError::InvalidInstruction(e.to_string()))?;
        if amount == 0 {
            return Err(ExecutionError::InvalidInstruction(format!(
                "{} {} is below one base unit",
                instruction.amount, fixed.symbol
            )));
        }

        let mode = match instruction.kind {
            TradeKind::Buy => SwapMode::ExactOut,
            _ => SwapMode::ExactIn,
        };

        Ok(SwapRoute {
            input,
            output,
            amount,
            mode,
        })
    }

    async fn execute_swap(&self, route: SwapRoute) -> Result<TransactionId, ExecutionError> {
        let request = QuoteRequest::new(
            route.input.mint.clone(),
            route.output.mint.clone(),
            route.amount,
            self.jupiter.slippage_bps(),
        )
        .with_swap_mode(route.mode);

        let quote = self.jupiter.get_quote(&request).await?;
        tracing::info!(
            "Quote {} -> {}: in {} out {} (impact {}%)",
            route.input.symbol,
            route.output.symbol,
            quote.in_amount,
            quote.out_amount,
            quote.price_impact_pct
        );

        let quote_value = serde_json::to_value(&quote)
            .map_err(|e| ExecutionError::ApiError(format!("Failed to encode quote: {}", e)))?;
        let swap = self
            .jupiter
            .get_swap_transaction(&SwapRequest::new(self.wallet.pubkey().to_string(), quote_value))
            .await?;

        let unsigned = swap
            .decode_transaction()
            .map_err(|e| ExecutionError::ApiError(e.to_string()))?;
        let signed = self
            .wallet
            .sign_versioned(unsigned)
            .map_err(|e| ExecutionError::SigningError(e.to_string()))?;

        let signature = self
            .rpc
            .send_and_confirm_versioned(signed)
            .await
            .map_err(|e| ExecutionError::SubmissionFailed(e.to_string()))?;

        Ok(TransactionId::new(signature.to_string()))
    }

    async fn execute_send(&self, instruction: &TradeInstruction) -> Result<TransactionId, ExecutionError> {
        let asset = self.resolve(&instruction.asset)?;
        if !asset.is_native_sol() {
            return Err(ExecutionError::InvalidInstruction(format!(
                "only native SOL can be sent, got {}",
                asset.symbol
            )));
        }
        let recipient = instruction
            .recipient
            .as_deref()
            .ok_or_else(|| ExecutionError::InvalidInstruction("send requires a recipient".into()))?;
        let recipient = parse_pubkey(recipient).map_err(|e| ExecutionError::InvalidInstruction(e.to_string()))?;

        let lamports = asset
            .to_base_units(instruction.amount)
            .map_err(|e| ExecutionError::InvalidInstruction(e.to_string()))?;
        if lamports == 0 {
            return Err(ExecutionError::InvalidInstruction("send amount must be positive".into()));
        }

        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| ExecutionError::SubmissionFailed(e.to_string()))?;
        let tx = self.wallet.sign_transfer(&recipient, lamports, blockhash);

        let signature = self
            .rpc
            .send_and_confirm(tx)
            .await
            .map_err(|e| ExecutionError::SubmissionFailed(e.to_string()))?;

        Ok(TransactionId::new(signature.to_string()))
    }
}

#[async_trait]
impl ExecutionPort for SolanaExecutor {
    async fn submit_trade(&self, instruction: &TradeInstruction) -> Result<TransactionId, ExecutionError> {
        tracing::info!("Submitting {} from {}", instruction, self.wallet.pubkey());

        let result = match instruction.kind {
            TradeKind::NoOp => Err(ExecutionError::InvalidInstruction("nothing to submit for a no-op".into())),
            TradeKind::Send => self.execute_send(instruction).await,
            TradeKind::Buy | TradeKind::Sell | TradeKind::Swap => {
                let route = self.swap_route(instruction)?;
                self.execute_swap(route).await
            }
        };

        match &result {
            Ok(id) => tracing::info!("Confirmed {}: {}", instruction, id),
            Err(e) => tracing::error!("Failed to execute {}: {}", instruction, e),
        }
        result
    }
}
