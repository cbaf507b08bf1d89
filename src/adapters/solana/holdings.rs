//! Wallet balances as a `HoldingsPort`

use std::sync::Arc;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use super::rpc::{parse_pubkey, SolanaClient};
use crate::domain::{Holding, TokenRegistry};
use crate::ports::market_data::{HoldingsPort, MarketDataError};

/// Reads SOL and SPL token balances of one wallet
#[derive(Clone)]
pub struct WalletHoldings {
    rpc: SolanaClient,
    owner: Pubkey,
    registry: Arc<TokenRegistry>,
}

impl WalletHoldings {
    pub fn new(rpc: SolanaClient, owner: Pubkey, registry: Arc<TokenRegistry>) -> Self {
        Self { rpc, owner, registry }
    }

    pub fn owner(&self) -> Pubkey {
        self.owner
    }
}

#[async_trait]
impl HoldingsPort for WalletHoldings {
    async fn fetch_holding(&self, asset: &str) -> Result<Holding, MarketDataError> {
        let token = self
            .registry
            .resolve(asset)
            .map_err(|e| MarketDataError::quote_unavailable(asset, e))?;

        let units = if token.is_native_sol() {
            self.rpc.get_balance(self.owner).await
        } else {
            let mint = parse_pubkey(&token.mint).map_err(|e| MarketDataError::quote_unavailable(asset, e))?;
            self.rpc.get_token_balance(self.owner, mint).await
        }
        .map_err(|e| MarketDataError::quote_unavailable(asset, e))?;

        let amount = token.from_base_units(units);
        tracing::debug!("Balance of {} for {}: {}", token.symbol, self.owner, amount);
        Ok(Holding::new(asset, amount))
    }
}
