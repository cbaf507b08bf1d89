use std::str::FromStr;
use std::sync::Arc;

use solana_client::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, VersionedTransaction},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolanaClientError {
    #[error("RPC request failed: {0}")]
    RpcError(String),
    #[error("Transaction failed: {0}")]
    TransactionError(String),
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Parse a base58 address
pub fn parse_pubkey(address: &str) -> Result<Pubkey, SolanaClientError> {
    Pubkey::from_str(address).map_err(|e| SolanaClientError::InvalidPublicKey(format!("{}: {}", address, e)))
}

/// Parse a commitment level name ("processed", "confirmed", "finalized")
pub fn parse_commitment(level: &str) -> CommitmentConfig {
    match level.to_ascii_lowercase().as_str() {
        "processed" => CommitmentConfig::processed(),
        "finalized" => CommitmentConfig::finalized(),
        _ => CommitmentConfig::confirmed(),
    }
}

/// Async wrapper around the blocking Solana RPC client.
///
/// Every call runs on the blocking pool so the runtime threads stay free.
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
}

impl SolanaClient {
    pub fn new(rpc_url: String, commitment: CommitmentConfig) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(rpc_url, commitment));
        Self { client }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    async fn blocking<T, F>(&self, call: F) -> Result<T, SolanaClientError>
    where
        T: Send + 'static,
        F: FnOnce(&RpcClient) -> Result<T, SolanaClientError> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || call(&client))
            .await
            .map_err(|e| SolanaClientError::RpcError(format!("Task join error: {}", e)))?
    }

    /// Native SOL balance in lamports
    pub async fn get_balance(&self, owner: Pubkey) -> Result<u64, SolanaClientError> {
        self.blocking(move |client| {
            client
                .get_balance(&owner)
                .map_err(|e| SolanaClientError::RpcError(e.to_string()))
        })
        .await
    }

    /// Total balance of `mint` across the owner's token accounts, in base units
    pub async fn get_token_balance(&self, owner: Pubkey, mint: Pubkey) -> Result<u64, SolanaClientError> {
        self.blocking(move |client| {
            let accounts = client
                .get_token_accounts_by_owner(&owner, TokenAccountsFilter::Mint(mint))
                .map_err(|e| SolanaClientError::RpcError(e.to_string()))?;

            let mut total: u64 = 0;
            for account in accounts {
                let address = parse_pubkey(&account.pubkey)?;
                let balance = client
                    .get_token_account_balance(&address)
                    .map_err(|e| SolanaClientError::RpcError(e.to_string()))?;
                let amount = balance
                    .amount
                    .parse::<u64>()
                    .map_err(|e| SolanaClientError::RpcError(format!("Parse error: {}", e)))?;
                total = total.saturating_add(amount);
            }
            Ok(total)
        })
        .await
    }

    pub async fn get_latest_blockhash(&self) -> Result<Hash, SolanaClientError> {
        self.blocking(|client| {
            client
                .get_latest_blockhash()
                .map_err(|e| SolanaClientError::RpcError(e.to_string()))
        })
        .await
    }

    /// Submit a signed legacy transaction and wait for confirmation
    pub async fn send_and_confirm(&self, transaction: Transaction) -> Result<Signature, SolanaClientError> {
        self.blocking(move |client| {
            client
                .send_and_confirm_transaction(&transaction)
                .map_err(|e| SolanaClientError::TransactionError(e.to_string()))
        })
        .await
    }

    /// Submit a signed versioned transaction and wait for confirmation
    pub async fn send_and_confirm_versioned(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<Signature, SolanaClientError> {
        self.blocking(move |client| {
            client
                .send_and_confirm_transaction(&transaction)
                .map_err(|e| SolanaClientError::TransactionError(e.to_string()))
        })
        .await
    }
}
