//! Jupiter Swap Types
//!
//! Request and response structures for the Jupiter swap API, which turns a
//! quote into an unsigned transaction for the wallet to sign.

use base64::Engine;
use serde::{Deserialize, Serialize};
use solana_sdk::transaction::VersionedTransaction;

/// Request parameters for building a swap transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// Wallet address that signs and pays
    pub user_public_key: String,
    /// The full quote response from /quote
    pub quote_response: serde_json::Value,
    /// Wrap/unwrap SOL automatically so native SOL can be swapped
    #[serde(default = "default_true")]
    pub wrap_and_unwrap_sol: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioritization_fee_lamports: Option<u64>,
    #[serde(default = "default_true")]
    pub dynamic_compute_unit_limit: bool,
}

fn default_true() -> bool {
    true
}

impl SwapRequest {
    pub fn new(user_public_key: String, quote_response: serde_json::Value) -> Self {
        Self {
            user_public_key,
            quote_response,
            wrap_and_unwrap_sol: true,
            prioritization_fee_lamports: None,
            dynamic_compute_unit_limit: true,
        }
    }

    pub fn with_priority_fee(mut self, lamports: u64) -> Self {
        self.prioritization_fee_lamports = Some(lamports);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SwapDecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid transaction bytes: {0}")]
    Transaction(#[from] bincode::Error),
}

/// Response from the Jupiter swap API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    /// Base64 encoded serialized transaction ready to sign and send
    pub swap_transaction: String,
    pub last_valid_block_height: u64,
    #[serde(default)]
    pub prioritization_fee_lamports: u64,
}

impl SwapResponse {
    /// Get the transaction bytes from base64
    pub fn transaction_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.swap_transaction)
    }

    /// Decode the unsigned transaction
    pub fn decode_transaction(&self) -> Result<VersionedTransaction, SwapDecodeError> {
        let bytes = self.transaction_bytes()?;
        Ok(bincode::deserialize(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::message::{v0, VersionedMessage};
    use solana_sdk::hash::Hash;
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;

    #[test]
    fn test_swap_request_serialization() {
        let req = SwapRequest::new(
            "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".to_string(),
            serde_json::json!({"inAmount": "1"}),
        )
        .with_priority_fee(5000);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["userPublicKey"], "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
        assert_eq!(json["wrapAndUnwrapSol"], true);
        assert_eq!(json["prioritizationFeeLamports"], 5000);
        assert_eq!(json["quoteResponse"]["inAmount"], "1");
    }

    #[test]
    fn test_decode_transaction() {
        let payer = Keypair::new();
        let message = v0::Message::try_compile(&payer.pubkey(), &[], &[], Hash::default()).unwrap();
        let tx = VersionedTransaction {
            signatures: vec![Default::default()],
            message: VersionedMessage::V0(message),
        };
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(bincode::serialize(&tx).unwrap());

        let response = SwapResponse {
            swap_transaction: encoded,
            last_valid_block_height: 100,
            prioritization_fee_lamports: 0,
        };
        let decoded = response.decode_transaction().unwrap();
        assert_eq!(decoded.message.static_account_keys()[0], payer.pubkey());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let response = SwapResponse {
            swap_transaction: "not base64!".to_string(),
            last_valid_block_height: 0,
            prioritization_fee_lamports: 0,
        };
        assert!(matches!(response.decode_transaction(), Err(SwapDecodeError::Base64(_))));
    }
}
