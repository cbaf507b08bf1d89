use std::fs;
use std::path::Path;

use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::{Transaction, VersionedTransaction},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Failed to load keypair from file: {0}")]
    LoadError(String),
    #[error("Failed to sign transaction: {0}")]
    SigningError(String),
    #[error("Invalid keypair bytes: {0}")]
    InvalidKeypair(String),
}

/// Holds the signing keypair for the configured wallet
pub struct WalletManager {
    keypair: Keypair,
}

impl WalletManager {
    /// Load keypair from a file path (JSON array of bytes, as written by
    /// `solana-keygen`)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            WalletError::LoadError(format!("{}: {}", path.as_ref().display(), e))
        })?;

        let bytes: Vec<u8> = serde_json::from_str(&contents)
            .map_err(|e| WalletError::LoadError(format!("Invalid JSON format: {}", e)))?;

        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let keypair = Keypair::try_from(bytes).map_err(|e| WalletError::InvalidKeypair(e.to_string()))?;
        Ok(Self { keypair })
    }

    /// Create a new random keypair (for testing)
    pub fn new_random() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.keypair.to_bytes().to_vec()
    }

    /// Sign an unsigned transaction built elsewhere (e.g. by Jupiter)
    pub fn sign_versioned(&self, unsigned: VersionedTransaction) -> Result<VersionedTransaction, WalletError> {
        VersionedTransaction::try_new(unsigned.message, &[&self.keypair])
            .map_err(|e| WalletError::SigningError(e.to_string()))
    }

    /// Build and sign a native SOL transfer
    pub fn sign_transfer(&self, recipient: &Pubkey, lamports: u64, recent_blockhash: Hash) -> Transaction {
        let instruction = system_instruction::transfer(&self.keypair.pubkey(), recipient, lamports);
        Transaction::new_signed_with_payer(
            &[instruction],
            Some(&self.keypair.pubkey()),
            &[&self.keypair],
            recent_blockhash,
        )
    }
}

impl Clone for WalletManager {
    fn clone(&self) -> Self {
        Self {
            keypair: self.keypair.insecure_clone(),
        }
    }
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager")
            .field("pubkey", &self.pubkey())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::message::{v0, VersionedMessage};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_bytes() {
        let wallet1 = WalletManager::new_random();
        let wallet2 = WalletManager::from_bytes(&wallet1.to_bytes()).unwrap();
        assert_eq!(wallet1.pubkey(), wallet2.pubkey());

        assert!(matches!(
            WalletManager::from_bytes(&[0u8; 10]),
            Err(WalletError::InvalidKeypair(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let wallet1 = WalletManager::new_random();
        let mut temp_file = NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&wallet1.to_bytes()).unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let wallet2 = WalletManager::from_file(temp_file.path()).unwrap();
        assert_eq!(wallet1.pubkey(), wallet2.pubkey());
    }

    #[test]
    fn test_invalid_json_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"not valid json").unwrap();
        temp_file.flush().unwrap();

        assert!(matches!(
            WalletManager::from_file(temp_file.path()),
            Err(WalletError::LoadError(_))
        ));
    }

    #[test]
    fn test_sign_versioned() {
        let wallet = WalletManager::new_random();
        let message = v0::Message::try_compile(&wallet.pubkey(), &[], &[], Hash::new_unique()).unwrap();
        let unsigned = VersionedTransaction {
            signatures: vec![Default::default()],
            message: VersionedMessage::V0(message),
        };

        let signed = wallet.sign_versioned(unsigned).unwrap();
        assert_eq!(signed.signatures.len(), 1);
        assert!(signed.verify_with_results().iter().all(|ok| *ok));
    }

    #[test]
    fn test_sign_versioned_rejects_foreign_payer() {
        let wallet = WalletManager::new_random();
        let other = Pubkey::new_unique();
        let message = v0::Message::try_compile(&other, &[], &[], Hash::new_unique()).unwrap();
        let unsigned = VersionedTransaction {
            signatures: vec![Default::default()],
            message: VersionedMessage::V0(message),
        };
        assert!(matches!(wallet.sign_versioned(unsigned), Err(WalletError::SigningError(_))));
    }

    #[test]
    fn test_sign_transfer() {
        let wallet = WalletManager::new_random();
        let recipient = Pubkey::new_unique();
        let tx = wallet.sign_transfer(&recipient, 1_000, Hash::new_unique());

        assert!(tx.is_signed());
        assert_eq!(tx.message.account_keys[0], wallet.pubkey());
        assert!(tx.message.account_keys.contains(&recipient));
    }

    #[test]
    fn test_clone_and_debug() {
        let wallet = WalletManager::new_random();
        let copy = wallet.clone();
        assert_eq!(wallet.pubkey(), copy.pubkey());
        assert!(format!("{:?}", wallet).contains(&wallet.pubkey().to_string()));
    }
}
