pub mod rpc;
pub mod wallet;
pub mod holdings;
pub mod executor;

pub use rpc::{parse_commitment, SolanaClient, SolanaClientError};
pub use wallet::{WalletError, WalletManager};
pub use holdings::WalletHoldings;
pub use executor::{SolanaExecutor, SwapRoute};
