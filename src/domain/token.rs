//! Token registry and base-unit conversion.
//!
//! The core works in whole-token decimals; the chain works in integer base
//! units (lamports, micro-USDC, ...). Every crossing between the two goes
//! through this module.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wrapped SOL mint, also used to mean native SOL
pub const NATIVE_SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const NATIVE_SOL_DECIMALS: u8 = 9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TokenError {
    #[error("Unknown token: {0}")]
    Unknown(String),
    #[error("Amount {amount} cannot be represented with {decimals} decimals")]
    Unrepresentable { amount: Decimal, decimals: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub mint: String,
    pub decimals: u8,
}

impl TokenInfo {
    pub fn new(symbol: impl Into<String>, mint: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            mint: mint.into(),
            decimals,
        }
    }

    pub fn native_sol() -> Self {
        Self::new("SOL", NATIVE_SOL_MINT, NATIVE_SOL_DECIMALS)
    }

    pub fn is_native_sol(&self) -> bool {
        self.mint == NATIVE_SOL_MINT
    }

    /// Whole tokens -> base units, truncating sub-unit dust
    pub fn to_base_units(&self, amount: Decimal) -> Result<u64, TokenError> {
        if amount.is_sign_negative() {
            return Err(TokenError::Unrepresentable {
                amount,
                decimals: self.decimals,
            });
        }
        let scale = Decimal::from(10u64.pow(self.decimals as u32));
        amount
            .checked_mul(scale)
            .and_then(|v| v.trunc().to_u64())
            .ok_or(TokenError::Unrepresentable {
                amount,
                decimals: self.decimals,
            })
    }

    /// Base units -> whole tokens
    pub fn from_base_units(&self, units: u64) -> Decimal {
        let mut value = Decimal::from(units);
        match value.set_scale(self.decimals as u32) {
            Ok(()) => value.normalize(),
            Err(_) => Decimal::from(units) / Decimal::from(10u64.pow(self.decimals as u32)),
        }
    }
}

/// Lookup of known tokens by symbol (case-insensitive) or mint address
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<TokenInfo>,
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TokenRegistry {
    /// Registry seeded with native SOL; later entries with the same symbol
    /// or mint replace earlier ones.
    pub fn new(tokens: impl IntoIterator<Item = TokenInfo>) -> Self {
        let mut registry = Self {
            tokens: vec![TokenInfo::native_sol()],
        };
        for token in tokens {
            registry.insert(token);
        }
        registry
    }

    pub fn insert(&mut self, token: TokenInfo) {
        self.tokens
            .retain(|t| t.mint != token.mint && !t.symbol.eq_ignore_ascii_case(&token.symbol));
        self.tokens.push(token);
    }

    pub fn resolve(&self, symbol_or_mint: &str) -> Result<&TokenInfo, TokenError> {
        self.tokens
            .iter()
            .find(|t| t.mint == symbol_or_mint || t.symbol.eq_ignore_ascii_case(symbol_or_mint))
            .ok_or_else(|| TokenError::Unknown(symbol_or_mint.to_string()))
    }

    pub fn tokens(&self) -> &[TokenInfo] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn registry() -> TokenRegistry {
        TokenRegistry::new(vec![TokenInfo::new("USDC", USDC_MINT, 6)])
    }

    #[test]
    fn test_resolve_by_symbol_and_mint() {
        let reg = registry();
        assert_eq!(reg.resolve("usdc").unwrap().mint, USDC_MINT);
        assert_eq!(reg.resolve(USDC_MINT).unwrap().symbol, "USDC");
        assert!(reg.resolve("SOL").unwrap().is_native_sol());
        assert_eq!(reg.resolve("BONK"), Err(TokenError::Unknown("BONK".to_string())));
    }

    #[test]
    fn test_default_registry_knows_sol() {
        let reg = TokenRegistry::default();
        assert_eq!(reg.tokens(), &[TokenInfo::native_sol()]);
        assert!(reg.resolve("sol").unwrap().is_native_sol());
    }

    #[test]
    fn test_insert_replaces_same_symbol() {
        let mut reg = registry();
        reg.insert(TokenInfo::new("USDC", "OtherMint", 6));
        assert_eq!(reg.resolve("USDC").unwrap().mint, "OtherMint");
        assert_eq!(reg.tokens().len(), 2);
    }

    #[test]
    fn test_to_base_units() {
        let sol = TokenInfo::native_sol();
        assert_eq!(sol.to_base_units(dec!(1.5)).unwrap(), 1_500_000_000);
        // dust below one lamport is truncated
        assert_eq!(sol.to_base_units(dec!(0.0000000019)).unwrap(), 1);
        assert!(sol.to_base_units(dec!(-1)).is_err());
    }

    #[test]
    fn test_from_base_units() {
        let usdc = TokenInfo::new("USDC", USDC_MINT, 6);
        assert_eq!(usdc.from_base_units(150_250_000), dec!(150.25));
        assert_eq!(usdc.from_base_units(0), dec!(0));
    }
}
