//! Configuration Loader
//!
//! Loads and validates configuration from a TOML file. Endpoints and secrets
//! can be overridden from the environment (see the `get_*` accessors).

use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use thiserror::Error;

use crate::adapters::jupiter::JupiterConfig;
use crate::adapters::market_data::{PriceHistoryConfig, JUPITER_PRICE_API};
use crate::domain::{Interval, TokenInfo, TokenRegistry};
use crate::strategy::params::{AnalyzerConfig, InsightConfig, PlannerConfig, StrategyConfig};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub rebalance: RebalanceSection,
    #[serde(default)]
    pub insights: InsightsSection,
    pub tokens: TokensSection,
    #[serde(default)]
    pub jupiter: JupiterSection,
    #[serde(default)]
    pub price_history: PriceHistorySection,
    pub solana: SolanaSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub journal: JournalSection,
}

/// Trend analysis knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// |net return| treated as noise
    pub deadband: f64,
    /// Net return scored 100 when volatility is negligible
    pub cap_return: f64,
    /// Score points per unit of |net return| / volatility
    pub scale_factor: f64,
    pub volatility_epsilon: f64,
    /// Dead zone for early/late momentum
    pub momentum_epsilon: f64,
    /// History window used by `rebalance`
    pub lookback_days: u32,
    pub interval: Interval,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        let analyzer = AnalyzerConfig::default();
        let strategy = StrategyConfig::default();
        Self {
            deadband: analyzer.deadband,
            cap_return: analyzer.cap_return,
            scale_factor: analyzer.scale_factor,
            volatility_epsilon: analyzer.volatility_epsilon,
            momentum_epsilon: analyzer.momentum_epsilon,
            lookback_days: strategy.lookback_days,
            interval: strategy.interval,
        }
    }
}

/// Rebalance planner knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RebalanceSection {
    /// Default value share of the first token
    pub target_ratio: Decimal,
    /// Allowed deviation before trading
    pub tolerance: Decimal,
    /// Trade the pair directly instead of selling to the quote token
    pub prefer_swap: bool,
}

impl Default for RebalanceSection {
    fn default() -> Self {
        Self {
            target_ratio: dec!(0.5),
            tolerance: dec!(0.02),
            prefer_swap: true,
        }
    }
}

/// Moving-average insights over the trade journal
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsightsSection {
    /// Recent trades per asset in the average
    pub window: usize,
    /// Relative distance from the average that raises a flag
    pub threshold: Decimal,
}

impl Default for InsightsSection {
    fn default() -> Self {
        let defaults = InsightConfig::default();
        Self {
            window: defaults.window,
            threshold: defaults.threshold,
        }
    }
}

/// Known tokens and the settlement token
#[derive(Debug, Clone, Deserialize)]
pub struct TokensSection {
    /// Symbol or mint of the token used to pay for buys and receive sells
    pub quote_mint: String,
    /// Additional tokens; SOL is always known
    #[serde(default)]
    pub registry: Vec<TokenInfo>,
}

/// Jupiter API configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JupiterSection {
    /// Swap API base URL
    pub api_url: String,
    /// Price API URL
    pub price_api_url: String,
    /// Optional API key (falls back to JUPITER_API_KEY)
    pub api_key: Option<String>,
    /// Slippage tolerance in basis points
    pub slippage_bps: u16,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for JupiterSection {
    fn default() -> Self {
        let defaults = JupiterConfig::default();
        Self {
            api_url: defaults.api_base_url,
            price_api_url: JUPITER_PRICE_API.to_string(),
            api_key: None,
            slippage_bps: defaults.slippage_bps,
            timeout_secs: defaults.timeout.as_secs(),
            max_retries: defaults.max_retries,
        }
    }
}

impl JupiterSection {
    /// Config value if set and non-empty, else JUPITER_API_KEY
    pub fn get_api_key(&self) -> Option<String> {
        non_empty(self.api_key.as_deref()).or_else(|| std::env::var("JUPITER_API_KEY").ok())
    }
}

/// Historical price API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriceHistorySection {
    pub api_url: String,
    /// Optional API key (falls back to PRICE_HISTORY_API_KEY)
    pub api_key: Option<String>,
    pub platform: String,
    pub native_coin_id: String,
    pub vs_currency: String,
}

impl Default for PriceHistorySection {
    fn default() -> Self {
        let defaults = PriceHistoryConfig::default();
        Self {
            api_url: defaults.api_url,
            api_key: None,
            platform: defaults.platform,
            native_coin_id: defaults.native_coin_id,
            vs_currency: defaults.vs_currency,
        }
    }
}

impl PriceHistorySection {
    pub fn get_api_key(&self) -> Option<String> {
        non_empty(self.api_key.as_deref()).or_else(|| std::env::var("PRICE_HISTORY_API_KEY").ok())
    }
}

/// Solana RPC configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct SolanaSection {
    pub rpc_url: String,
    /// Commitment level: "processed", "confirmed", "finalized"
    #[serde(default = "default_commitment")]
    pub commitment: String,
    /// Wallet keypair path (never commit this file)
    pub keypair_path: String,
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

impl SolanaSection {
    /// SOLANA_RPC_URL if set, else the config value
    pub fn get_rpc_url(&self) -> String {
        std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }

    /// SOLANA_KEYPAIR_PATH if set, else the config value, with `~` expanded
    pub fn get_keypair_path(&self) -> PathBuf {
        let raw = std::env::var("SOLANA_KEYPAIR_PATH").unwrap_or_else(|_| self.keypair_path.clone());
        expand_path(&raw)
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log to file in addition to stdout
    pub log_to_file: bool,
    pub log_file: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_file: "logs/trend-rebalancer.log".to_string(),
        }
    }
}

/// Trade journal section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JournalSection {
    pub path: String,
}

impl Default for JournalSection {
    fn default() -> Self {
        Self {
            path: "logs/trades.csv".to_string(),
        }
    }
}

impl JournalSection {
    pub fn get_path(&self) -> PathBuf {
        expand_path(&self.path)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Expand a leading `~` to the home directory
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        StrategyConfig::from(self)
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if self.tokens.quote_mint.is_empty() {
            return Err(ConfigError::ValidationError("quote_mint cannot be empty".to_string()));
        }
        for token in &self.tokens.registry {
            if token.symbol.is_empty() || token.mint.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "token entries need a symbol and a mint, got {:?}",
                    token
                )));
            }
            if token.decimals > 18 {
                return Err(ConfigError::ValidationError(format!(
                    "{} decimals must be <= 18, got {}",
                    token.symbol, token.decimals
                )));
            }
        }
        self.quote_token()?;

        if self.jupiter.api_url.is_empty() || self.jupiter.price_api_url.is_empty() {
            return Err(ConfigError::ValidationError("jupiter URLs cannot be empty".to_string()));
        }
        if self.jupiter.slippage_bps > 10_000 {
            return Err(ConfigError::ValidationError(format!(
                "slippage_bps must be <= 10000, got {}",
                self.jupiter.slippage_bps
            )));
        }
        if self.price_history.api_url.is_empty() {
            return Err(ConfigError::ValidationError("price_history api_url cannot be empty".to_string()));
        }
        if self.solana.rpc_url.is_empty() {
            return Err(ConfigError::ValidationError("rpc_url cannot be empty".to_string()));
        }
        if self.solana.keypair_path.is_empty() {
            return Err(ConfigError::ValidationError("keypair_path cannot be empty".to_string()));
        }

        Ok(())
    }

    /// SOL plus every configured token
    pub fn token_registry(&self) -> TokenRegistry {
        TokenRegistry::new(self.tokens.registry.iter().cloned())
    }

    /// The settlement token, resolved by symbol or mint
    pub fn quote_token(&self) -> Result<TokenInfo, ConfigError> {
        self.token_registry()
            .resolve(&self.tokens.quote_mint)
            .cloned()
            .map_err(|e| ConfigError::ValidationError(format!("quote_mint: {}", e)))
    }
}

impl From<&Config> for StrategyConfig {
    fn from(config: &Config) -> Self {
        StrategyConfig {
            analyzer: AnalyzerConfig {
                deadband: config.analysis.deadband,
                cap_return: config.analysis.cap_return,
                scale_factor: config.analysis.scale_factor,
                volatility_epsilon: config.analysis.volatility_epsilon,
                momentum_epsilon: config.analysis.momentum_epsilon,
            },
            planner: PlannerConfig {
                tolerance: config.rebalance.tolerance,
                prefer_swap: config.rebalance.prefer_swap,
            },
            insights: InsightConfig {
                window: config.insights.window,
                threshold: config.insights.threshold,
            },
            lookback_days: config.analysis.lookback_days,
            interval: config.analysis.interval,
            target_ratio: config.rebalance.target_ratio,
        }
    }
}

impl From<&Config> for JupiterConfig {
    fn from(config: &Config) -> Self {
        JupiterConfig {
            api_base_url: config.jupiter.api_url.clone(),
            api_key: config.jupiter.get_api_key(),
            timeout: Duration::from_secs(config.jupiter.timeout_secs),
            max_retries: config.jupiter.max_retries,
            slippage_bps: config.jupiter.slippage_bps,
        }
    }
}

impl From<&Config> for PriceHistoryConfig {
    fn from(config: &Config) -> Self {
        PriceHistoryConfig {
            api_url: config.price_history.api_url.clone(),
            api_key: config.price_history.get_api_key(),
            platform: config.price_history.platform.clone(),
            native_coin_id: config.price_history.native_coin_id.clone(),
            vs_currency: config.price_history.vs_currency.clone(),
            ..PriceHistoryConfig::default()
        }
    }
}
