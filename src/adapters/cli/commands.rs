//! CLI Commands
//!
//! Argument definitions for the trend rebalancer. Dispatch lives in the
//! binary; this module only describes what can be asked for.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::application::RebalanceRequest;
use crate::domain::Interval;

/// Trend Rebalancer - trend-damped two-asset rebalancing on Solana/Jupiter
#[derive(Parser, Debug)]
#[command(
    name = "trend-rebalancer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Trend-damped two-asset rebalancer for Solana/Jupiter",
    long_about = "Scores the recent trend of a token from its price history and moves a \
                  two-asset portfolio toward a target allocation, holding back corrections \
                  that would fight a strong trend."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

impl CliApp {
    /// Log filter directive: --debug, then --verbose, then the configured level
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            configured
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score the recent trend of a token
    Analyze(AnalyzeCmd),

    /// Show the rebalance trade without submitting it
    Plan(PlanCmd),

    /// Plan and submit the rebalance trade
    Rebalance(RebalanceCmd),

    /// Buy a dollar amount of a token with the quote token
    Buy(BuyCmd),

    /// Sell an amount of a token for the quote token
    Sell(SellCmd),

    /// Swap an amount of one token into another
    Swap(SwapCmd),

    /// Send native SOL to an address
    Send(SendCmd),

    /// Current USD price of a token
    Price(TokenCmd),

    /// Wallet balance of a token
    Balance(TokenCmd),

    /// Print the trade journal
    Log,

    /// Buy/sell/rebalance flags from recent journal trades of a pair
    Insights(InsightsCmd),
}

impl Command {
    /// Whether the command can only run against the configured wallet.
    ///
    /// Reads and paper trades fall back to a throwaway wallet; anything that
    /// reads real balances or signs real transactions does not.
    pub fn requires_wallet(&self) -> bool {
        match self {
            Command::Analyze(_) | Command::Price(_) | Command::Log | Command::Insights(_) => false,
            Command::Plan(cmd) => !cmd.pair.has_amounts(),
            Command::Rebalance(cmd) => !cmd.paper || !cmd.pair.has_amounts(),
            Command::Buy(cmd) => !cmd.paper,
            Command::Sell(cmd) => !cmd.paper,
            Command::Swap(cmd) => !cmd.paper,
            Command::Send(cmd) => !cmd.paper,
            Command::Balance(_) => true,
        }
    }

    /// Whether the command hands an instruction to an executor
    pub fn submits_trade(&self) -> bool {
        matches!(
            self,
            Command::Rebalance(_) | Command::Buy(_) | Command::Sell(_) | Command::Swap(_) | Command::Send(_)
        )
    }

    /// A trading command run with `--paper`. Commands that never trade are
    /// not paper trades.
    pub fn is_paper(&self) -> bool {
        match self {
            Command::Rebalance(cmd) => cmd.paper,
            Command::Buy(cmd) => cmd.paper,
            Command::Sell(cmd) => cmd.paper,
            Command::Swap(cmd) => cmd.paper,
            Command::Send(cmd) => cmd.paper,
            _ => false,
        }
    }
}

/// Score a token's trend
#[derive(Parser, Debug)]
pub struct AnalyzeCmd {
    /// Token symbol or mint (e.g., SOL)
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Days of history to analyze (defaults to the configured lookback)
    #[arg(short, long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Sampling interval: hour, day or week
    #[arg(short, long, value_name = "INTERVAL")]
    pub interval: Option<Interval>,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Token pair and optional overrides shared by plan and rebalance
#[derive(Args, Debug)]
pub struct PairArgs {
    /// Token whose trend damps the rebalance (e.g., SOL)
    #[arg(value_name = "TOKEN_A")]
    pub token_a: String,

    /// Counter asset (e.g., USDC)
    #[arg(value_name = "TOKEN_B")]
    pub token_b: String,

    /// Use this amount of TOKEN_A instead of the wallet balance
    #[arg(long, value_name = "AMOUNT")]
    pub amount_a: Option<Decimal>,

    /// Use this amount of TOKEN_B instead of the wallet balance
    #[arg(long, value_name = "AMOUNT")]
    pub amount_b: Option<Decimal>,

    /// Target share of portfolio value in TOKEN_A, between 0 and 1
    #[arg(short, long, value_name = "RATIO")]
    pub target: Option<Decimal>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl PairArgs {
    pub fn has_amounts(&self) -> bool {
        self.amount_a.is_some() && self.amount_b.is_some()
    }

    pub fn to_request(&self) -> RebalanceRequest {
        RebalanceRequest {
            token_a: self.token_a.clone(),
            token_b: self.token_b.clone(),
            amount_a: self.amount_a,
            amount_b: self.amount_b,
            target_ratio: self.target,
        }
    }
}

/// Dry-run a rebalance
#[derive(Parser, Debug)]
pub struct PlanCmd {
    #[command(flatten)]
    pub pair: PairArgs,
}

/// Execute a rebalance
#[derive(Parser, Debug)]
pub struct RebalanceCmd {
    #[command(flatten)]
    pub pair: PairArgs,

    /// Run in paper trading mode (no real transactions)
    #[arg(short, long)]
    pub paper: bool,

    /// Only trade when the journal insights flag the pair for rebalancing
    #[arg(long)]
    pub auto: bool,
}

/// Moving-average flags over the trade journal
#[derive(Parser, Debug)]
pub struct InsightsCmd {
    /// First token of the pair (e.g., SOL)
    #[arg(value_name = "TOKEN_A")]
    pub token_a: String,

    /// Second token of the pair (e.g., USDC)
    #[arg(value_name = "TOKEN_B")]
    pub token_b: String,

    /// Print the flags as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct BuyCmd {
    /// Token to buy
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Dollar amount to spend
    #[arg(long, value_name = "AMOUNT")]
    pub usd: Decimal,

    /// Run in paper trading mode (no real transactions)
    #[arg(short, long)]
    pub paper: bool,
}

#[derive(Parser, Debug)]
pub struct SellCmd {
    /// Token to sell
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Amount of TOKEN to sell
    #[arg(value_name = "AMOUNT")]
    pub amount: Decimal,

    /// Run in paper trading mode (no real transactions)
    #[arg(short, long)]
    pub paper: bool,
}

#[derive(Parser, Debug)]
pub struct SwapCmd {
    /// Input token symbol (e.g., SOL)
    #[arg(value_name = "FROM")]
    pub from: String,

    /// Output token symbol (e.g., USDC)
    #[arg(value_name = "TO")]
    pub to: String,

    /// Amount of FROM to swap
    #[arg(value_name = "AMOUNT")]
    pub amount: Decimal,

    /// Run in paper trading mode (no real transactions)
    #[arg(short, long)]
    pub paper: bool,
}

#[derive(Parser, Debug)]
pub struct SendCmd {
    /// Recipient address
    #[arg(value_name = "RECIPIENT")]
    pub recipient: String,

    /// Amount of SOL to send
    #[arg(value_name = "AMOUNT")]
    pub amount: Decimal,

    /// Run in paper trading mode (no real transactions)
    #[arg(short, long)]
    pub paper: bool,
}

#[derive(Parser, Debug)]
pub struct TokenCmd {
    /// Token symbol or mint
    #[arg(value_name = "TOKEN")]
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_app_parse_analyze() {
        let args = vec!["trend-rebalancer", "analyze", "SOL", "--days", "14", "--interval", "hour"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Analyze(cmd) => {
                assert_eq!(cmd.token, "SOL");
                assert_eq!(cmd.days, Some(14));
                assert_eq!(cmd.interval, Some(Interval::Hour));
                assert!(!cmd.json);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_app_parse_analyze_defaults() {
        let app = CliApp::try_parse_from(vec!["trend-rebalancer", "analyze", "JUP", "--json"]).unwrap();

        match app.command {
            Command::Analyze(cmd) => {
                assert_eq!(cmd.days, None);
                assert_eq!(cmd.interval, None);
                assert!(cmd.json);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_app_rejects_bad_interval() {
        let args = vec!["trend-rebalancer", "analyze", "SOL", "--interval", "fortnight"];
        assert!(CliApp::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_app_parse_plan() {
        let args = vec![
            "trend-rebalancer", "plan", "SOL", "USDC",
            "--amount-a", "100",
            "--amount-b", "50.5",
            "--target", "0.6",
        ];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Plan(cmd) => {
                let request = cmd.pair.to_request();
                assert_eq!(request.token_a, "SOL");
                assert_eq!(request.token_b, "USDC");
                assert_eq!(request.amount_a, Some(dec!(100)));
                assert_eq!(request.amount_b, Some(dec!(50.5)));
                assert_eq!(request.target_ratio, Some(dec!(0.6)));
            }
            _ => panic!("Expected Plan command"),
        }
    }

    #[test]
    fn test_cli_app_parse_rebalance_with_paper() {
        let args = vec!["trend-rebalancer", "rebalance", "SOL", "USDC", "--paper"];
        let app = CliApp::try_parse_from(args).unwrap();

        assert!(app.command.is_paper());
        // balances still come from the wallet
        assert!(app.command.requires_wallet());
        match app.command {
            Command::Rebalance(cmd) => {
                assert!(cmd.paper);
                assert!(!cmd.pair.has_amounts());
                assert_eq!(cmd.pair.target, None);
            }
            _ => panic!("Expected Rebalance command"),
        }
    }

    #[test]
    fn test_cli_app_parse_auto_rebalance() {
        let args = vec!["trend-rebalancer", "rebalance", "SOL", "USDC", "--auto", "--json"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Rebalance(cmd) => {
                assert!(cmd.auto);
                assert!(!cmd.paper);
                assert!(cmd.pair.json);
            }
            _ => panic!("Expected Rebalance command"),
        }
    }

    #[test]
    fn test_cli_app_parse_insights() {
        let args = vec!["trend-rebalancer", "insights", "SOL", "USDC", "--json"];
        let app = CliApp::try_parse_from(args).unwrap();

        assert!(!app.command.requires_wallet());
        match app.command {
            Command::Insights(cmd) => {
                assert_eq!(cmd.token_a, "SOL");
                assert_eq!(cmd.token_b, "USDC");
                assert!(cmd.json);
            }
            _ => panic!("Expected Insights command"),
        }
        assert!(CliApp::try_parse_from(vec!["trend-rebalancer", "insights", "SOL"]).is_err());
    }

    #[test]
    fn test_cli_app_parse_buy() {
        let args = vec!["trend-rebalancer", "buy", "JUP", "--usd", "25"];
        let app = CliApp::try_parse_from(args).unwrap();

        assert!(app.command.requires_wallet());
        match app.command {
            Command::Buy(cmd) => {
                assert_eq!(cmd.token, "JUP");
                assert_eq!(cmd.usd, dec!(25));
                assert!(!cmd.paper);
            }
            _ => panic!("Expected Buy command"),
        }
    }

    #[test]
    fn test_cli_app_buy_requires_usd() {
        assert!(CliApp::try_parse_from(vec!["trend-rebalancer", "buy", "JUP"]).is_err());
    }

    #[test]
    fn test_cli_app_parse_sell_and_swap() {
        let app = CliApp::try_parse_from(vec!["trend-rebalancer", "sell", "SOL", "0.5", "-p"]).unwrap();
        assert!(!app.command.requires_wallet());
        match app.command {
            Command::Sell(cmd) => {
                assert_eq!(cmd.amount, dec!(0.5));
                assert!(cmd.paper);
            }
            _ => panic!("Expected Sell command"),
        }

        let app = CliApp::try_parse_from(vec!["trend-rebalancer", "swap", "USDC", "SOL", "12.5"]).unwrap();
        match app.command {
            Command::Swap(cmd) => {
                assert_eq!(cmd.from, "USDC");
                assert_eq!(cmd.to, "SOL");
                assert_eq!(cmd.amount, dec!(12.5));
            }
            _ => panic!("Expected Swap command"),
        }
    }

    #[test]
    fn test_cli_app_parse_send() {
        let args = vec!["trend-rebalancer", "send", "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM", "0.1"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Send(cmd) => {
                assert_eq!(cmd.recipient, "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
                assert_eq!(cmd.amount, dec!(0.1));
            }
            _ => panic!("Expected Send command"),
        }
    }

    #[test]
    fn test_cli_app_rejects_non_numeric_amount() {
        let args = vec!["trend-rebalancer", "sell", "SOL", "lots"];
        assert!(CliApp::try_parse_from(args).is_err());
    }

    #[test]
    fn test_read_only_commands() {
        let price = CliApp::try_parse_from(vec!["trend-rebalancer", "price", "SOL"]).unwrap();
        assert!(!price.command.requires_wallet());

        let balance = CliApp::try_parse_from(vec!["trend-rebalancer", "balance", "SOL"]).unwrap();
        assert!(balance.command.requires_wallet());

        let log = CliApp::try_parse_from(vec!["trend-rebalancer", "log"]).unwrap();
        assert!(matches!(log.command, Command::Log));
    }

    #[test]
    fn test_only_trading_commands_are_paper() {
        for args in [
            vec!["trend-rebalancer", "plan", "SOL", "USDC"],
            vec!["trend-rebalancer", "balance", "SOL"],
            vec!["trend-rebalancer", "price", "SOL"],
            vec!["trend-rebalancer", "analyze", "SOL"],
            vec!["trend-rebalancer", "log"],
            vec!["trend-rebalancer", "insights", "SOL", "USDC"],
        ] {
            let app = CliApp::try_parse_from(args.clone()).unwrap();
            assert!(!app.command.is_paper(), "{:?}", args);
            assert!(!app.command.submits_trade(), "{:?}", args);
        }

        let live = CliApp::try_parse_from(vec!["trend-rebalancer", "swap", "USDC", "SOL", "1"]).unwrap();
        assert!(live.command.submits_trade());
        assert!(!live.command.is_paper());

        let paper = CliApp::try_parse_from(vec!["trend-rebalancer", "send", "Dest111", "1", "--paper"]).unwrap();
        assert!(paper.command.submits_trade());
        assert!(paper.command.is_paper());
    }

    #[test]
    fn test_global_flags() {
        let args = vec!["trend-rebalancer", "-v", "--debug", "price", "SOL", "--config", "alt.toml"];
        let app = CliApp::try_parse_from(args).unwrap();

        assert!(app.verbose);
        assert!(app.debug);
        assert_eq!(app.config, PathBuf::from("alt.toml"));
    }

    #[test]
    fn test_default_config_path() {
        let app = CliApp::try_parse_from(vec!["trend-rebalancer", "log"]).unwrap();
        assert_eq!(app.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn test_log_level_priority() {
        let quiet = CliApp::try_parse_from(vec!["trend-rebalancer", "log"]).unwrap();
        assert_eq!(quiet.log_level("warn"), "warn");

        let verbose = CliApp::try_parse_from(vec!["trend-rebalancer", "-v", "log"]).unwrap();
        assert_eq!(verbose.log_level("warn"), "info");

        let debug = CliApp::try_parse_from(vec!["trend-rebalancer", "-v", "--debug", "log"]).unwrap();
        assert_eq!(debug.log_level("warn"), "debug");
    }
}
