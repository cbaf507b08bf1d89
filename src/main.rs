//! Trend Rebalancer - trend-damped two-asset rebalancer for Solana/Jupiter

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trend_rebalancer::adapters::cli::{AnalyzeCmd, CliApp, Command, InsightsCmd, PairArgs};
use trend_rebalancer::adapters::jupiter::{JupiterClient, JupiterConfig};
use trend_rebalancer::adapters::market_data::{JupiterPriceClient, PriceHistoryClient, PriceHistoryConfig};
use trend_rebalancer::adapters::solana::{parse_commitment, SolanaClient, SolanaExecutor, WalletHoldings, WalletManager};
use trend_rebalancer::adapters::{PaperExecutor, TradeJournal};
use trend_rebalancer::application::{RebalanceOutcome, TradeReceipt, TradingService};
use trend_rebalancer::config::{expand_path, load_config, Config, LoggingSection};
use trend_rebalancer::ports::ExecutionPort;
use trend_rebalancer::strategy::StrategyConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (API keys and RPC URLs go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    let config = load_config(&app.config)
        .with_context(|| format!("Failed to load configuration from {}", app.config.display()))?;
    init_logging(app.log_level(&config.logging.level), &config.logging)?;

    let service = build_service(&config, &app.command)?;
    if app.command.is_paper() {
        tracing::warn!("PAPER TRADING MODE - no real transactions");
    }

    match app.command {
        Command::Analyze(cmd) => analyze_command(&service, cmd).await,
        Command::Plan(cmd) => plan_command(&service, &cmd.pair).await,
        Command::Rebalance(cmd) => rebalance_command(&service, &cmd.pair, cmd.auto).await,
        Command::Buy(cmd) => print_receipt(service.buy(&cmd.token, cmd.usd).await?),
        Command::Sell(cmd) => print_receipt(service.sell(&cmd.token, cmd.amount).await?),
        Command::Swap(cmd) => print_receipt(service.swap(&cmd.from, &cmd.to, cmd.amount).await?),
        Command::Send(cmd) => print_receipt(service.send(&cmd.recipient, cmd.amount).await?),
        Command::Price(cmd) => {
            let price = service.price(&cmd.token).await?;
            println!("{}: ${}", cmd.token, price);
            Ok(())
        }
        Command::Balance(cmd) => {
            let holding = service.balance(&cmd.token).await?;
            println!("{}: {}", holding.asset, holding.amount);
            Ok(())
        }
        Command::Log => log_command(&service),
        Command::Insights(cmd) => insights_command(&service, cmd),
    }
}

/// Console output plus an optional plain-text file layer
fn init_logging(level: &str, logging: &LoggingSection) -> Result<()> {
    let filter = EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{}'", level))?;

    let file_layer = if logging.log_to_file {
        let path = expand_path(&logging.log_file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .init();
    Ok(())
}

fn build_service(config: &Config, command: &Command) -> Result<TradingService> {
    let registry = Arc::new(config.token_registry());
    let quote_token = config.quote_token()?;
    let rpc = SolanaClient::new(config.solana.get_rpc_url(), parse_commitment(&config.solana.commitment));

    let keypair_path = config.solana.get_keypair_path();
    let wallet = match load_wallet_with_context(&keypair_path, !command.requires_wallet()) {
        Ok(w) => w,
        Err(e) => {
            if command.requires_wallet() {
                return Err(e);
            }
            tracing::debug!("{:#}", e);
            tracing::warn!(
                "Wallet not found at '{}' - using a random wallet",
                keypair_path.display()
            );
            WalletManager::new_random()
        }
    };
    let wallet = Arc::new(wallet);
    tracing::info!("Wallet: {}", wallet.pubkey());

    let history = PriceHistoryClient::new(PriceHistoryConfig::from(config), registry.clone())
        .context("Failed to create price history client")?;
    let prices = JupiterPriceClient::new(
        config.jupiter.price_api_url.clone(),
        config.jupiter.get_api_key(),
        registry.clone(),
    )
    .context("Failed to create price client")?;
    let holdings = WalletHoldings::new(rpc.clone(), wallet.pubkey(), registry.clone());

    // read-only commands never submit, so they get the paper executor too
    let executor: Arc<dyn ExecutionPort> = if command.is_paper() || !command.submits_trade() {
        Arc::new(PaperExecutor::new())
    } else {
        let jupiter = JupiterClient::with_config(JupiterConfig::from(config))
            .context("Failed to create Jupiter client")?;
        Arc::new(SolanaExecutor::new(rpc, jupiter, wallet, registry, quote_token.clone()))
    };

    let service = TradingService::new(
        Arc::new(history),
        Arc::new(holdings),
        Arc::new(prices),
        executor,
        StrategyConfig::from(config),
        quote_token.symbol,
    )
    .with_journal(TradeJournal::new(config.journal.get_path()));
    Ok(service)
}

/// Load wallet with helpful error messages
fn load_wallet_with_context(keypair_path: &Path, can_fall_back: bool) -> Result<WalletManager> {
    if !keypair_path.exists() {
        let mode_hint = if can_fall_back {
            "Paper trades and read-only commands fall back to a random wallet."
        } else {
            "A wallet is required for live trading and balance lookups."
        };

        bail!(
            "Wallet file not found: {}\n\n\
             {}\n\n\
             To create a new wallet, run:\n  \
             solana-keygen new --outfile {}\n\n\
             Or point 'keypair_path' in your config.toml (or SOLANA_KEYPAIR_PATH) at an existing wallet",
            keypair_path.display(),
            mode_hint,
            keypair_path.display()
        );
    }

    if let Err(e) = fs::metadata(keypair_path) {
        bail!(
            "Cannot access wallet file '{}': {}\n\n\
             Check file permissions and ensure the path is correct.",
            keypair_path.display(),
            e
        );
    }

    WalletManager::from_file(keypair_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load wallet from '{}': {}\n\n\
             The file exists but may be corrupted or in the wrong format.\n\
             Expected format: JSON array of bytes (e.g., [1,2,3,...])",
            keypair_path.display(),
            e
        )
    })
}

async fn analyze_command(service: &TradingService, cmd: AnalyzeCmd) -> Result<()> {
    let days = cmd.days.unwrap_or(service.config().lookback_days);
    let interval = cmd.interval.unwrap_or(service.config().interval);
    let report = service.analyze(&cmd.token, days, interval).await?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} - {} days ({})", cmd.token, days, interval);
    println!("  Trend:      {}", report.signal);
    println!("  Net return: {:+.2}%", report.net_return * 100.0);
    println!("  Volatility: {:.4}", report.volatility);
    println!("  Momentum:   {:?}", report.momentum);
    println!("  Samples:    {}", report.sample_count);
    Ok(())
}

async fn plan_command(service: &TradingService, pair: &PairArgs) -> Result<()> {
    let proposal = service.plan_rebalance(&pair.to_request()).await?;

    if pair.json {
        println!("{}", serde_json::to_string_pretty(&proposal)?);
        return Ok(());
    }

    let snapshot = &proposal.snapshot;
    let plan = &proposal.plan;
    println!("Portfolio {}/{}", proposal.target.asset_a, proposal.target.asset_b);
    println!(
        "  {}: {} @ ${} = ${}",
        snapshot.holding_a.asset,
        snapshot.holding_a.amount,
        snapshot.price_a,
        snapshot.value_a().unwrap_or_default().round_dp(2)
    );
    println!(
        "  {}: {} @ ${} = ${}",
        snapshot.holding_b.asset,
        snapshot.holding_b.amount,
        snapshot.price_b,
        snapshot.value_b().unwrap_or_default().round_dp(2)
    );
    if let Some(ratio) = plan.current_ratio {
        println!(
            "  Ratio:   {} (target {}, deviation {})",
            ratio.round_dp(4),
            proposal.target.ratio_a,
            plan.deviation.round_dp(4)
        );
    }
    println!("  Trend:   {} ({})", proposal.trend.signal, proposal.target.asset_a);
    println!("  Damping: {}", plan.damping_factor.round_dp(4));
    match plan.reason {
        Some(reason) => println!("  Plan:    no trade ({})", reason),
        None => println!("  Plan:    {} (${})", plan.instruction, plan.move_value.round_dp(2)),
    }
    Ok(())
}

async fn rebalance_command(service: &TradingService, pair: &PairArgs, auto: bool) -> Result<()> {
    let request = pair.to_request();
    let outcome = if auto {
        service.auto_rebalance(&request).await?
    } else {
        service.rebalance(&request).await?
    };

    if pair.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        RebalanceOutcome::Submitted {
            transaction,
            instruction,
        } => println!("Submitted {}: {}", instruction, transaction),
        RebalanceOutcome::NoOp { reason } => println!("No trade: {}", reason),
        RebalanceOutcome::Skipped { insights } => println!(
            "No trade: journal insights do not call for a rebalance ({}/{} trades)",
            insights.samples_a, insights.samples_b
        ),
    }
    Ok(())
}

fn insights_command(service: &TradingService, cmd: InsightsCmd) -> Result<()> {
    let insights = service.insights(&cmd.token_a, &cmd.token_b)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    let window = service.config().insights.window;
    println!("Insights {}/{} (last {} trades each)", cmd.token_a, cmd.token_b, window);
    println!("  Trades:    {} / {}", insights.samples_a, insights.samples_b);
    println!("  Buy:       {}", insights.buy);
    println!("  Sell:      {}", insights.sell);
    println!("  Rebalance: {}", insights.rebalance);
    Ok(())
}

fn print_receipt(receipt: TradeReceipt) -> Result<()> {
    println!("Submitted {}: {}", receipt.instruction, receipt.transaction);
    Ok(())
}

fn log_command(service: &TradingService) -> Result<()> {
    let entries = service.journal_entries()?;
    if entries.is_empty() {
        println!("No trades recorded");
        return Ok(());
    }

    for entry in entries {
        let other = entry
            .counterparty
            .as_deref()
            .or(entry.recipient.as_deref())
            .unwrap_or("-");
        println!(
            "{}  {:<5} {:>16} {:<8} -> {:<8} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.kind.to_string(),
            entry.amount.to_string(),
            entry.asset,
            other,
            entry.transaction
        );
    }
    Ok(())
}
