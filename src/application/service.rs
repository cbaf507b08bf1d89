//! Trading Service
//!
//! Use cases behind the CLI: analyze a token, plan or execute a rebalance,
//! and place direct trades. Collaborators arrive as port trait objects so
//! the same service runs against the chain, paper trading, or test doubles.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::adapters::journal::{JournalEntry, JournalError, TradeJournal};
use crate::domain::{
    AllocationTarget, Holding, Interval, PortfolioSnapshot, TradeInstruction, TradeKind, TransactionId,
};
use crate::ports::{ExecutionError, ExecutionPort, HoldingsPort, MarketDataError, PriceHistoryPort, PricePort};
use crate::strategy::{
    AnalysisError, InsightEngine, NoOpReason, PlanError, RebalanceInsights, RebalancePlan, RebalancePlanner,
    StrategyConfig, TrendAnalyzer, TrendReport,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    MarketData(#[from] MarketDataError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    Journal(#[from] JournalError),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Inputs for a rebalance; missing amounts are read from the wallet and a
/// missing ratio falls back to the configured target
#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceRequest {
    pub token_a: String,
    pub token_b: String,
    pub amount_a: Option<Decimal>,
    pub amount_b: Option<Decimal>,
    pub target_ratio: Option<Decimal>,
}

impl RebalanceRequest {
    pub fn new(token_a: impl Into<String>, token_b: impl Into<String>) -> Self {
        Self {
            token_a: token_a.into(),
            token_b: token_b.into(),
            amount_a: None,
            amount_b: None,
            target_ratio: None,
        }
    }

    pub fn with_amounts(mut self, amount_a: Decimal, amount_b: Decimal) -> Self {
        self.amount_a = Some(amount_a);
        self.amount_b = Some(amount_b);
        self
    }

    pub fn with_target_ratio(mut self, ratio: Decimal) -> Self {
        self.target_ratio = Some(ratio);
        self
    }
}

/// Everything a rebalance decision was based on
#[derive(Debug, Clone, Serialize)]
pub struct RebalanceProposal {
    pub snapshot: PortfolioSnapshot,
    pub target: AllocationTarget,
    pub trend: TrendReport,
    pub plan: RebalancePlan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RebalanceOutcome {
    Submitted {
        transaction: TransactionId,
        instruction: TradeInstruction,
    },
    NoOp {
        reason: NoOpReason,
    },
    /// Auto rebalance held back because the journal insights did not ask for it
    Skipped {
        insights: RebalanceInsights,
    },
}

/// A submitted direct trade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeReceipt {
    pub instruction: TradeInstruction,
    pub transaction: TransactionId,
}

pub struct TradingService {
    history: Arc<dyn PriceHistoryPort>,
    holdings: Arc<dyn HoldingsPort>,
    prices: Arc<dyn PricePort>,
    executor: Arc<dyn ExecutionPort>,
    config: StrategyConfig,
    analyzer: TrendAnalyzer,
    planner: RebalancePlanner,
    insight_engine: InsightEngine,
    /// Asset paid for buys and received for sells
    quote_asset: String,
    journal: Option<TradeJournal>,
    /// Held across fetch -> plan -> submit so trades never race on balances
    submission: Mutex<()>,
}

impl TradingService {
    pub fn new(
        history: Arc<dyn PriceHistoryPort>,
        holdings: Arc<dyn HoldingsPort>,
        prices: Arc<dyn PricePort>,
        executor: Arc<dyn ExecutionPort>,
        config: StrategyConfig,
        quote_asset: impl Into<String>,
    ) -> Self {
        Self {
            history,
            holdings,
            prices,
            executor,
            analyzer: TrendAnalyzer::new(config.analyzer.clone()),
            planner: RebalancePlanner::new(config.planner.clone()),
            insight_engine: InsightEngine::new(config.insights.clone()),
            config,
            quote_asset: quote_asset.into(),
            journal: None,
            submission: Mutex::new(()),
        }
    }

    pub fn with_journal(mut self, journal: TradeJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Trend of `token` over the last `days`, sampled at `interval`
    pub async fn analyze(&self, token: &str, days: u32, interval: Interval) -> Result<TrendReport, ServiceError> {
        if days == 0 {
            return Err(ServiceError::InvalidRequest("days must be greater than zero".into()));
        }
        let series = self.history.fetch_price_series(token, days, interval).await?;
        let report = self.analyzer.analyze_detailed(&series)?;

        tracing::info!(
            "{} over {} days ({}): {} | net {:+.2}% | vol {:.4} | {:?}",
            token,
            days,
            interval,
            report.signal,
            report.net_return * 100.0,
            report.volatility,
            report.momentum
        );
        Ok(report)
    }

    /// Work out the rebalance trade without submitting it
    pub async fn plan_rebalance(&self, request: &RebalanceRequest) -> Result<RebalanceProposal, ServiceError> {
        if request.token_a == request.token_b {
            return Err(ServiceError::InvalidRequest(format!(
                "cannot rebalance {} against itself",
                request.token_a
            )));
        }

        let holding_a = self.resolve_holding(&request.token_a, request.amount_a).await?;
        let holding_b = self.resolve_holding(&request.token_b, request.amount_b).await?;
        let price_a = self.prices.fetch_price(&request.token_a).await?;
        let price_b = self.prices.fetch_price(&request.token_b).await?;

        let trend = self
            .analyze(&request.token_a, self.config.lookback_days, self.config.interval)
            .await?;

        let target = AllocationTarget::new(
            request.token_a.clone(),
            request.token_b.clone(),
            request.target_ratio.unwrap_or(self.config.target_ratio),
        );
        let snapshot = PortfolioSnapshot::new(holding_a, holding_b, price_a, price_b);
        let plan = self.planner.plan(&snapshot, &target, &trend.signal)?;

        Ok(RebalanceProposal {
            snapshot,
            target,
            trend,
            plan,
        })
    }

    /// Plan and, unless the plan is a no-op, submit the rebalance trade
    pub async fn rebalance(&self, request: &RebalanceRequest) -> Result<RebalanceOutcome, ServiceError> {
        let _guard = self.submission.lock().await;
        self.rebalance_locked(request).await
    }

    /// Rebalance only when the journal insights flag the pair for it
    pub async fn auto_rebalance(&self, request: &RebalanceRequest) -> Result<RebalanceOutcome, ServiceError> {
        let _guard = self.submission.lock().await;

        let insights = self.insights(&request.token_a, &request.token_b)?;
        if !insights.rebalance {
            tracing::info!(
                "Auto rebalance {}/{} skipped: insights {:?}",
                request.token_a,
                request.token_b,
                insights
            );
            return Ok(RebalanceOutcome::Skipped { insights });
        }
        self.rebalance_locked(request).await
    }

    /// Moving-average flags over the journaled trade amounts of each token
    pub fn insights(&self, token_a: &str, token_b: &str) -> Result<RebalanceInsights, ServiceError> {
        if token_a == token_b {
            return Err(ServiceError::InvalidRequest(format!(
                "insights need two different tokens, got {} twice",
                token_a
            )));
        }
        let entries = self.journal_entries()?;
        let traded = |token: &str| -> Vec<Decimal> {
            entries
                .iter()
                .filter(|e| e.asset == token && matches!(e.kind, TradeKind::Buy | TradeKind::Sell | TradeKind::Swap))
                .map(|e| e.amount)
                .collect()
        };
        Ok(self.insight_engine.evaluate(&traded(token_a), &traded(token_b)))
    }

    async fn rebalance_locked(&self, request: &RebalanceRequest) -> Result<RebalanceOutcome, ServiceError> {
        let proposal = self.plan_rebalance(request).await?;
        if let Some(reason) = proposal.plan.reason {
            tracing::info!("Rebalance {}/{}: no trade ({})", request.token_a, request.token_b, reason);
            return Ok(RebalanceOutcome::NoOp { reason });
        }

        let instruction = proposal.plan.instruction;
        let transaction = self.submit(&instruction).await?;
        Ok(RebalanceOutcome::Submitted {
            transaction,
            instruction,
        })
    }

    /// Buy `usd` dollars worth of `token` with the quote asset
    pub async fn buy(&self, token: &str, usd: Decimal) -> Result<TradeReceipt, ServiceError> {
        require_positive("usd amount", usd)?;
        let _guard = self.submission.lock().await;

        let price = self.prices.fetch_price(token).await?;
        if price <= Decimal::ZERO {
            return Err(MarketDataError::quote_unavailable(token, format!("non-positive price {}", price)).into());
        }
        let amount = usd / price;
        tracing::info!("Buying ${} of {} at ${} = {}", usd, token, price, amount);

        let instruction = TradeInstruction::buy(token, amount, Some(self.quote_asset.clone()));
        self.submit_receipt(instruction).await
    }

    /// Sell `amount` of `token` for the quote asset
    pub async fn sell(&self, token: &str, amount: Decimal) -> Result<TradeReceipt, ServiceError> {
        require_positive("amount", amount)?;
        let _guard = self.submission.lock().await;
        let instruction = TradeInstruction::sell(token, amount, Some(self.quote_asset.clone()));
        self.submit_receipt(instruction).await
    }

    pub async fn swap(&self, from: &str, to: &str, amount: Decimal) -> Result<TradeReceipt, ServiceError> {
        require_positive("amount", amount)?;
        if from == to {
            return Err(ServiceError::InvalidRequest(format!("cannot swap {} into itself", from)));
        }
        let _guard = self.submission.lock().await;
        self.submit_receipt(TradeInstruction::swap(from, amount, to)).await
    }

    /// Transfer native SOL
    pub async fn send(&self, recipient: &str, amount: Decimal) -> Result<TradeReceipt, ServiceError> {
        require_positive("amount", amount)?;
        if recipient.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("recipient cannot be empty".into()));
        }
        let _guard = self.submission.lock().await;
        self.submit_receipt(TradeInstruction::send("SOL", amount, recipient)).await
    }

    pub async fn price(&self, token: &str) -> Result<Decimal, ServiceError> {
        Ok(self.prices.fetch_price(token).await?)
    }

    pub async fn balance(&self, token: &str) -> Result<Holding, ServiceError> {
        Ok(self.holdings.fetch_holding(token).await?)
    }

    /// Journal contents, oldest first; empty when no journal is configured
    pub fn journal_entries(&self) -> Result<Vec<JournalEntry>, ServiceError> {
        match self.journal {
            Some(ref journal) => Ok(journal.entries()?),
            None => Ok(Vec::new()),
        }
    }

    async fn resolve_holding(&self, token: &str, amount: Option<Decimal>) -> Result<Holding, ServiceError> {
        match amount {
            Some(amount) => Ok(Holding::new(token, amount)),
            None => Ok(self.holdings.fetch_holding(token).await?),
        }
    }

    async fn submit_receipt(&self, instruction: TradeInstruction) -> Result<TradeReceipt, ServiceError> {
        let transaction = self.submit(&instruction).await?;
        Ok(TradeReceipt {
            instruction,
            transaction,
        })
    }

    /// Single submission path; callers hold the submission lock
    async fn submit(&self, instruction: &TradeInstruction) -> Result<TransactionId, ServiceError> {
        let transaction = self.executor.submit_trade(instruction).await?;
        tracing::info!("Submitted {}: {}", instruction, transaction);

        if let Some(ref journal) = self.journal {
            let entry = JournalEntry::new(instruction, &transaction, Utc::now());
            // the trade already happened; a journal failure must not hide that
            if let Err(e) = journal.append(&entry) {
                tracing::error!("Failed to journal {} ({}): {}", instruction, transaction, e);
            }
        }
        Ok(transaction)
    }
}

fn require_positive(what: &str, value: Decimal) -> Result<(), ServiceError> {
    if value <= Decimal::ZERO {
        return Err(ServiceError::InvalidRequest(format!("{} must be positive, got {}", what, value)));
    }
    Ok(())
}
