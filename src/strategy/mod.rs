//! Strategy Layer - Trend analysis and trend-damped rebalancing
//!
//! Pure, synchronous computations over request-scoped inputs:
//! - `TrendAnalyzer`: price series -> direction + 0-100 confidence score
//! - `RebalancePlanner`: holdings, prices, target and signal -> one trade
//! - `InsightEngine`: recent journal amounts -> buy/sell/rebalance flags
//!
//! Neither component holds state between calls, so any number of them may
//! run in parallel.

pub mod params;
pub mod trend_analyzer;
pub mod rebalance_planner;
pub mod insights;

pub use params::{AnalyzerConfig, InsightConfig, ParamError, PlannerConfig, StrategyConfig};
pub use trend_analyzer::{AnalysisError, Momentum, TrendAnalyzer, TrendReport};
pub use rebalance_planner::{NoOpReason, PlanError, RebalancePlan, RebalancePlanner};
pub use insights::{InsightEngine, RebalanceInsights};
