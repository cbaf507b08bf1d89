//! CLI Adapter
//!
//! Command-line interface for the trend rebalancer.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    AnalyzeCmd, BuyCmd, CliApp, Command, InsightsCmd, PairArgs, PlanCmd, RebalanceCmd, SellCmd, SendCmd, SwapCmd,
    TokenCmd,
};
