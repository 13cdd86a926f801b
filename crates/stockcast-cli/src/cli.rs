//! CLI argument definitions for stockcast.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `historical` | Daily OHLCV series for a symbol |
//! | `predict` | Predicted closes for the next N days |
//! | `chart` | History merged with an optional prediction |
//! | `popular` | Popular stocks for a market |
//! | `search` | Symbol and name search |
//! | `allocate` | Split an investment across a risk-tier table |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--live` | `STOCKCAST_LIVE` | Try live sources before falling back |
//! | `--seed` | `STOCKCAST_SEED` | Seed for generated series |
//! | `--timeout-ms` | `STOCKCAST_TIMEOUT_MS` | Per-request timeout |
//!
//! # Examples
//!
//! ```bash
//! stockcast chart AAPL --days 14 --pretty
//! stockcast --live popular --market india
//! stockcast allocate 100000 --risk medium --format table
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use stockcast_core::{Market, RiskTier};

/// Stock dashboard engine: series, predictions, listings and allocations.
#[derive(Debug, Parser)]
#[command(name = "stockcast", author, version, about)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Try the backend and Alpha Vantage before using synthetic data.
    #[arg(long, global = true, default_value_t = false)]
    pub live: bool,

    /// Seed for reproducible generated series.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Per-request timeout for live sources in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Metadata header followed by indented data.
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the daily OHLCV series for a symbol.
    ///
    ///   stockcast historical AAPL
    ///   stockcast historical RELIANCE.BSE --live
    Historical(SymbolArgs),

    /// Predict closing prices for the next N days.
    ///
    ///   stockcast predict TSLA --days 14
    Predict(PredictArgs),

    /// Merge history and an optional prediction into chart rows.
    ///
    ///   stockcast chart MSFT
    ///   stockcast chart MSFT --days 7
    Chart(ChartArgs),

    /// List popular stocks for a market.
    Popular(PopularArgs),

    /// Search stocks by symbol or company name (at most five matches).
    Search(SearchArgs),

    /// Allocate an investment amount across a risk-tier table.
    ///
    ///   stockcast allocate 100000 --risk low
    ///   stockcast allocate 50000 --risk high --table tables.json
    Allocate(AllocateArgs),
}

#[derive(Debug, Args)]
pub struct SymbolArgs {
    /// Market symbol, e.g. AAPL or TCS.BSE.
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    pub symbol: String,

    /// Number of days to predict (1-30).
    #[arg(long, default_value_t = 7, allow_negative_numbers = true)]
    pub days: i64,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    pub symbol: String,

    /// Append a prediction of this many days.
    #[arg(long, allow_negative_numbers = true)]
    pub days: Option<i64>,
}

#[derive(Debug, Args)]
pub struct PopularArgs {
    #[arg(long, value_enum, default_value_t = MarketSelector::Us)]
    pub market: MarketSelector,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Symbol fragment or company name.
    pub query: String,
}

#[derive(Debug, Args)]
pub struct AllocateArgs {
    /// Whole currency units to invest.
    #[arg(allow_negative_numbers = true)]
    pub amount: i64,

    #[arg(long, value_enum)]
    pub risk: RiskSelector,

    /// JSON allocation tables; overrides STOCKCAST_ALLOCATION_TABLE.
    #[arg(long)]
    pub table: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarketSelector {
    Us,
    India,
}

impl From<MarketSelector> for Market {
    fn from(value: MarketSelector) -> Self {
        match value {
            MarketSelector::Us => Market::Us,
            MarketSelector::India => Market::India,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RiskSelector {
    Low,
    Medium,
    High,
}

impl From<RiskSelector> for RiskTier {
    fn from(value: RiskSelector) -> Self {
        match value {
            RiskSelector::Low => RiskTier::Low,
            RiskSelector::Medium => RiskTier::Medium,
            RiskSelector::High => RiskTier::High,
        }
    }
}
