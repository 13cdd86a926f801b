//! # Stockcast Core
//!
//! Market-data engine behind the stockcast dashboard.
//!
//! ## Overview
//!
//! - **Synthetic series** for historical bars and short-horizon predictions
//! - **Chart merging** of actual and predicted closes into one date axis
//! - **Portfolio allocation** across risk-tiered tables with exact integer sums
//! - **Data source gateway** that tries live upstreams and falls back to
//!   synthetic or catalog data
//! - **Response envelope** with request metadata for CLI output
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`allocation`] | Allocation tables and the allocation engine |
//! | [`catalog`] | Static popular lists, search catalog and base prices |
//! | [`chart`] | Actual/predicted chart merge |
//! | [`config`] | Gateway configuration from the environment |
//! | [`domain`] | Domain models (PricePoint, Symbol, RiskTier, ...) |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`gateway`] | Live-first data access with synthetic fallback |
//! | [`generator`] | Random-walk series generator |
//! | [`http_client`] | HTTP client abstraction |
//! | [`live`] | Backend and Alpha Vantage adapters |
//! | [`sequencer`] | Latest-request tracking |
//! | [`throttling`] | Rate limiting support |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stockcast_core::{DataSourceGateway, GatewayConfig, Horizon, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = DataSourceGateway::from_config(&GatewayConfig::from_env()?);
//!     let symbol = Symbol::parse("AAPL")?;
//!
//!     let chart = gateway.chart(&symbol, Some(Horizon::new(7)?)).await?;
//!     println!("{} rows from {}", chart.data.len(), chart.origin);
//!     Ok(())
//! }
//! ```

pub mod allocation;
pub mod catalog;
pub mod chart;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod generator;
pub mod http_client;
pub mod live;
pub mod sequencer;
pub mod throttling;

#[cfg(test)]
mod test_support;

// Domain models
pub use domain::{
    ChartPoint, Horizon, Market, PredictedPoint, PricePoint, RiskTier, StockSummary, Symbol,
    TradingDate, MAX_HORIZON_DAYS,
};

// Errors
pub use error::{AllocationError, ConfigError, ValidationError};

// Allocation
pub use allocation::{
    AllocationEngine, AllocationEntry, AllocationRule, AllocationTables, Portfolio,
    SectorAggregate,
};

// Gateway and configuration
pub use config::GatewayConfig;
pub use gateway::{DataOrigin, DataSourceGateway, Sourced};

// Series generation
pub use chart::merge as merge_chart;
pub use generator::{HistoricalParams, PredictionParams, SeriesGenerator};

// Envelope
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};

// Live sources
pub use live::{LiveSource, ProviderId, SourceError, SourceErrorKind};

pub use sequencer::{RequestSequencer, RequestTicket};
pub use throttling::RateBudget;
