//! # Domain Models
//!
//! Value types shared by the generator, the chart merger, the allocation
//! engine and the gateway. All of them are created fresh per request.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PricePoint`] | Daily OHLCV bar |
//! | [`PredictedPoint`] | Forecast close on a future date |
//! | [`ChartPoint`] | Sparse actual/predicted chart row |
//! | [`StockSummary`] | Catalog and search entry |
//! | [`Symbol`] | Validated ticker |
//! | [`TradingDate`] | Calendar date (`YYYY-MM-DD`) |
//! | [`Horizon`] | Prediction window in `1..=30` days |
//! | [`RiskTier`] | low / medium / high |
//! | [`Market`] | us / india |
//!
//! Constructors validate their invariants, so a `PricePoint` can never carry
//! a `high` below its open or close.

mod date;
mod models;
mod risk;
mod symbol;

pub use date::TradingDate;
pub use models::{
    ChartPoint, Horizon, PredictedPoint, PricePoint, StockSummary, MAX_HORIZON_DAYS,
};
pub(crate) use models::validate_positive;
pub use risk::{Market, RiskTier};
pub use symbol::Symbol;
