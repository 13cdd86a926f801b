use serde::{Deserialize, Serialize};

use crate::{Market, Symbol, TradingDate, ValidationError};

/// Longest prediction window the engine will produce.
pub const MAX_HORIZON_DAYS: u32 = 30;

/// One daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: TradingDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PricePoint {
    pub fn new(
        date: TradingDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_positive("open", open)?;
        validate_positive("high", high)?;
        validate_positive("low", low)?;
        validate_positive("close", close)?;

        if low > open.min(close) || high < open.max(close) {
            return Err(ValidationError::InvalidPriceEnvelope);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// One forecast close on a future date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedPoint {
    pub date: TradingDate,
    pub predicted_close: f64,
}

impl PredictedPoint {
    pub fn new(date: TradingDate, predicted_close: f64) -> Result<Self, ValidationError> {
        validate_positive("predicted_close", predicted_close)?;
        Ok(Self {
            date,
            predicted_close,
        })
    }
}

/// Chart row carrying an actual close, a predicted close, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: TradingDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted: Option<f64>,
}

/// Catalog and search entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub symbol: Symbol,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub currency: String,
    pub market: Market,
}

/// Number of future days to forecast, always within `1..=30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Horizon(u32);

impl Horizon {
    pub fn new(days: i64) -> Result<Self, ValidationError> {
        if !(1..=i64::from(MAX_HORIZON_DAYS)).contains(&days) {
            return Err(ValidationError::HorizonOutOfRange { days });
        }
        // Bounded by MAX_HORIZON_DAYS above.
        Ok(Self(days as u32))
    }

    pub const fn days(self) -> u32 {
        self.0
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(7)
    }
}

pub(crate) fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}
