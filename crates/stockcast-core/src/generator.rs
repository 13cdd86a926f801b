//! Synthetic price series.
//!
//! The generator is a random walk, not a forecasting model. It is used as the
//! fallback whenever a live source cannot answer, and directly by tests.

use tracing::debug;

use crate::domain::validate_positive;
use crate::{Horizon, PredictedPoint, PricePoint, Symbol, TradingDate, ValidationError};

/// Default number of days before the anchor date in a historical series.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;
/// Longest historical window accepted by the generator.
pub const MAX_LOOKBACK_DAYS: u32 = 3_650;
pub const DEFAULT_DAILY_VOLATILITY: f64 = 0.02;
pub const DEFAULT_PREDICTION_VOLATILITY: f64 = 0.015;
/// Floor applied to every predicted close.
pub const MIN_PREDICTED_PRICE: f64 = 0.01;

/// Per-day drift applied in the chosen trend direction, as a fraction of price.
const TREND_DRIFT: f64 = 0.002;
const MAX_VOLATILITY: f64 = 0.5;
const VOLUME_RANGE: std::ops::Range<u64> = 1_000_000..11_000_000;

/// Shape of a generated historical series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalParams {
    pub lookback_days: u32,
    pub daily_volatility: f64,
}

impl Default for HistoricalParams {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            daily_volatility: DEFAULT_DAILY_VOLATILITY,
        }
    }
}

/// Shape of a generated prediction series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionParams {
    pub horizon: Horizon,
    pub volatility: f64,
}

impl PredictionParams {
    pub fn new(horizon: Horizon) -> Self {
        Self {
            horizon,
            volatility: DEFAULT_PREDICTION_VOLATILITY,
        }
    }
}

impl Default for PredictionParams {
    fn default() -> Self {
        Self::new(Horizon::default())
    }
}

/// Random-walk generator for historical and predicted series.
#[derive(Debug, Clone)]
pub struct SeriesGenerator {
    rng: fastrand::Rng,
    today: TradingDate,
}

impl Default for SeriesGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesGenerator {
    /// Entropy-seeded generator anchored at the current UTC date.
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
            today: TradingDate::today(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            today: TradingDate::today(),
        }
    }

    /// Replaces the "today" anchor used as the last historical date.
    pub fn anchored_at(mut self, today: TradingDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> TradingDate {
        self.today
    }

    /// Generates `lookback_days + 1` daily bars ending on the anchor date.
    pub fn generate_historical(
        &mut self,
        symbol: &Symbol,
        base_price: f64,
        params: HistoricalParams,
    ) -> Result<Vec<PricePoint>, ValidationError> {
        validate_positive("base_price", base_price)?;
        validate_volatility(params.daily_volatility)?;
        if params.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ValidationError::LookbackOutOfRange {
                days: params.lookback_days,
                max: MAX_LOOKBACK_DAYS,
            });
        }

        let volatility = params.daily_volatility;
        let mut price = base_price;
        let mut points = Vec::with_capacity(params.lookback_days as usize + 1);

        for days_back in (0..=i64::from(params.lookback_days)).rev() {
            let date = self.today.offset_days(-days_back);
            let open = price;
            let change = price * volatility * (self.rng.f64() - 0.5) * 2.0;
            let close = open + change;
            let high = open.max(close) + price * volatility * self.rng.f64();
            let low = open.min(close) - price * volatility * self.rng.f64();
            let volume = self.rng.u64(VOLUME_RANGE);

            points.push(PricePoint::new(date, open, high, low, close, volume)?);
            price = close;
        }

        debug!(
            symbol = %symbol,
            points = points.len(),
            "generated synthetic historical series"
        );
        Ok(points)
    }

    /// Generates one predicted close per day after `last_date`.
    ///
    /// The trend direction is drawn once per call and applied as a constant
    /// drift under symmetric noise.
    pub fn generate_prediction(
        &mut self,
        symbol: &Symbol,
        last_close: f64,
        last_date: TradingDate,
        params: PredictionParams,
    ) -> Result<Vec<PredictedPoint>, ValidationError> {
        validate_positive("last_close", last_close)?;
        validate_volatility(params.volatility)?;

        let trend = if self.rng.bool() { 1.0 } else { -1.0 };
        let days = params.horizon.days();
        let mut price = last_close;
        let mut points = Vec::with_capacity(days as usize);

        for day in 1..=days {
            let noise = price * params.volatility * (self.rng.f64() - 0.5) * 2.0;
            let drift = price * TREND_DRIFT * trend;
            price = (price + noise + drift).max(MIN_PREDICTED_PRICE);
            points.push(PredictedPoint::new(
                last_date.offset_days(i64::from(day)),
                price,
            )?);
        }

        debug!(
            symbol = %symbol,
            horizon = days,
            trend,
            "generated synthetic prediction series"
        );
        Ok(points)
    }
}

fn validate_volatility(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue {
            field: "volatility",
        });
    }
    if !(0.0..MAX_VOLATILITY).contains(&value) {
        return Err(ValidationError::VolatilityOutOfRange {
            value: value.to_string(),
        });
    }
    Ok(())
}
