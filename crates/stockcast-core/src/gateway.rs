//! # Data Source Gateway
//!
//! Single entry point for market data. Every call tries the live source that
//! serves it and falls back to synthetic or catalog data on any failure:
//!
//! | Call | Live chain | Fallback |
//! |------|-----------|----------|
//! | historical, `.BSE` | Alpha Vantage | generated series |
//! | historical, other | backend | generated series |
//! | prediction | backend | generated history, then generated prediction |
//! | chart | historical, then prediction | prediction continues from the history actually served |
//! | popular US | backend | static US list |
//! | popular India | Alpha Vantage quotes | static India list, also filling unquoted rows |
//! | search, Indian query | Alpha Vantage, then backend | static search |
//! | search, other | backend | static search |
//!
//! Failures are logged at `warn` and reported as warnings on the
//! [`Sourced`] result. Only caller misuse is returned as an error. Nothing is
//! cached, so each call starts from scratch.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::catalog::{self, SEARCH_LIMIT};
use crate::chart;
use crate::generator::{HistoricalParams, PredictionParams, SeriesGenerator};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::live::{AlphaVantageSource, BackendSource, LiveSource, ProviderId, SourceError};
use crate::throttling::RateBudget;
use crate::{
    ChartPoint, GatewayConfig, Horizon, Market, PredictedPoint, PricePoint, StockSummary, Symbol,
    TradingDate, ValidationError,
};

/// Where a gateway result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataOrigin {
    Live(ProviderId),
    Synthetic,
}

impl DataOrigin {
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Live(_))
    }
}

impl Display for DataOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live(provider) => write!(f, "live:{provider}"),
            Self::Synthetic => f.write_str("synthetic"),
        }
    }
}

impl Serialize for DataOrigin {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A gateway result tagged with its origin and any absorbed failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub data: T,
    pub origin: DataOrigin,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T> Sourced<T> {
    fn live(data: T, provider: ProviderId, warnings: Vec<String>) -> Self {
        Self {
            data,
            origin: DataOrigin::Live(provider),
            warnings,
        }
    }

    fn synthetic(data: T, warnings: Vec<String>) -> Self {
        Self {
            data,
            origin: DataOrigin::Synthetic,
            warnings,
        }
    }
}

/// Live-or-fallback access to historical, prediction, listing and search data.
#[derive(Clone)]
pub struct DataSourceGateway {
    live_enabled: bool,
    seed: Option<u64>,
    today: Option<TradingDate>,
    backend: Arc<dyn LiveSource>,
    alphavantage: Arc<dyn LiveSource>,
}

impl DataSourceGateway {
    /// Gateway over the production reqwest transport.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config, Arc::new(ReqwestHttpClient::new()))
    }

    /// Builds both live sources on the given transport. Alpha Vantage calls
    /// draw from the process-wide [`RateBudget::alphavantage_shared`].
    pub fn new(config: &GatewayConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self::with_rate_budget(config, http_client, RateBudget::alphavantage_shared())
    }

    /// Same as [`new`](Self::new) with an explicit Alpha Vantage budget.
    /// Gateways given clones of one budget share its quota.
    pub fn with_rate_budget(
        config: &GatewayConfig,
        http_client: Arc<dyn HttpClient>,
        budget: RateBudget,
    ) -> Self {
        let backend = BackendSource::new(config.backend_url.clone(), Arc::clone(&http_client))
            .with_timeout_ms(config.timeout_ms);
        let alphavantage = AlphaVantageSource::new(
            config.alphavantage_url.clone(),
            config.alphavantage_api_key.clone(),
            http_client,
            budget,
        )
        .with_timeout_ms(config.timeout_ms);

        Self::with_sources(config, Arc::new(backend), Arc::new(alphavantage))
    }

    pub fn with_sources(
        config: &GatewayConfig,
        backend: Arc<dyn LiveSource>,
        alphavantage: Arc<dyn LiveSource>,
    ) -> Self {
        Self {
            live_enabled: config.live_enabled,
            seed: config.seed,
            today: None,
            backend,
            alphavantage,
        }
    }

    /// Fixes the date synthetic series end on.
    pub fn anchored_at(mut self, today: TradingDate) -> Self {
        self.today = Some(today);
        self
    }

    pub const fn live_enabled(&self) -> bool {
        self.live_enabled
    }

    /// Fresh generator per call so concurrent calls never share RNG state.
    fn generator(&self) -> SeriesGenerator {
        let generator = match self.seed {
            Some(seed) => SeriesGenerator::with_seed(seed),
            None => SeriesGenerator::new(),
        };
        match self.today {
            Some(today) => generator.anchored_at(today),
            None => generator,
        }
    }

    fn historical_source(&self, symbol: &Symbol) -> &Arc<dyn LiveSource> {
        match symbol.market() {
            Market::India => &self.alphavantage,
            Market::Us => &self.backend,
        }
    }

    pub async fn historical(
        &self,
        symbol: &Symbol,
    ) -> Result<Sourced<Vec<PricePoint>>, ValidationError> {
        let mut warnings = Vec::new();

        if self.live_enabled {
            let source = self.historical_source(symbol);
            let result = source.historical(symbol).await;
            if let Some(points) = absorb("historical", source.id(), result, &mut warnings) {
                return Ok(Sourced::live(points, source.id(), warnings));
            }
        }

        let points = self.synthetic_historical(symbol)?;
        Ok(Sourced::synthetic(points, warnings))
    }

    pub async fn prediction(
        &self,
        symbol: &Symbol,
        horizon: Horizon,
    ) -> Result<Sourced<Vec<PredictedPoint>>, ValidationError> {
        let mut warnings = Vec::new();

        if let Some(points) = self.live_prediction(symbol, horizon, &mut warnings).await {
            return Ok(Sourced::live(points, self.backend.id(), warnings));
        }

        let history = self.synthetic_historical(symbol)?;
        let points = self.synthetic_prediction(symbol, horizon, history.last())?;
        Ok(Sourced::synthetic(points, warnings))
    }

    async fn live_prediction(
        &self,
        symbol: &Symbol,
        horizon: Horizon,
        warnings: &mut Vec<String>,
    ) -> Option<Vec<PredictedPoint>> {
        if !self.live_enabled {
            return None;
        }
        let result = self.backend.prediction(symbol, horizon).await;
        absorb("prediction", self.backend.id(), result, warnings)
    }

    /// Generated prediction continuing from `last`, the final bar of whatever
    /// history the caller holds. Without one it starts from the catalog price
    /// on the anchor date.
    fn synthetic_prediction(
        &self,
        symbol: &Symbol,
        horizon: Horizon,
        last: Option<&PricePoint>,
    ) -> Result<Vec<PredictedPoint>, ValidationError> {
        let mut generator = self.generator();
        let (last_close, last_date) = match last {
            Some(last) => (last.close, last.date),
            None => (catalog::base_price_for(symbol), generator.today()),
        };
        generator.generate_prediction(symbol, last_close, last_date, PredictionParams::new(horizon))
    }

    pub async fn popular(&self, market: Market) -> Sourced<Vec<StockSummary>> {
        let mut warnings = Vec::new();

        if self.live_enabled {
            let source = match market {
                Market::Us => &self.backend,
                Market::India => &self.alphavantage,
            };
            let result = source.popular(market).await;
            if let Some(stocks) = absorb("popular", source.id(), result, &mut warnings) {
                let stocks = match market {
                    Market::Us => stocks,
                    Market::India => fill_from_catalog(stocks, market, &mut warnings),
                };
                return Sourced::live(stocks, source.id(), warnings);
            }
        }

        Sourced::synthetic(catalog::popular(market), warnings)
    }

    /// Searches by symbol or name, returning at most five matches.
    pub async fn search(
        &self,
        query: &str,
    ) -> Result<Sourced<Vec<StockSummary>>, ValidationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        let mut warnings = Vec::new();

        if self.live_enabled {
            let mut chain: Vec<&Arc<dyn LiveSource>> = Vec::with_capacity(2);
            if catalog::is_indian_query(query) {
                chain.push(&self.alphavantage);
            }
            chain.push(&self.backend);

            for source in chain {
                let result = source.search(query, SEARCH_LIMIT).await;
                if let Some(mut stocks) = absorb("search", source.id(), result, &mut warnings) {
                    stocks.truncate(SEARCH_LIMIT);
                    return Ok(Sourced::live(stocks, source.id(), warnings));
                }
            }
        }

        Ok(Sourced::synthetic(
            catalog::search_catalog(query, SEARCH_LIMIT),
            warnings,
        ))
    }

    /// Historical series merged with an optional prediction.
    ///
    /// The result is live only when every part came from a live source.
    pub async fn chart(
        &self,
        symbol: &Symbol,
        horizon: Option<Horizon>,
    ) -> Result<Sourced<Vec<ChartPoint>>, ValidationError> {
        let historical = self.historical(symbol).await?;
        let mut warnings = historical.warnings;
        let mut origin = historical.origin;

        let predicted = match horizon {
            Some(horizon) => match self.live_prediction(symbol, horizon, &mut warnings).await {
                Some(points) => Some(points),
                None => {
                    origin = DataOrigin::Synthetic;
                    Some(self.synthetic_prediction(symbol, horizon, historical.data.last())?)
                }
            },
            None => None,
        };

        Ok(Sourced {
            data: chart::merge(&historical.data, predicted.as_deref()),
            origin,
            warnings,
        })
    }

    fn synthetic_historical(&self, symbol: &Symbol) -> Result<Vec<PricePoint>, ValidationError> {
        self.generator().generate_historical(
            symbol,
            catalog::base_price_for(symbol),
            HistoricalParams::default(),
        )
    }
}

/// Lays live quotes over the catalog listing for `market`, keeping catalog
/// order. Listings the source did not quote keep their catalog row and are
/// named in a warning.
fn fill_from_catalog(
    mut quoted: Vec<StockSummary>,
    market: Market,
    warnings: &mut Vec<String>,
) -> Vec<StockSummary> {
    let listing = catalog::popular(market);
    let mut filled = Vec::with_capacity(listing.len().max(quoted.len()));

    for entry in listing {
        match quoted.iter().position(|stock| stock.symbol == entry.symbol) {
            Some(index) => filled.push(quoted.remove(index)),
            None => {
                debug!(symbol = %entry.symbol, "listing row served from catalog");
                warnings.push(format!("popular: {} served from catalog", entry.symbol));
                filled.push(entry);
            }
        }
    }
    filled.extend(quoted);
    filled
}

/// Converts a live outcome into data or a recorded warning. Empty data counts
/// as a failure.
fn absorb<T>(
    call: &'static str,
    provider: ProviderId,
    result: Result<Vec<T>, SourceError>,
    warnings: &mut Vec<String>,
) -> Option<Vec<T>> {
    let error = match result {
        Ok(data) if !data.is_empty() => {
            debug!(call, provider = %provider, items = data.len(), "live source answered");
            return Some(data);
        }
        Ok(_) => SourceError::unavailable(provider, "upstream returned no data"),
        Err(error) => error,
    };

    warn!(
        call,
        provider = %provider,
        code = error.code(),
        error = error.message(),
        "live source failed, falling back"
    );
    warnings.push(format!("{call}: {error}"));
    None
}
