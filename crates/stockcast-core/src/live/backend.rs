use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::{decode, ensure_ascending, fetch_body, LiveSource, ProviderId, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{Horizon, Market, PredictedPoint, PricePoint, StockSummary, Symbol, TradingDate};

const PROVIDER: ProviderId = ProviderId::Backend;

/// Client for the dashboard's REST backend.
#[derive(Clone)]
pub struct BackendSource {
    base_url: String,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl BackendSource {
    pub fn new(base_url: impl Into<String>, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            http_client,
            timeout_ms: 5_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, request: HttpRequest) -> Result<T, SourceError> {
        let request = request
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);
        let body = fetch_body(self.http_client.as_ref(), PROVIDER, request).await?;
        decode(PROVIDER, &body)
    }

    async fn fetch_historical(&self, symbol: &Symbol) -> Result<Vec<PricePoint>, SourceError> {
        let url = self.url(&format!("/historical/{}", urlencoding::encode(symbol.as_str())));
        let rows: Vec<BackendPriceRow> = self.get_json(HttpRequest::get(url)).await?;

        let points = rows
            .into_iter()
            .map(BackendPriceRow::into_point)
            .collect::<Result<Vec<_>, _>>()?;
        ensure_ascending(PROVIDER, &points, |point| point.date)?;

        debug!(symbol = %symbol, points = points.len(), "backend historical series");
        Ok(points)
    }

    async fn fetch_prediction(
        &self,
        symbol: &Symbol,
        horizon: Horizon,
    ) -> Result<Vec<PredictedPoint>, SourceError> {
        let url = self.url(&format!(
            "/predict/{}?days={}",
            urlencoding::encode(symbol.as_str()),
            horizon.days()
        ));
        let rows: Vec<BackendPredictionRow> = self.get_json(HttpRequest::post(url)).await?;

        let points = rows
            .into_iter()
            .map(BackendPredictionRow::into_point)
            .collect::<Result<Vec<_>, _>>()?;
        ensure_ascending(PROVIDER, &points, |point| point.date)?;
        if points.len() != horizon.days() as usize {
            return Err(SourceError::schema_mismatch(
                PROVIDER,
                format!(
                    "expected {} predicted points, received {}",
                    horizon.days(),
                    points.len()
                ),
            ));
        }

        debug!(symbol = %symbol, horizon = horizon.days(), "backend prediction series");
        Ok(points)
    }

    async fn fetch_summaries(&self, url: String, limit: usize) -> Result<Vec<StockSummary>, SourceError> {
        let rows: Vec<BackendStockRow> = self.get_json(HttpRequest::get(url)).await?;
        let summaries = rows
            .into_iter()
            .take(limit)
            .map(BackendStockRow::into_summary)
            .collect::<Result<Vec<_>, _>>()?;
        if summaries.is_empty() {
            return Err(SourceError::unavailable(PROVIDER, "upstream returned no stocks"));
        }
        Ok(summaries)
    }
}

impl LiveSource for BackendSource {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    fn historical<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, Vec<PricePoint>> {
        Box::pin(self.fetch_historical(symbol))
    }

    fn prediction<'a>(
        &'a self,
        symbol: &'a Symbol,
        horizon: Horizon,
    ) -> SourceFuture<'a, Vec<PredictedPoint>> {
        Box::pin(self.fetch_prediction(symbol, horizon))
    }

    fn popular<'a>(&'a self, market: Market) -> SourceFuture<'a, Vec<StockSummary>> {
        Box::pin(async move {
            if market != Market::Us {
                return Err(SourceError::unsupported(PROVIDER, "popular india listing"));
            }
            self.fetch_summaries(self.url("/popular-stocks"), usize::MAX)
                .await
        })
    }

    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SourceFuture<'a, Vec<StockSummary>> {
        Box::pin(async move {
            let url = self.url(&format!("/search?q={}", urlencoding::encode(query.trim())));
            self.fetch_summaries(url, limit).await
        })
    }
}

#[derive(Debug, Deserialize)]
struct BackendPriceRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl BackendPriceRow {
    fn into_point(self) -> Result<PricePoint, SourceError> {
        let date = TradingDate::parse(&self.date).map_err(schema_error)?;
        PricePoint::new(date, self.open, self.high, self.low, self.close, self.volume)
            .map_err(schema_error)
    }
}

#[derive(Debug, Deserialize)]
struct BackendPredictionRow {
    date: String,
    prediction: f64,
}

impl BackendPredictionRow {
    fn into_point(self) -> Result<PredictedPoint, SourceError> {
        let date = TradingDate::parse(&self.date).map_err(schema_error)?;
        PredictedPoint::new(date, self.prediction).map_err(schema_error)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackendStockRow {
    symbol: String,
    #[serde(default)]
    name: String,
    price: f64,
    #[serde(default)]
    change: f64,
    #[serde(default)]
    change_percent: f64,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    market: Option<String>,
}

impl BackendStockRow {
    fn into_summary(self) -> Result<StockSummary, SourceError> {
        let symbol = Symbol::parse(&self.symbol).map_err(schema_error)?;
        let market = match self.market.as_deref() {
            Some(value) => value.parse::<Market>().map_err(schema_error)?,
            None => symbol.market(),
        };
        let name = if self.name.trim().is_empty() {
            symbol.base_ticker().to_owned()
        } else {
            self.name
        };
        Ok(StockSummary {
            currency: self
                .currency
                .unwrap_or_else(|| market.currency().to_owned()),
            symbol,
            name,
            price: self.price,
            change: self.change,
            change_percent: self.change_percent,
            market,
        })
    }
}

fn schema_error(error: crate::ValidationError) -> SourceError {
    SourceError::schema_mismatch(PROVIDER, error.to_string())
}
