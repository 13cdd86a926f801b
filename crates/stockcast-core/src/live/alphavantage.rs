use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{decode, fetch_body, LiveSource, ProviderId, SourceError, SourceFuture};
use crate::catalog;
use crate::http_client::{HttpClient, HttpRequest};
use crate::throttling::RateBudget;
use crate::{Horizon, Market, PredictedPoint, PricePoint, StockSummary, Symbol, TradingDate};

const PROVIDER: ProviderId = ProviderId::AlphaVantage;
const DAILY_SERIES_KEY: &str = "Time Series (Daily)";
const ERROR_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];
/// Number of most recent daily bars kept from a full series.
const DAILY_WINDOW: usize = 90;
/// Calls a listing leaves in the budget for the request that follows it.
const LISTING_RESERVE: u32 = 1;

/// Outcome of parsing a `TIME_SERIES_DAILY` payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DailySeriesParse {
    /// Latest bars in ascending date order.
    Series(Vec<PricePoint>),
    Rejected { reason: String },
}

impl DailySeriesParse {
    fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// Parses a daily time-series payload, keeping the latest 90 bars.
pub fn parse_daily_series(body: &str) -> DailySeriesParse {
    let payload: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(error) => return DailySeriesParse::rejected(format!("invalid JSON: {error}")),
    };
    let Some(object) = payload.as_object() else {
        return DailySeriesParse::rejected("payload is not a JSON object");
    };

    for key in ERROR_KEYS {
        if let Some(message) = object.get(key) {
            let text = message.as_str().unwrap_or("no details");
            return DailySeriesParse::rejected(format!("{key}: {text}"));
        }
    }

    let Some(series) = object.get(DAILY_SERIES_KEY).and_then(Value::as_object) else {
        return DailySeriesParse::rejected(format!("missing '{DAILY_SERIES_KEY}'"));
    };

    let mut bars = BTreeMap::new();
    for (date, fields) in series {
        let bar = match serde_json::from_value::<DailyBar>(fields.clone()) {
            Ok(bar) => bar,
            Err(error) => return DailySeriesParse::rejected(format!("bar {date}: {error}")),
        };
        match bar.into_point(date) {
            Ok(point) => {
                bars.insert(point.date, point);
            }
            Err(reason) => return DailySeriesParse::rejected(reason),
        }
    }

    if bars.is_empty() {
        return DailySeriesParse::rejected("time series is empty");
    }

    let skip = bars.len().saturating_sub(DAILY_WINDOW);
    DailySeriesParse::Series(bars.into_values().skip(skip).collect())
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

impl DailyBar {
    fn into_point(self, date: &str) -> Result<PricePoint, String> {
        let date = TradingDate::parse(date).map_err(|e| e.to_string())?;
        let open = parse_decimal("1. open", &self.open)?;
        let high = parse_decimal("2. high", &self.high)?;
        let low = parse_decimal("3. low", &self.low)?;
        let close = parse_decimal("4. close", &self.close)?;
        let volume = self
            .volume
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("field '5. volume' is not an integer: '{}'", self.volume))?;
        PricePoint::new(date, open, high, low, close, volume)
            .map_err(|e| format!("bar {date}: {e}"))
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<f64, String> {
    value
        .trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| format!("field '{field}' is not a number: '{value}'"))
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    quote: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SymbolSearchResponse {
    #[serde(rename = "bestMatches", default)]
    best_matches: Vec<SymbolSearchMatch>,
}

#[derive(Debug, Deserialize)]
struct SymbolSearchMatch {
    #[serde(rename = "1. symbol")]
    symbol: String,
    #[serde(rename = "2. name")]
    name: String,
    #[serde(rename = "4. region", default)]
    region: String,
}

/// Alpha Vantage client for Indian-market data.
#[derive(Clone)]
pub struct AlphaVantageSource {
    base_url: String,
    api_key: String,
    http_client: Arc<dyn HttpClient>,
    budget: RateBudget,
    timeout_ms: u64,
}

impl AlphaVantageSource {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        http_client: Arc<dyn HttpClient>,
        budget: RateBudget,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http_client,
            budget,
            timeout_ms: 5_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn query_url(&self, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}?", self.base_url);
        for (name, value) in params {
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            url.push('&');
        }
        url.push_str("apikey=");
        url.push_str(&urlencoding::encode(&self.api_key));
        url
    }

    /// Issues one budgeted GET and returns the response body.
    async fn call(&self, params: &[(&str, &str)]) -> Result<String, SourceError> {
        self.budget.try_acquire().map_err(|wait| budget_exhausted(1, wait))?;
        self.send(params).await
    }

    /// GET without touching the budget; the caller has already reserved it.
    async fn send(&self, params: &[(&str, &str)]) -> Result<String, SourceError> {
        let request = HttpRequest::get(self.query_url(params)).with_timeout_ms(self.timeout_ms);
        fetch_body(self.http_client.as_ref(), PROVIDER, request).await
    }

    async fn fetch_historical(&self, symbol: &Symbol) -> Result<Vec<PricePoint>, SourceError> {
        let body = self
            .call(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol.as_str()),
                ("outputsize", "full"),
            ])
            .await?;

        match parse_daily_series(&body) {
            DailySeriesParse::Series(points) => {
                debug!(symbol = %symbol, points = points.len(), "alphavantage daily series");
                Ok(points)
            }
            DailySeriesParse::Rejected { reason } => {
                Err(SourceError::schema_mismatch(PROVIDER, reason))
            }
        }
    }

    async fn fetch_quote(&self, listing: &StockSummary) -> Result<StockSummary, SourceError> {
        let body = self
            .send(&[("function", "GLOBAL_QUOTE"), ("symbol", listing.symbol.as_str())])
            .await?;
        let response: GlobalQuoteResponse = decode(PROVIDER, &body)?;
        if response.quote.is_empty() {
            return Err(SourceError::schema_mismatch(
                PROVIDER,
                format!("no quote for {}", listing.symbol),
            ));
        }

        let field = |name: &str| -> Result<f64, SourceError> {
            let raw = response.quote.get(name).ok_or_else(|| {
                SourceError::schema_mismatch(PROVIDER, format!("quote is missing '{name}'"))
            })?;
            parse_decimal(name, raw).map_err(|reason| SourceError::schema_mismatch(PROVIDER, reason))
        };

        Ok(StockSummary {
            price: field("05. price")?,
            change: field("09. change")?,
            change_percent: field("10. change percent")?,
            ..listing.clone()
        })
    }

    /// Quotes the catalog's Indian listings in order, as many as the budget
    /// allows while keeping one call in reserve. The whole batch is reserved
    /// up front; listings past it are left for the caller to fill.
    async fn fetch_india_listing(&self) -> Result<Vec<StockSummary>, SourceError> {
        let listings = catalog::popular_india();
        let affordable = self.budget.capacity().saturating_sub(LISTING_RESERVE);
        let batch = listings
            .len()
            .min(usize::try_from(affordable).unwrap_or(usize::MAX));
        if batch == 0 {
            return Err(SourceError::rate_limited(
                PROVIDER,
                "budget too small to quote the listing",
            ));
        }
        let calls = u32::try_from(batch).unwrap_or(affordable);
        self.budget
            .try_acquire_n(calls)
            .map_err(|wait| budget_exhausted(calls, wait))?;
        if batch < listings.len() {
            debug!(quoted = batch, listed = listings.len(), "alphavantage listing capped by budget");
        }

        let mut quotes = Vec::new();
        let mut last_error = None;
        for listing in listings.iter().take(batch) {
            match self.fetch_quote(listing).await {
                Ok(quote) => quotes.push(quote),
                Err(error) => {
                    warn!(symbol = %listing.symbol, error = %error, "skipping alphavantage quote");
                    last_error = Some(error);
                }
            }
        }

        if quotes.is_empty() {
            return Err(last_error.unwrap_or_else(|| {
                SourceError::unavailable(PROVIDER, "no quotes returned")
            }));
        }
        Ok(quotes)
    }

    async fn fetch_search(&self, query: &str, limit: usize) -> Result<Vec<StockSummary>, SourceError> {
        let body = self
            .call(&[("function", "SYMBOL_SEARCH"), ("keywords", query.trim())])
            .await?;
        let response: SymbolSearchResponse = decode(PROVIDER, &body)?;

        let matches: Vec<StockSummary> = response
            .best_matches
            .into_iter()
            .filter(|m| m.region == "India" || m.region.contains("BSE"))
            .filter_map(|m| {
                let raw = if m.symbol.to_ascii_uppercase().ends_with(".BSE") {
                    m.symbol
                } else {
                    format!("{}.BSE", m.symbol)
                };
                let symbol = Symbol::parse(&raw).ok()?;
                Some(StockSummary {
                    symbol,
                    name: m.name,
                    price: 0.0,
                    change: 0.0,
                    change_percent: 0.0,
                    currency: Market::India.currency().to_owned(),
                    market: Market::India,
                })
            })
            .take(limit)
            .collect();

        if matches.is_empty() {
            return Err(SourceError::unavailable(PROVIDER, "no India-region matches"));
        }
        Ok(matches)
    }
}

fn budget_exhausted(calls: u32, wait: Duration) -> SourceError {
    let message = if wait == Duration::MAX {
        format!("{calls} calls exceed the rate budget")
    } else {
        format!(
            "rate budget exhausted for {calls} call(s); next call in {:.1}s",
            wait.as_secs_f64()
        )
    };
    SourceError::rate_limited(PROVIDER, message)
}

impl LiveSource for AlphaVantageSource {
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
        let _ = (symbol, horizon);
        Box::pin(async move { Err(SourceError::unsupported(PROVIDER, "prediction")) })
    }

    fn popular<'a>(&'a self, market: Market) -> SourceFuture<'a, Vec<StockSummary>> {
        Box::pin(async move {
            match market {
                Market::India => self.fetch_india_listing().await,
                Market::Us => Err(SourceError::unsupported(PROVIDER, "popular us listing")),
            }
        })
    }

    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SourceFuture<'a, Vec<StockSummary>> {
        Box::pin(self.fetch_search(query, limit))
    }
}
