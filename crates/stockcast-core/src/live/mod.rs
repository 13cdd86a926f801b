//! # Live Sources
//!
//! Adapters for the upstream services the gateway tries before falling back
//! to synthetic data.
//!
//! | Source | Historical | Prediction | Popular | Search |
//! |--------|-----------|------------|---------|--------|
//! | [`BackendSource`] | yes | yes | US | yes |
//! | [`AlphaVantageSource`] | yes | no | India | India-region matches |
//!
//! Every failure, including an empty or malformed payload, surfaces as a
//! [`SourceError`]. Adapters never synthesize data themselves.

mod alphavantage;
mod backend;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::http_client::{HttpClient, HttpRequest};
use crate::{Horizon, Market, PredictedPoint, PricePoint, StockSummary, Symbol};

pub use alphavantage::{parse_daily_series, AlphaVantageSource, DailySeriesParse};
pub use backend::BackendSource;

/// Boxed future returned by [`LiveSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Upstream provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Backend,
    AlphaVantage,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::AlphaVantage => "alphavantage",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure, non-success status or empty result.
    Unavailable,
    RateLimited,
    /// Payload did not match the expected schema or carried an error field.
    SchemaMismatch,
    Unsupported,
}

/// Structured live-source failure. The gateway turns these into warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    provider: ProviderId,
    message: String,
}

impl SourceError {
    pub fn new(kind: SourceErrorKind, provider: ProviderId, message: impl Into<String>) -> Self {
        Self {
            kind,
            provider,
            message: message.into(),
        }
    }

    pub fn unavailable(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, provider, message)
    }

    pub fn rate_limited(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, provider, message)
    }

    pub fn schema_mismatch(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::SchemaMismatch, provider, message)
    }

    pub fn unsupported(provider: ProviderId, operation: &str) -> Self {
        Self::new(
            SourceErrorKind::Unsupported,
            provider,
            format!("{operation} is not supported by {provider}"),
        )
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::SchemaMismatch => "source.schema_mismatch",
            SourceErrorKind::Unsupported => "source.unsupported",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.provider, self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Live upstream contract.
///
/// Implementations must be `Send + Sync`; the gateway holds them behind `Arc`.
pub trait LiveSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Daily bars in ascending date order.
    fn historical<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, Vec<PricePoint>>;

    /// Exactly `horizon` forecast points in ascending date order.
    fn prediction<'a>(
        &'a self,
        symbol: &'a Symbol,
        horizon: Horizon,
    ) -> SourceFuture<'a, Vec<PredictedPoint>>;

    fn popular<'a>(&'a self, market: Market) -> SourceFuture<'a, Vec<StockSummary>>;

    fn search<'a>(&'a self, query: &'a str, limit: usize) -> SourceFuture<'a, Vec<StockSummary>>;
}

/// Sends a request and returns the body of a successful response.
pub(crate) async fn fetch_body(
    client: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
) -> Result<String, SourceError> {
    let response = client.execute(request).await.map_err(|e| {
        SourceError::unavailable(provider, format!("transport error: {}", e.message()))
    })?;

    if !response.is_success() {
        return Err(SourceError::unavailable(
            provider,
            format!("upstream returned status {}", response.status),
        ));
    }
    Ok(response.body)
}

pub(crate) fn decode<T: DeserializeOwned>(
    provider: ProviderId,
    body: &str,
) -> Result<T, SourceError> {
    serde_json::from_str(body)
        .map_err(|e| SourceError::schema_mismatch(provider, format!("unexpected payload: {e}")))
}

/// Rejects empty results and series that are not strictly ascending by date.
pub(crate) fn ensure_ascending<T, D: PartialOrd>(
    provider: ProviderId,
    items: &[T],
    date: impl Fn(&T) -> D,
) -> Result<(), SourceError> {
    if items.is_empty() {
        return Err(SourceError::unavailable(provider, "upstream returned no data"));
    }
    if items.windows(2).any(|pair| date(&pair[0]) >= date(&pair[1])) {
        return Err(SourceError::schema_mismatch(
            provider,
            "series dates are not strictly increasing",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        let error = SourceError::rate_limited(ProviderId::AlphaVantage, "quota");
        assert_eq!(error.code(), "source.rate_limited");
        assert_eq!(error.to_string(), "alphavantage: quota (source.rate_limited)");

        let error = SourceError::unsupported(ProviderId::Backend, "popular india");
        assert_eq!(error.kind(), SourceErrorKind::Unsupported);
        assert_eq!(error.message(), "popular india is not supported by backend");
    }

    #[test]
    fn ascending_check_rejects_empty_and_unordered() {
        let empty: [u32; 0] = [];
        assert_eq!(
            ensure_ascending(ProviderId::Backend, &empty, |v| *v)
                .expect_err("empty")
                .kind(),
            SourceErrorKind::Unavailable
        );
        assert_eq!(
            ensure_ascending(ProviderId::Backend, &[1, 3, 3], |v| *v)
                .expect_err("duplicate")
                .kind(),
            SourceErrorKind::SchemaMismatch
        );
        assert!(ensure_ascending(ProviderId::Backend, &[1, 2, 5], |v| *v).is_ok());
    }
}
