use thiserror::Error;

use crate::RiskTier;

/// Caller-misuse errors exposed by `stockcast-core`.
///
/// These are the only errors a caller of the gateway has to handle; upstream
/// failures are absorbed by fallback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be greater than zero")]
    NonPositiveValue { field: &'static str },
    #[error("volatility {value} must be within [0, 0.5)")]
    VolatilityOutOfRange { value: String },

    #[error("price high must be >= max(open, close) and low must be <= min(open, close)")]
    InvalidPriceEnvelope,

    #[error("lookback of {days} days is outside the supported range 0..={max}")]
    LookbackOutOfRange { days: u32, max: u32 },
    #[error("prediction horizon {days} is outside the supported range 1..=30")]
    HorizonOutOfRange { days: i64 },

    #[error("investment amount must be greater than zero")]
    NonPositiveAmount,
    #[error("unknown risk tier '{value}', expected one of low, medium, high")]
    UnknownRiskTier { value: String },
    #[error("unknown market '{value}', expected one of us, india")]
    UnknownMarket { value: String },

    #[error("allocation table for '{tier}' must contain at least one rule")]
    EmptyAllocationTable { tier: RiskTier },
    #[error("allocation table for '{tier}' is missing")]
    MissingAllocationTable { tier: RiskTier },
    #[error("allocation percentages for '{tier}' sum to {sum}, expected exactly 100")]
    AllocationTableSum { tier: RiskTier, sum: String },
    #[error("allocation rule '{symbol}' in '{tier}' must have a positive percentage")]
    NonPositivePercentage { tier: RiskTier, symbol: String },
    #[error("allocation table for '{tier}' lists '{symbol}' more than once")]
    DuplicateAllocationRule { tier: RiskTier, symbol: String },

    #[error("search query must not be empty")]
    EmptyQuery,

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema version must match v<major>.<minor>.<patch>: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Errors from the allocation engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A reconciled allocation broke its own exact-sum contract. This is a
    /// defect in the engine, not an expected runtime condition.
    #[error("allocation invariant violated: {0}")]
    InvariantViolation(String),
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    #[error("failed to read allocation table '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("allocation table is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

