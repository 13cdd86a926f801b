mod allocate;
mod chart;
mod historical;
mod popular;
mod predict;
mod search;

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use stockcast_core::catalog::is_supported_symbol;
use stockcast_core::{
    DataOrigin, DataSourceGateway, Envelope, EnvelopeError, GatewayConfig, Sourced, Symbol,
};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;

#[derive(Debug)]
pub struct CommandResult {
    pub data: Value,
    pub origin: Option<DataOrigin>,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            origin: None,
            warnings: Vec::new(),
        }
    }

    /// Carries a gateway result's origin and warnings into the envelope.
    pub fn from_sourced<T: Serialize>(sourced: Sourced<T>) -> Result<Self, CliError> {
        Ok(Self {
            data: serde_json::to_value(&sourced.data)?,
            origin: Some(sourced.origin),
            warnings: sourced.warnings,
        })
    }

    /// Flags tickers outside the dashboard's catalog; data is still served.
    pub fn with_catalog_check(mut self, symbol: &Symbol) -> Self {
        if !is_supported_symbol(symbol) {
            self.warnings
                .push(format!("{symbol} is not a supported dashboard symbol"));
        }
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let config = resolve_config(cli)?;
    let gateway = DataSourceGateway::from_config(&config);
    debug!(live = config.live_enabled, seed = ?config.seed, "resolved gateway config");

    let started = Instant::now();
    let command_result = match &cli.command {
        Command::Historical(args) => historical::run(args, &gateway).await?,
        Command::Predict(args) => predict::run(args, &gateway).await?,
        Command::Chart(args) => chart::run(args, &gateway).await?,
        Command::Popular(args) => popular::run(args, &gateway).await?,
        Command::Search(args) => search::run(args, &gateway).await?,
        Command::Allocate(args) => allocate::run(args, &config)?,
    };
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let CommandResult {
        data,
        origin,
        warnings,
    } = command_result;

    let mut metadata = Metadata::new(origin, latency_ms);
    for warning in warnings {
        metadata.push_warning(warning);
    }

    Ok(Envelope::success(metadata.into_envelope_meta()?, data))
}

/// Envelope for a failed command: null data and one entry in `errors`.
pub fn error_envelope(error: &CliError) -> Result<Envelope<Value>, CliError> {
    let meta = Metadata::new(None, 0).into_envelope_meta()?;
    let mut envelope = Envelope::success(meta, Value::Null);
    envelope.push_error(EnvelopeError::new(error.code(), error.to_string())?)?;
    Ok(envelope)
}

/// Environment first, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<GatewayConfig, CliError> {
    let mut config = GatewayConfig::from_env()?;
    if cli.live {
        config = config.with_live(true);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(Some(seed));
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use stockcast_core::{AllocationError, ValidationError};

    use super::*;

    #[test]
    fn failed_commands_become_error_envelopes() {
        let error = CliError::from(AllocationError::from(ValidationError::NonPositiveAmount));

        let envelope = error_envelope(&error).expect("envelope");
        assert_eq!(envelope.data, Value::Null);
        assert!(envelope.meta.origin.is_none());
        assert_eq!(envelope.errors.len(), 1);
        assert_eq!(envelope.errors[0].code, "validation.rejected");
        assert_eq!(envelope.errors[0].message, error.to_string());

        let json = serde_json::to_value(&envelope).expect("json");
        assert_eq!(json["errors"][0]["code"], "validation.rejected");
    }
}
