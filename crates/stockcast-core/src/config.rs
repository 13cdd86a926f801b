use std::env;
use std::path::PathBuf;

use crate::ConfigError;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_ALPHAVANTAGE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_ALPHAVANTAGE_KEY: &str = "demo";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

const ENV_LIVE: &str = "STOCKCAST_LIVE";
const ENV_BACKEND_URL: &str = "STOCKCAST_BACKEND_URL";
const ENV_ALPHAVANTAGE_KEY: &str = "STOCKCAST_ALPHAVANTAGE_API_KEY";
const ENV_ALPHAVANTAGE_KEY_FALLBACK: &str = "ALPHAVANTAGE_API_KEY";
const ENV_TIMEOUT_MS: &str = "STOCKCAST_TIMEOUT_MS";
const ENV_SEED: &str = "STOCKCAST_SEED";
const ENV_ALLOCATION_TABLE: &str = "STOCKCAST_ALLOCATION_TABLE";

/// Settings for the data-source gateway and the allocation table location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// When false every call goes straight to synthetic data.
    pub live_enabled: bool,
    pub backend_url: String,
    pub alphavantage_url: String,
    pub alphavantage_api_key: String,
    pub timeout_ms: u64,
    pub seed: Option<u64>,
    pub allocation_table: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            live_enabled: false,
            backend_url: String::from(DEFAULT_BACKEND_URL),
            alphavantage_url: String::from(DEFAULT_ALPHAVANTAGE_URL),
            alphavantage_api_key: String::from(DEFAULT_ALPHAVANTAGE_KEY),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            seed: None,
            allocation_table: None,
        }
    }
}

impl GatewayConfig {
    /// Reads `STOCKCAST_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_LIVE) {
            config.live_enabled = parse_flag(ENV_LIVE, &value)?;
        }
        if let Some(value) = non_empty(lookup(ENV_BACKEND_URL)) {
            config.backend_url = value.trim_end_matches('/').to_owned();
        }
        if let Some(value) = non_empty(lookup(ENV_ALPHAVANTAGE_KEY))
            .or_else(|| non_empty(lookup(ENV_ALPHAVANTAGE_KEY_FALLBACK)))
        {
            config.alphavantage_api_key = value;
        }
        if let Some(value) = non_empty(lookup(ENV_TIMEOUT_MS)) {
            config.timeout_ms = parse_number(ENV_TIMEOUT_MS, &value)?;
            if config.timeout_ms == 0 {
                return Err(ConfigError::InvalidEnv {
                    name: ENV_TIMEOUT_MS,
                    value,
                });
            }
        }
        if let Some(value) = non_empty(lookup(ENV_SEED)) {
            config.seed = Some(parse_number(ENV_SEED, &value)?);
        }
        if let Some(value) = non_empty(lookup(ENV_ALLOCATION_TABLE)) {
            config.allocation_table = Some(PathBuf::from(value));
        }

        Ok(config)
    }

    pub fn with_live(mut self, enabled: bool) -> Self {
        self.live_enabled = enabled;
        self
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_alphavantage_url(mut self, url: impl Into<String>) -> Self {
        self.alphavantage_url = url.into();
        self
    }

    pub fn with_alphavantage_key(mut self, key: impl Into<String>) -> Self {
        self.alphavantage_api_key = key.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms.max(1);
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_allocation_table(mut self, path: Option<PathBuf>) -> Self {
        self.allocation_table = path;
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            name,
            value: value.to_owned(),
        }),
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidEnv {
            name,
            value: value.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_are_offline() {
        let config = GatewayConfig::from_vars(lookup(&[])).expect("config");
        assert_eq!(config, GatewayConfig::default());
        assert!(!config.live_enabled);
        assert_eq!(config.alphavantage_api_key, "demo");
    }

    #[test]
    fn reads_overrides_and_key_fallback() {
        let config = GatewayConfig::from_vars(lookup(&[
            ("STOCKCAST_LIVE", "yes"),
            ("STOCKCAST_BACKEND_URL", "http://api.test/api/"),
            ("ALPHAVANTAGE_API_KEY", "legacy-key"),
            ("STOCKCAST_TIMEOUT_MS", "750"),
            ("STOCKCAST_SEED", "42"),
        ]))
        .expect("config");

        assert!(config.live_enabled);
        assert_eq!(config.backend_url, "http://api.test/api");
        assert_eq!(config.alphavantage_api_key, "legacy-key");
        assert_eq!(config.timeout_ms, 750);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn prefixed_key_wins_over_fallback() {
        let config = GatewayConfig::from_vars(lookup(&[
            ("STOCKCAST_ALPHAVANTAGE_API_KEY", "primary"),
            ("ALPHAVANTAGE_API_KEY", "legacy-key"),
        ]))
        .expect("config");
        assert_eq!(config.alphavantage_api_key, "primary");
    }

    #[test]
    fn rejects_malformed_values() {
        let err = GatewayConfig::from_vars(lookup(&[("STOCKCAST_TIMEOUT_MS", "soon")]))
            .expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                name: "STOCKCAST_TIMEOUT_MS",
                ..
            }
        ));
        assert!(GatewayConfig::from_vars(lookup(&[("STOCKCAST_LIVE", "maybe")])).is_err());
        assert!(GatewayConfig::from_vars(lookup(&[("STOCKCAST_TIMEOUT_MS", "0")])).is_err());
    }
}
