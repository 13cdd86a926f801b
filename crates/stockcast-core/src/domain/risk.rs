use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Risk tier of an instrument, and of the allocation table chosen for a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Low => "Low risk stocks are generally more stable with less price volatility, but may offer lower returns.",
            Self::Medium => "Medium risk stocks have moderate price volatility and potential for moderate returns.",
            Self::High => "High risk stocks have higher price volatility but potential for higher returns.",
        }
    }
}

impl Display for RiskTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ValidationError::UnknownRiskTier {
                value: other.to_owned(),
            }),
        }
    }
}

/// Listing market of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    Us,
    India,
}

impl Market {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::India => "india",
        }
    }

    pub const fn currency(self) -> &'static str {
        match self {
            Self::Us => "USD",
            Self::India => "INR",
        }
    }
}

impl Display for Market {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "us" => Ok(Self::Us),
            "india" => Ok(Self::India),
            other => Err(ValidationError::UnknownMarket {
                value: other.to_owned(),
            }),
        }
    }
}
