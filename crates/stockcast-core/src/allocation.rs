//! # Portfolio Allocation
//!
//! Splits an investment amount across a fixed rule table selected by risk
//! tier. Amounts are whole currency units and always sum exactly to the
//! requested total.
//!
//! ## Reconciliation
//!
//! Each rule receives `round(total × percentage / 100)`, rounding half away
//! from zero. Whatever rounding leaves over (positive or negative) is added
//! to the largest entry; among equal amounts the earliest rule wins. Entries
//! are returned in table order.
//!
//! ```rust,ignore
//! use stockcast_core::{AllocationEngine, RiskTier};
//!
//! let portfolio = AllocationEngine::default().allocate(100_000, RiskTier::Low)?;
//! assert_eq!(portfolio.entries.iter().map(|e| e.amount).sum::<i64>(), 100_000);
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AllocationError, ConfigError, RiskTier, Symbol, ValidationError};

/// One row of an allocation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllocationRule {
    pub symbol: Symbol,
    pub display_name: String,
    pub sector: String,
    /// Risk tier of the instrument itself, independent of the table it sits in.
    pub risk_tier: RiskTier,
    pub percentage: Decimal,
}

/// Validated allocation tables keyed by portfolio risk tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationTables {
    tables: BTreeMap<RiskTier, Vec<AllocationRule>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AllocationTablesDocument {
    low: Option<Vec<AllocationRule>>,
    medium: Option<Vec<AllocationRule>>,
    high: Option<Vec<AllocationRule>>,
}

impl AllocationTables {
    /// Validates every tier. All three tiers must be present.
    pub fn new(tables: BTreeMap<RiskTier, Vec<AllocationRule>>) -> Result<Self, ValidationError> {
        for tier in RiskTier::ALL {
            let rules = tables
                .get(&tier)
                .ok_or(ValidationError::MissingAllocationTable { tier })?;
            validate_table(tier, rules)?;
        }
        Ok(Self { tables })
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let document: AllocationTablesDocument = serde_json::from_str(input)?;
        let mut tables = BTreeMap::new();
        for (tier, rules) in [
            (RiskTier::Low, document.low),
            (RiskTier::Medium, document.medium),
            (RiskTier::High, document.high),
        ] {
            if let Some(rules) = rules {
                tables.insert(tier, rules);
            }
        }
        Ok(Self::new(tables)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Indian-market tables used by the dashboard.
    pub fn builtin() -> Self {
        let mut tables = BTreeMap::new();
        tables.insert(
            RiskTier::Low,
            vec![
                rule("HDFCBANK.BSE", "HDFC Bank", BANKING, RiskTier::Low, 25),
                rule("TCS.BSE", "Tata Consultancy Services", IT, RiskTier::Low, 20),
                rule("HINDUNILVR.BSE", "Hindustan Unilever", FMCG, RiskTier::Low, 20),
                rule("RELIANCE.BSE", "Reliance Industries", ENERGY, RiskTier::Medium, 15),
                rule("INFY.BSE", "Infosys", IT, RiskTier::Medium, 10),
                rule("SUNPHARMA.BSE", "Sun Pharmaceutical", PHARMA, RiskTier::Medium, 10),
            ],
        );
        tables.insert(
            RiskTier::Medium,
            vec![
                rule("HDFCBANK.BSE", "HDFC Bank", BANKING, RiskTier::Low, 20),
                rule("RELIANCE.BSE", "Reliance Industries", ENERGY, RiskTier::Medium, 20),
                rule("TCS.BSE", "Tata Consultancy Services", IT, RiskTier::Low, 15),
                rule("INFY.BSE", "Infosys", IT, RiskTier::Medium, 15),
                rule("TATAMOTORS.BSE", "Tata Motors", AUTO, RiskTier::High, 10),
                rule("AXISBANK.BSE", "Axis Bank", BANKING, RiskTier::Medium, 10),
                rule("HINDUNILVR.BSE", "Hindustan Unilever", FMCG, RiskTier::Low, 10),
            ],
        );
        tables.insert(
            RiskTier::High,
            vec![
                rule("TATAMOTORS.BSE", "Tata Motors", AUTO, RiskTier::High, 20),
                rule("RELIANCE.BSE", "Reliance Industries", ENERGY, RiskTier::Medium, 20),
                rule("SBIN.BSE", "State Bank of India", BANKING, RiskTier::High, 15),
                rule("ICICIBANK.BSE", "ICICI Bank", BANKING, RiskTier::Medium, 15),
                rule("INFY.BSE", "Infosys", IT, RiskTier::Medium, 10),
                rule("ADANIENT.BSE", "Adani Enterprises", "Infrastructure", RiskTier::High, 10),
                rule("HDFCBANK.BSE", "HDFC Bank", BANKING, RiskTier::Low, 5),
                rule("TATASTEEL.BSE", "Tata Steel", "Metals", RiskTier::High, 5),
            ],
        );
        Self { tables }
    }

    pub fn rules(&self, tier: RiskTier) -> &[AllocationRule] {
        self.tables.get(&tier).map(Vec::as_slice).unwrap_or_default()
    }
}

impl Default for AllocationTables {
    fn default() -> Self {
        Self::builtin()
    }
}

const BANKING: &str = "Banking & Finance";
const IT: &str = "IT & Technology";
const FMCG: &str = "FMCG";
const ENERGY: &str = "Energy";
const PHARMA: &str = "Pharmaceuticals";
const AUTO: &str = "Automobile";

fn rule(
    symbol: &str,
    display_name: &str,
    sector: &str,
    risk_tier: RiskTier,
    percentage: i64,
) -> AllocationRule {
    AllocationRule {
        symbol: Symbol::parse(symbol).expect("built-in allocation symbols are valid"),
        display_name: display_name.to_owned(),
        sector: sector.to_owned(),
        risk_tier,
        percentage: Decimal::from(percentage),
    }
}

fn validate_table(tier: RiskTier, rules: &[AllocationRule]) -> Result<(), ValidationError> {
    if rules.is_empty() {
        return Err(ValidationError::EmptyAllocationTable { tier });
    }

    let mut seen = HashSet::with_capacity(rules.len());
    let mut sum = Decimal::ZERO;
    for rule in rules {
        if rule.percentage <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePercentage {
                tier,
                symbol: rule.symbol.to_string(),
            });
        }
        if !seen.insert(&rule.symbol) {
            return Err(ValidationError::DuplicateAllocationRule {
                tier,
                symbol: rule.symbol.to_string(),
            });
        }
        sum += rule.percentage;
    }

    if sum != Decimal::ONE_HUNDRED {
        return Err(ValidationError::AllocationTableSum {
            tier,
            sum: sum.normalize().to_string(),
        });
    }
    Ok(())
}

/// One allocated position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub symbol: Symbol,
    pub display_name: String,
    pub sector: String,
    pub risk_tier: RiskTier,
    pub amount: i64,
    pub percentage_of_total: Decimal,
}

/// An allocated investment whose entry amounts sum exactly to `total_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub total_amount: i64,
    pub risk_tier: RiskTier,
    pub entries: Vec<AllocationEntry>,
}

/// Amount held in one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorAggregate {
    pub sector: String,
    pub amount: i64,
    pub percentage_of_total: f64,
}

impl Portfolio {
    /// Groups entries by sector in order of first appearance.
    pub fn sector_aggregates(&self) -> Vec<SectorAggregate> {
        let mut aggregates: Vec<SectorAggregate> = Vec::new();
        for entry in &self.entries {
            match aggregates.iter_mut().find(|agg| agg.sector == entry.sector) {
                Some(aggregate) => aggregate.amount += entry.amount,
                None => aggregates.push(SectorAggregate {
                    sector: entry.sector.clone(),
                    amount: entry.amount,
                    percentage_of_total: 0.0,
                }),
            }
        }

        if self.total_amount > 0 {
            for aggregate in &mut aggregates {
                aggregate.percentage_of_total =
                    aggregate.amount as f64 / self.total_amount as f64 * 100.0;
            }
        }
        aggregates
    }
}

/// Deterministic allocator over a validated set of tables.
#[derive(Debug, Clone, Default)]
pub struct AllocationEngine {
    tables: AllocationTables,
}

impl AllocationEngine {
    pub fn new(tables: AllocationTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &AllocationTables {
        &self.tables
    }

    pub fn allocate(
        &self,
        total_amount: i64,
        risk_tier: RiskTier,
    ) -> Result<Portfolio, AllocationError> {
        if total_amount <= 0 {
            return Err(ValidationError::NonPositiveAmount.into());
        }

        let rules = self.tables.rules(risk_tier);
        if rules.is_empty() {
            return Err(ValidationError::MissingAllocationTable { tier: risk_tier }.into());
        }

        let total = Decimal::from(total_amount);
        let mut entries = Vec::with_capacity(rules.len());
        for rule in rules {
            let amount = total
                .checked_mul(rule.percentage)
                .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
                .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
                .and_then(|value| value.to_i64())
                .ok_or_else(|| {
                    AllocationError::InvariantViolation(format!(
                        "share of {} for '{}' does not fit an integer amount",
                        total_amount, rule.symbol
                    ))
                })?;

            entries.push(AllocationEntry {
                symbol: rule.symbol.clone(),
                display_name: rule.display_name.clone(),
                sector: rule.sector.clone(),
                risk_tier: rule.risk_tier,
                amount,
                percentage_of_total: rule.percentage,
            });
        }

        let allocated: i128 = entries.iter().map(|entry| i128::from(entry.amount)).sum();
        let residual = i128::from(total_amount) - allocated;
        if residual != 0 {
            let largest = largest_entry(&entries);
            let entry = &mut entries[largest];
            let adjusted = i128::from(entry.amount) + residual;
            if adjusted < 0 {
                return Err(AllocationError::InvariantViolation(format!(
                    "residual {residual} would make '{}' negative",
                    entry.symbol
                )));
            }
            entry.amount = i64::try_from(adjusted).map_err(|_| {
                AllocationError::InvariantViolation(format!(
                    "reconciled amount for '{}' overflows",
                    entry.symbol
                ))
            })?;
            debug!(
                tier = %risk_tier,
                residual = %residual,
                symbol = %entry.symbol,
                "applied rounding residual to largest allocation"
            );
        }

        let reconciled: i128 = entries.iter().map(|entry| i128::from(entry.amount)).sum();
        if reconciled != i128::from(total_amount) {
            return Err(AllocationError::InvariantViolation(format!(
                "allocations sum to {reconciled}, expected {total_amount}"
            )));
        }

        Ok(Portfolio {
            total_amount,
            risk_tier,
            entries,
        })
    }
}

/// Index of the largest amount; the earliest entry wins ties.
fn largest_entry(entries: &[AllocationEntry]) -> usize {
    let mut best = 0;
    for (index, entry) in entries.iter().enumerate().skip(1) {
        if entry.amount > entries[best].amount {
            best = index;
        }
    }
    best
}
