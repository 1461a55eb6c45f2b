use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PortfolioError;

/// Rates and returns expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Portfolio weight of a single asset (0.25 = 25% of capital).
pub type Weight = Decimal;

/// Frequency of return observations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl ReturnFrequency {
    /// Number of periods in a year for annualisation
    pub fn periods_per_year(&self) -> u32 {
        match self {
            ReturnFrequency::Daily => 252,
            ReturnFrequency::Weekly => 52,
            ReturnFrequency::Monthly => 12,
            ReturnFrequency::Quarterly => 4,
            ReturnFrequency::Annual => 1,
        }
    }
}

impl FromStr for ReturnFrequency {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(ReturnFrequency::Daily),
            "weekly" => Ok(ReturnFrequency::Weekly),
            "monthly" => Ok(ReturnFrequency::Monthly),
            "quarterly" => Ok(ReturnFrequency::Quarterly),
            "annual" | "annually" => Ok(ReturnFrequency::Annual),
            other => Err(PortfolioError::InvalidInput {
                field: "frequency".into(),
                reason: format!(
                    "Unknown frequency '{}'. Use: daily, weekly, monthly, quarterly, annual",
                    other
                ),
            }),
        }
    }
}

impl fmt::Display for ReturnFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReturnFrequency::Daily => "daily",
            ReturnFrequency::Weekly => "weekly",
            ReturnFrequency::Monthly => "monthly",
            ReturnFrequency::Quarterly => "quarterly",
            ReturnFrequency::Annual => "annual",
        };
        f.write_str(name)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periods_per_year() {
        assert_eq!(ReturnFrequency::Daily.periods_per_year(), 252);
        assert_eq!(ReturnFrequency::Monthly.periods_per_year(), 12);
        assert_eq!(ReturnFrequency::Annual.periods_per_year(), 1);
    }

    #[test]
    fn test_frequency_parse_case_insensitive() {
        assert_eq!(
            "Weekly".parse::<ReturnFrequency>().unwrap(),
            ReturnFrequency::Weekly
        );
        assert_eq!(
            "annually".parse::<ReturnFrequency>().unwrap(),
            ReturnFrequency::Annual
        );
        assert!("hourly".parse::<ReturnFrequency>().is_err());
    }

    #[test]
    fn test_frequency_serde_lowercase() {
        let json = serde_json::to_string(&ReturnFrequency::Quarterly).unwrap();
        assert_eq!(json, "\"quarterly\"");
        let parsed: ReturnFrequency = serde_json::from_str("\"daily\"").unwrap();
        assert_eq!(parsed, ReturnFrequency::Daily);
    }
}
