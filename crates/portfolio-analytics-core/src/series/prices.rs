use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::error::PortfolioError;
use crate::PortfolioResult;

/// Closing prices of every asset on one date. `None` marks a missing close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub closes: Vec<Option<Decimal>>,
}

/// Closing prices for a set of tickers, one observation per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Ticker identifiers; column order for every observation.
    pub assets: Vec<String>,
    /// Observations in strictly increasing date order.
    pub observations: Vec<PriceObservation>,
}

impl PriceSeries {
    pub fn new(assets: Vec<String>, observations: Vec<PriceObservation>) -> Self {
        Self {
            assets,
            observations,
        }
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// True when every observation carries a close for every asset.
    pub fn is_complete(&self) -> bool {
        self.observations
            .iter()
            .all(|obs| obs.closes.iter().all(Option::is_some))
    }
}

/// Align a raw price series onto a common date index.
///
/// Leading observations in which any asset has no close are dropped (the
/// asset had not started trading, or the provider returned partial history).
/// After the first complete observation, a missing close is padded with that
/// asset's previous close.
pub fn align_prices(prices: &PriceSeries) -> PortfolioResult<PriceSeries> {
    validate_prices(prices)?;

    let first_complete = prices
        .observations
        .iter()
        .position(|obs| obs.closes.iter().all(Option::is_some))
        .ok_or_else(|| {
            PortfolioError::InsufficientData(
                "No date has a closing price for every asset".into(),
            )
        })?;

    if first_complete > 0 {
        debug!(
            dropped = first_complete,
            "dropped leading observations with missing closes"
        );
    }

    let mut last: Vec<Decimal> = prices.observations[first_complete]
        .closes
        .iter()
        .map(|c| c.unwrap_or_default())
        .collect();
    let mut padded = 0usize;
    let mut observations = Vec::with_capacity(prices.len() - first_complete);

    for obs in &prices.observations[first_complete..] {
        for (slot, close) in last.iter_mut().zip(obs.closes.iter()) {
            match close {
                Some(c) => *slot = *c,
                None => padded += 1,
            }
        }
        observations.push(PriceObservation {
            date: obs.date,
            closes: last.iter().copied().map(Some).collect(),
        });
    }

    if padded > 0 {
        debug!(padded, "padded interior gaps with previous closes");
    }

    Ok(PriceSeries {
        assets: prices.assets.clone(),
        observations,
    })
}

fn validate_prices(prices: &PriceSeries) -> PortfolioResult<()> {
    let n = prices.n_assets();
    if n == 0 {
        return Err(PortfolioError::InsufficientData(
            "At least one asset required".into(),
        ));
    }

    let mut seen = HashSet::with_capacity(n);
    for asset in &prices.assets {
        if !seen.insert(asset.as_str()) {
            return Err(PortfolioError::InvalidInput {
                field: "assets".into(),
                reason: format!("Duplicate asset '{}'", asset),
            });
        }
    }

    for (i, obs) in prices.observations.iter().enumerate() {
        if obs.closes.len() != n {
            return Err(PortfolioError::DimensionMismatch {
                context: format!("prices on {}", obs.date),
                expected: n,
                actual: obs.closes.len(),
            });
        }
        if i > 0 && obs.date <= prices.observations[i - 1].date {
            return Err(PortfolioError::InvalidInput {
                field: "observations".into(),
                reason: format!(
                    "Dates must be strictly increasing: {} follows {}",
                    obs.date,
                    prices.observations[i - 1].date
                ),
            });
        }
        for (asset, close) in prices.assets.iter().zip(obs.closes.iter()) {
            if let Some(c) = close {
                if *c <= Decimal::ZERO {
                    return Err(PortfolioError::InvalidInput {
                        field: format!("prices.{}", asset),
                        reason: format!("Close on {} must be positive, got {}", obs.date, c),
                    });
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn obs(d: u32, closes: Vec<Option<Decimal>>) -> PriceObservation {
        PriceObservation {
            date: date(d),
            closes,
        }
    }

    #[test]
    fn test_complete_series_unchanged() {
        let prices = PriceSeries::new(
            vec!["A".into(), "B".into()],
            vec![
                obs(2, vec![Some(dec!(100)), Some(dec!(50))]),
                obs(3, vec![Some(dec!(101)), Some(dec!(51))]),
            ],
        );
        let aligned = align_prices(&prices).unwrap();
        assert_eq!(aligned, prices);
        assert!(aligned.is_complete());
    }

    #[test]
    fn test_leading_missing_rows_dropped() {
        let prices = PriceSeries::new(
            vec!["A".into(), "B".into()],
            vec![
                obs(2, vec![Some(dec!(100)), None]),
                obs(3, vec![None, None]),
                obs(4, vec![Some(dec!(102)), Some(dec!(50))]),
                obs(5, vec![Some(dec!(103)), Some(dec!(51))]),
            ],
        );
        let aligned = align_prices(&prices).unwrap();
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned.observations[0].date, date(4));
    }

    #[test]
    fn test_interior_gap_padded() {
        let prices = PriceSeries::new(
            vec!["A".into(), "B".into()],
            vec![
                obs(2, vec![Some(dec!(100)), Some(dec!(50))]),
                obs(3, vec![Some(dec!(101)), None]),
                obs(4, vec![Some(dec!(102)), Some(dec!(52))]),
            ],
        );
        let aligned = align_prices(&prices).unwrap();
        assert_eq!(
            aligned.observations[1].closes,
            vec![Some(dec!(101)), Some(dec!(50))]
        );
    }

    #[test]
    fn test_no_complete_row() {
        let prices = PriceSeries::new(
            vec!["A".into(), "B".into()],
            vec![
                obs(2, vec![Some(dec!(100)), None]),
                obs(3, vec![None, Some(dec!(50))]),
            ],
        );
        assert!(matches!(
            align_prices(&prices),
            Err(PortfolioError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_non_increasing_dates_rejected() {
        let prices = PriceSeries::new(
            vec!["A".into()],
            vec![obs(3, vec![Some(dec!(100))]), obs(3, vec![Some(dec!(101))])],
        );
        assert!(matches!(
            align_prices(&prices),
            Err(PortfolioError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let prices = PriceSeries::new(
            vec!["A".into()],
            vec![obs(2, vec![Some(dec!(100))]), obs(3, vec![Some(dec!(0))])],
        );
        assert!(matches!(
            align_prices(&prices),
            Err(PortfolioError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_row_width_mismatch() {
        let prices = PriceSeries::new(
            vec!["A".into(), "B".into()],
            vec![obs(2, vec![Some(dec!(100))])],
        );
        assert!(matches!(
            align_prices(&prices),
            Err(PortfolioError::DimensionMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_assets_rejected() {
        let prices = PriceSeries::new(
            vec!["A".into(), "A".into()],
            vec![obs(2, vec![Some(dec!(100)), Some(dec!(100))])],
        );
        assert!(align_prices(&prices).is_err());
    }
}
