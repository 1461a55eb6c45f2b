use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PortfolioError;
use crate::math::{column_means, sample_covariance_matrix, vec_dot};
use crate::series::prices::{align_prices, PriceSeries};
use crate::PortfolioResult;

/// Period-over-period relative price changes, one row per date, one column
/// per asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub assets: Vec<String>,
    /// Date each row's return was realised on.
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<Vec<Decimal>>,
}

impl ReturnSeries {
    /// Build a return series from already computed rows, validating its shape.
    pub fn new(
        assets: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<Decimal>>,
    ) -> PortfolioResult<Self> {
        let series = Self {
            assets,
            dates,
            rows,
        };
        series.validate()?;
        Ok(series)
    }

    /// Check the shape invariants: one date per row, one value per asset in
    /// every row, strictly increasing dates.
    pub fn validate(&self) -> PortfolioResult<()> {
        let n = self.n_assets();
        if self.dates.len() != self.rows.len() {
            return Err(PortfolioError::DimensionMismatch {
                context: "return series dates".into(),
                expected: self.rows.len(),
                actual: self.dates.len(),
            });
        }
        for (date, row) in self.dates.iter().zip(self.rows.iter()) {
            if row.len() != n {
                return Err(PortfolioError::DimensionMismatch {
                    context: format!("returns on {}", date),
                    expected: n,
                    actual: row.len(),
                });
            }
        }
        if let Some(pair) = self.dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(PortfolioError::InvalidInput {
                field: "dates".into(),
                reason: format!(
                    "Dates must be strictly increasing: {} follows {}",
                    pair[1], pair[0]
                ),
            });
        }
        Ok(())
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn n_observations(&self) -> usize {
        self.rows.len()
    }

    /// Returns of a single asset across all dates.
    pub fn column(&self, asset: usize) -> Vec<Decimal> {
        self.rows.iter().map(|row| row[asset]).collect()
    }

    /// Mean periodic return per asset.
    pub fn mean_returns(&self) -> Vec<Decimal> {
        column_means(&self.rows, self.n_assets())
    }

    /// Sample (n-1) covariance matrix of periodic returns.
    pub fn covariance_matrix(&self) -> Vec<Vec<Decimal>> {
        sample_covariance_matrix(&self.rows, self.n_assets())
    }
}

/// Weighted portfolio return per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReturnSeries {
    pub dates: Vec<NaiveDate>,
    pub returns: Vec<Decimal>,
}

impl PortfolioReturnSeries {
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Iterate `(date, return)` pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Decimal)> + '_ {
        self.dates.iter().copied().zip(self.returns.iter().copied())
    }
}

/// Compute period-over-period returns `(p_t - p_{t-1}) / p_{t-1}`.
///
/// Prices are aligned first; the first aligned row has no predecessor and
/// produces no return.
pub fn compute_returns(prices: &PriceSeries) -> PortfolioResult<ReturnSeries> {
    let aligned = align_prices(prices)?;
    if aligned.len() < 2 {
        return Err(PortfolioError::InsufficientData(format!(
            "At least 2 aligned price observations required, got {}",
            aligned.len()
        )));
    }

    let mut dates = Vec::with_capacity(aligned.len() - 1);
    let mut rows = Vec::with_capacity(aligned.len() - 1);

    for pair in aligned.observations.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let row = prev
            .closes
            .iter()
            .zip(cur.closes.iter())
            .map(|(p0, p1)| {
                let p0 = p0.unwrap_or_default();
                let p1 = p1.unwrap_or_default();
                if p0.is_zero() {
                    return Err(PortfolioError::DivisionByZero {
                        context: format!("return on {}: previous close is zero", cur.date),
                    });
                }
                Ok((p1 - p0) / p0)
            })
            .collect::<PortfolioResult<Vec<Decimal>>>()?;
        dates.push(cur.date);
        rows.push(row);
    }

    Ok(ReturnSeries {
        assets: aligned.assets,
        dates,
        rows,
    })
}

/// Weighted sum of asset returns for every date.
pub fn compute_portfolio_returns(
    returns: &ReturnSeries,
    weights: &[Decimal],
) -> PortfolioResult<PortfolioReturnSeries> {
    returns.validate()?;
    if weights.len() != returns.n_assets() {
        return Err(PortfolioError::DimensionMismatch {
            context: "portfolio weights".into(),
            expected: returns.n_assets(),
            actual: weights.len(),
        });
    }

    Ok(PortfolioReturnSeries {
        dates: returns.dates.clone(),
        returns: returns.rows.iter().map(|row| vec_dot(row, weights)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::prices::PriceObservation;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn two_asset_returns() -> ReturnSeries {
        ReturnSeries::new(
            vec!["A".into(), "B".into()],
            vec![date(4), date(5), date(6)],
            vec![
                vec![dec!(0.01), dec!(0.02)],
                vec![dec!(-0.02), dec!(0.01)],
                vec![dec!(0.03), dec!(-0.01)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_portfolio_returns_hand_computed() {
        let returns = two_asset_returns();
        let out = compute_portfolio_returns(&returns, &[dec!(0.6), dec!(0.4)]).unwrap();
        // 0.6*0.01 + 0.4*0.02 = 0.014
        // 0.6*-0.02 + 0.4*0.01 = -0.008
        // 0.6*0.03 + 0.4*-0.01 = 0.014
        assert_eq!(out.returns, vec![dec!(0.014), dec!(-0.008), dec!(0.014)]);
        assert_eq!(out.dates, returns.dates);
        assert_eq!(out.len(), returns.n_observations());
    }

    #[test]
    fn test_portfolio_returns_dimension_mismatch() {
        let returns = ReturnSeries::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![date(4)],
            vec![vec![dec!(0.01), dec!(0.02), dec!(0.03)]],
        )
        .unwrap();
        let err = compute_portfolio_returns(&returns, &[dec!(0.5), dec!(0.5)]).unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::DimensionMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_compute_returns_drops_first_row() {
        let prices = PriceSeries::new(
            vec!["A".into()],
            vec![
                PriceObservation {
                    date: date(1),
                    closes: vec![Some(dec!(100))],
                },
                PriceObservation {
                    date: date(4),
                    closes: vec![Some(dec!(105))],
                },
                PriceObservation {
                    date: date(5),
                    closes: vec![Some(dec!(84))],
                },
            ],
        );
        let returns = compute_returns(&prices).unwrap();
        assert_eq!(returns.dates, vec![date(4), date(5)]);
        assert_eq!(returns.rows, vec![vec![dec!(0.05)], vec![dec!(-0.2)]]);
    }

    #[test]
    fn test_compute_returns_single_row_insufficient() {
        let prices = PriceSeries::new(
            vec!["A".into()],
            vec![PriceObservation {
                date: date(1),
                closes: vec![Some(dec!(100))],
            }],
        );
        assert!(matches!(
            compute_returns(&prices),
            Err(PortfolioError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let result = ReturnSeries::new(
            vec!["A".into(), "B".into()],
            vec![date(4), date(5)],
            vec![vec![dec!(0.01), dec!(0.02)], vec![dec!(0.01)]],
        );
        assert!(matches!(
            result,
            Err(PortfolioError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_new_rejects_date_count_mismatch() {
        let result = ReturnSeries::new(
            vec!["A".into()],
            vec![date(4)],
            vec![vec![dec!(0.01)], vec![dec!(0.02)]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_column_and_means() {
        let returns = two_asset_returns();
        assert_eq!(returns.column(1), vec![dec!(0.02), dec!(0.01), dec!(-0.01)]);
        let means = returns.mean_returns();
        // (0.01 - 0.02 + 0.03) / 3
        assert_eq!(means[0], dec!(0.02) / dec!(3));
    }
}
