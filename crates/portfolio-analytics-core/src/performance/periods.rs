use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::series::PortfolioReturnSeries;
use crate::types::Rate;

/// Growth of one unit of capital up to and including `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    /// Running product of (1 + r).
    pub wealth_index: Decimal,
    /// `wealth_index - 1`.
    pub cumulative_return: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    pub value: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyReturn {
    pub year: i32,
    pub value: Rate,
}

/// Cumulative growth series of the portfolio.
pub fn cumulative_returns(series: &PortfolioReturnSeries) -> Vec<CumulativePoint> {
    let mut wealth = Decimal::ONE;
    series
        .iter()
        .map(|(date, r)| {
            wealth *= Decimal::ONE + r;
            CumulativePoint {
                date,
                wealth_index: wealth,
                cumulative_return: wealth - Decimal::ONE,
            }
        })
        .collect()
}

/// Returns compounded within each calendar month, oldest first.
pub fn monthly_returns(series: &PortfolioReturnSeries) -> Vec<MonthlyReturn> {
    compound_by(series, |d| (d.year(), d.month()))
        .into_iter()
        .map(|((year, month), value)| MonthlyReturn { year, month, value })
        .collect()
}

/// Returns compounded within each calendar year, oldest first.
pub fn yearly_returns(series: &PortfolioReturnSeries) -> Vec<YearlyReturn> {
    compound_by(series, |d| d.year())
        .into_iter()
        .map(|(year, value)| YearlyReturn { year, value })
        .collect()
}

fn compound_by<K: Ord>(
    series: &PortfolioReturnSeries,
    key: impl Fn(NaiveDate) -> K,
) -> BTreeMap<K, Rate> {
    let mut growth: BTreeMap<K, Decimal> = BTreeMap::new();
    for (date, r) in series.iter() {
        let g = growth.entry(key(date)).or_insert(Decimal::ONE);
        *g *= Decimal::ONE + r;
    }
    growth
        .into_iter()
        .map(|(k, g)| (k, g - Decimal::ONE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn sample() -> PortfolioReturnSeries {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        PortfolioReturnSeries {
            dates: vec![
                d(2023, 12, 28),
                d(2023, 12, 29),
                d(2024, 1, 2),
                d(2024, 1, 3),
                d(2024, 2, 1),
            ],
            returns: vec![dec!(0.1), dec!(-0.1), dec!(0.05), dec!(0.02), dec!(-0.5)],
        }
    }

    #[test]
    fn test_cumulative_returns() {
        let points = cumulative_returns(&sample());
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].wealth_index, dec!(1.1));
        assert_eq!(points[1].wealth_index, dec!(0.99));
        assert_eq!(points[1].cumulative_return, dec!(-0.01));
        // 0.99 * 1.05 * 1.02 * 0.5
        assert_eq!(points[4].wealth_index, dec!(0.530145));
    }

    #[test]
    fn test_monthly_returns_compound_within_month() {
        let months = monthly_returns(&sample());
        assert_eq!(
            months,
            vec![
                MonthlyReturn {
                    year: 2023,
                    month: 12,
                    value: dec!(-0.01),
                },
                MonthlyReturn {
                    year: 2024,
                    month: 1,
                    value: dec!(0.071),
                },
                MonthlyReturn {
                    year: 2024,
                    month: 2,
                    value: dec!(-0.5),
                },
            ]
        );
    }

    #[test]
    fn test_yearly_returns() {
        let years = yearly_returns(&sample());
        assert_eq!(
            years,
            vec![
                YearlyReturn {
                    year: 2023,
                    value: dec!(-0.01),
                },
                YearlyReturn {
                    year: 2024,
                    value: dec!(-0.4645),
                },
            ]
        );
    }

    #[test]
    fn test_empty_series() {
        let empty = PortfolioReturnSeries {
            dates: vec![],
            returns: vec![],
        };
        assert!(cumulative_returns(&empty).is_empty());
        assert!(monthly_returns(&empty).is_empty());
        assert!(yearly_returns(&empty).is_empty());
    }
}
