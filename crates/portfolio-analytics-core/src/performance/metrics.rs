use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PortfolioError;
use crate::math::{mean, sample_variance, sqrt_decimal};
use crate::series::PortfolioReturnSeries;
use crate::types::Rate;
use crate::PortfolioResult;

/// Headline statistics of a portfolio return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Compounded return over the whole series.
    pub total_return: Rate,
    /// Compound annual growth rate; `None` when the series spans no calendar time.
    pub cagr: Option<Rate>,
    /// Annualised standard deviation of periodic returns.
    pub volatility: Rate,
    pub sharpe_ratio: Decimal,
    /// Largest peak-to-trough decline of the wealth index, as a positive fraction.
    pub max_drawdown: Rate,
    pub observations: usize,
}

/// Sharpe ratio, max drawdown, CAGR and volatility of a portfolio return series.
///
/// `risk_free_rate` is annual and is de-annualised geometrically before being
/// subtracted from every periodic return.
pub fn summarize_performance(
    series: &PortfolioReturnSeries,
    periods_per_year: u32,
    risk_free_rate: Rate,
) -> PortfolioResult<PerformanceSummary> {
    if series.dates.len() != series.returns.len() {
        return Err(PortfolioError::DimensionMismatch {
            context: "portfolio return dates".into(),
            expected: series.returns.len(),
            actual: series.dates.len(),
        });
    }
    let n = series.len();
    if n < 2 {
        return Err(PortfolioError::InsufficientData(
            "At least 2 return observations required".into(),
        ));
    }
    if periods_per_year == 0 {
        return Err(PortfolioError::InvalidInput {
            field: "periods_per_year".into(),
            reason: "Must be at least 1".into(),
        });
    }

    let periods = Decimal::from(periods_per_year);
    let sqrt_periods = sqrt_decimal(periods);

    let mean_return = mean(&series.returns);
    let std_dev = sqrt_decimal(sample_variance(&series.returns, mean_return));
    let volatility = std_dev * sqrt_periods;

    let rf_per_period = per_period_rate(risk_free_rate, periods);
    let sharpe_ratio = if std_dev.is_zero() {
        Decimal::ZERO
    } else {
        (mean_return - rf_per_period) / std_dev * sqrt_periods
    };

    let total_return = total_return(&series.returns);
    let cagr = compound_annual_growth(series, total_return);

    Ok(PerformanceSummary {
        total_return,
        cagr,
        volatility,
        sharpe_ratio,
        max_drawdown: max_drawdown(&series.returns),
        observations: n,
    })
}

/// Maximum drawdown from a return series
pub fn max_drawdown(returns: &[Decimal]) -> Rate {
    let mut cumulative = Decimal::ONE;
    let mut peak = Decimal::ONE;
    let mut max_dd = Decimal::ZERO;

    for r in returns {
        cumulative *= Decimal::ONE + r;
        if cumulative > peak {
            peak = cumulative;
        }
        if !peak.is_zero() {
            let dd = (peak - cumulative) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Compounded return: Π(1 + r) - 1.
pub fn total_return(returns: &[Decimal]) -> Rate {
    returns
        .iter()
        .fold(Decimal::ONE, |acc, r| acc * (Decimal::ONE + r))
        - Decimal::ONE
}

fn compound_annual_growth(series: &PortfolioReturnSeries, total: Rate) -> Option<Rate> {
    let first = series.dates.first()?;
    let last = series.dates.last()?;
    let days = (*last - *first).num_days();
    if days <= 0 {
        return None;
    }
    let growth = Decimal::ONE + total;
    if growth <= Decimal::ZERO {
        return Some(-Decimal::ONE);
    }
    let years = Decimal::from(days) / dec!(365);
    growth
        .checked_powd(Decimal::ONE / years)
        .map(|g| g - Decimal::ONE)
}

fn per_period_rate(annual: Rate, periods: Decimal) -> Rate {
    if annual.is_zero() {
        return Decimal::ZERO;
    }
    (Decimal::ONE + annual)
        .checked_powd(Decimal::ONE / periods)
        .map(|g| g - Decimal::ONE)
        .unwrap_or(annual / periods)
}
