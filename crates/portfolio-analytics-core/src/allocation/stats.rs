use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PortfolioError;
use crate::math::{quadratic_form, sqrt_decimal, vec_dot};
use crate::series::ReturnSeries;
use crate::types::Rate;
use crate::PortfolioResult;

/// Annualised return, volatility and Sharpe ratio of a weight vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationStats {
    pub expected_return: Rate,
    pub volatility: Rate,
    /// Return over volatility; zero when volatility is zero.
    pub sharpe_ratio: Decimal,
}

/// Evaluate a weight vector against the sample moments of `returns`.
pub fn evaluate_allocation(
    returns: &ReturnSeries,
    weights: &[Decimal],
    periods_per_year: u32,
) -> PortfolioResult<AllocationStats> {
    returns.validate()?;
    if weights.len() != returns.n_assets() {
        return Err(PortfolioError::DimensionMismatch {
            context: "allocation weights".into(),
            expected: returns.n_assets(),
            actual: weights.len(),
        });
    }
    if periods_per_year == 0 {
        return Err(PortfolioError::InvalidInput {
            field: "periods_per_year".into(),
            reason: "Must be at least 1".into(),
        });
    }

    let mu = returns.mean_returns();
    let sigma = returns.covariance_matrix();
    Ok(annualised_stats(
        &mu,
        &sigma,
        weights,
        Decimal::from(periods_per_year),
    ))
}

pub(crate) fn annualised_stats(
    mu: &[Decimal],
    sigma: &[Vec<Decimal>],
    w: &[Decimal],
    periods: Decimal,
) -> AllocationStats {
    let expected_return = vec_dot(mu, w) * periods;
    let volatility = sqrt_decimal(quadratic_form(w, sigma) * periods);
    let sharpe_ratio = expected_return
        .checked_div(volatility)
        .unwrap_or(Decimal::ZERO);
    AllocationStats {
        expected_return,
        volatility,
        sharpe_ratio,
    }
}
