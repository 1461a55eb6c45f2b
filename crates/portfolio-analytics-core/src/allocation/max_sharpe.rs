use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::allocation::stats::{annualised_stats, AllocationStats};
use crate::allocation::weights::{equal_weights, WeightVector};
use crate::error::PortfolioError;
use crate::math::{checked_vec_dot, mat_vec_multiply, sqrt_decimal, vec_dot};
use crate::series::ReturnSeries;
use crate::PortfolioResult;

/// Trading days per year; the annualisation used when none is given.
pub const DEFAULT_PERIODS_PER_YEAR: u32 = 252;

const ARMIJO_FACTOR: Decimal = dec!(0.0001);
const MIN_STEP: Decimal = dec!(0.0000000001);
const MAX_STEP: Decimal = dec!(1000000);
const MAX_BACKTRACKS: u32 = 60;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Solver settings for the max-Sharpe optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxSharpeSettings {
    /// Periods per year used to annualise mean and covariance (252 for daily).
    pub periods_per_year: u32,
    /// Upper bound on accepted solver steps.
    pub max_iterations: u32,
    /// Convergence threshold on both the projected step and the objective change.
    pub tolerance: Decimal,
}

impl Default for MaxSharpeSettings {
    fn default() -> Self {
        Self {
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            max_iterations: 500,
            tolerance: dec!(0.000000001),
        }
    }
}

/// Converged max-Sharpe portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxSharpeSolution {
    pub weights: WeightVector,
    pub stats: AllocationStats,
    /// Accepted solver steps taken before convergence.
    pub iterations: u32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Long-only, fully invested weights maximising the annualised Sharpe ratio.
///
/// Convenience wrapper over [`optimize_max_sharpe_with_settings`] with the
/// default iteration budget and tolerance.
pub fn optimize_max_sharpe(
    returns: &ReturnSeries,
    periods_per_year: u32,
) -> PortfolioResult<WeightVector> {
    let settings = MaxSharpeSettings {
        periods_per_year,
        ..MaxSharpeSettings::default()
    };
    optimize_max_sharpe_with_settings(returns, &settings).map(|s| s.weights)
}

/// Maximise `mean(r)·w·P / sqrt(w' Cov(r) w · P)` over `w >= 0, Σw = 1`.
///
/// Spectral projected gradient: Barzilai-Borwein step lengths, exact
/// Euclidean projection onto the simplex and an Armijo backtracking search,
/// starting from equal weights. The result is a local stationary point.
/// A candidate with zero volatility scores zero and has a zero gradient.
/// When no descent step exists at Decimal precision (the Sharpe ratio grows
/// without bound towards a riskless corner) the current iterate is returned.
/// `OptimizationFailed` means the iteration budget ran out.
pub fn optimize_max_sharpe_with_settings(
    returns: &ReturnSeries,
    settings: &MaxSharpeSettings,
) -> PortfolioResult<MaxSharpeSolution> {
    validate(returns, settings)?;

    let objective = NegativeSharpe::new(returns, settings.periods_per_year);
    let tol = settings.tolerance;

    let mut w: Vec<Decimal> = equal_weights(returns.n_assets())?.into_inner();
    let mut f = objective.value(&w);
    let mut grad = objective.gradient(&w);
    let mut step = Decimal::ONE;

    for iteration in 0..settings.max_iterations {
        let mut trial = cap_step(step, &grad);
        let mut accepted = None;

        for _ in 0..MAX_BACKTRACKS {
            let shifted: Vec<Decimal> = w
                .iter()
                .zip(grad.iter())
                .map(|(wi, gi)| *wi - trial * *gi)
                .collect();
            let candidate = project_onto_simplex(&shifted);
            let direction: Vec<Decimal> = candidate
                .iter()
                .zip(w.iter())
                .map(|(c, wi)| *c - *wi)
                .collect();

            if max_abs(&direction) < tol {
                // Projected gradient step vanished: stationary point.
                return Ok(objective.solution(w, iteration));
            }

            let f_candidate = objective.value(&candidate);
            let sufficient = checked_vec_dot(&grad, &direction)
                .and_then(|slope| ARMIJO_FACTOR.checked_mul(slope))
                .and_then(|decrease| f.checked_add(decrease));
            if sufficient.is_some_and(|bound| f_candidate <= bound) {
                accepted = Some((candidate, direction, f_candidate));
                break;
            }
            trial /= dec!(2);
        }

        // No descent step exists at working precision. This happens when the
        // objective is unbounded towards a zero-volatility corner.
        let Some((candidate, direction, f_candidate)) = accepted else {
            debug!(iteration, "max-Sharpe line search stalled");
            return Ok(objective.solution(w, iteration));
        };

        let grad_next = objective.gradient(&candidate);
        step = barzilai_borwein_step(&direction, &grad, &grad_next);

        let change = (f - f_candidate).abs();
        w = candidate;
        f = f_candidate;
        grad = grad_next;

        if change <= tol * (Decimal::ONE + f.abs()) {
            return Ok(objective.solution(w, iteration + 1));
        }
    }

    warn!(
        iterations = settings.max_iterations,
        "max-Sharpe optimizer did not converge"
    );
    Err(PortfolioError::OptimizationFailed {
        iterations: settings.max_iterations,
        best_weights: w,
        message: format!(
            "no convergence within {} iterations (tolerance {})",
            settings.max_iterations, tol
        ),
    })
}

// ---------------------------------------------------------------------------
// Objective
// ---------------------------------------------------------------------------

/// Negative annualised Sharpe ratio over fixed sample moments.
struct NegativeSharpe {
    mu: Vec<Decimal>,
    sigma: Vec<Vec<Decimal>>,
    periods: Decimal,
    /// sqrt(periods): Sharpe annualises as mean·P / (sd·sqrt(P)).
    scale: Decimal,
}

impl NegativeSharpe {
    fn new(returns: &ReturnSeries, periods_per_year: u32) -> Self {
        let periods = Decimal::from(periods_per_year);
        Self {
            mu: returns.mean_returns(),
            sigma: returns.covariance_matrix(),
            periods,
            scale: sqrt_decimal(periods),
        }
    }

    /// Zero when the portfolio volatility is zero or the ratio does not fit
    /// in a Decimal.
    fn value(&self, w: &[Decimal]) -> Decimal {
        let sigma_w = mat_vec_multiply(&self.sigma, w);
        let sd = sqrt_decimal(vec_dot(w, &sigma_w));
        if sd.is_zero() {
            return Decimal::ZERO;
        }
        self.scale
            .checked_mul(vec_dot(&self.mu, w))
            .and_then(|excess| excess.checked_div(sd))
            .map_or(Decimal::ZERO, |sharpe| -sharpe)
    }

    /// d(-S)/dw = -scale * (mu - (mu·w) * Sigma·w / var) / sd
    ///
    /// Divides by the variance and the volatility separately; `sd^3` would
    /// underflow to zero long before `sd` does. Any overflow is treated like
    /// zero volatility.
    fn gradient(&self, w: &[Decimal]) -> Vec<Decimal> {
        let sigma_w = mat_vec_multiply(&self.sigma, w);
        let variance = vec_dot(w, &sigma_w);
        let sd = sqrt_decimal(variance);
        if sd.is_zero() {
            return vec![Decimal::ZERO; w.len()];
        }
        let ret = vec_dot(&self.mu, w);
        self.mu
            .iter()
            .zip(sigma_w.iter())
            .map(|(m, sw)| {
                let pull = ret.checked_mul(*sw)?.checked_div(variance)?;
                let per_vol = m.checked_sub(pull)?.checked_div(sd)?;
                self.scale.checked_mul(per_vol).map(|g| -g)
            })
            .collect::<Option<Vec<Decimal>>>()
            .unwrap_or_else(|| vec![Decimal::ZERO; w.len()])
    }

    fn solution(&self, w: Vec<Decimal>, iterations: u32) -> MaxSharpeSolution {
        let stats = annualised_stats(&self.mu, &self.sigma, &w, self.periods);
        debug!(
            iterations,
            sharpe = %stats.sharpe_ratio,
            "max-Sharpe optimizer converged"
        );
        MaxSharpeSolution {
            weights: WeightVector::from_normalized(w),
            stats,
            iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// Constraint helpers
// ---------------------------------------------------------------------------

/// Euclidean projection onto { w : w_i >= 0, Σ w_i = 1 } (sort and threshold).
fn project_onto_simplex(v: &[Decimal]) -> Vec<Decimal> {
    let mut sorted = v.to_vec();
    sorted.sort_by(|a, b| b.cmp(a));

    let mut cumulative = Decimal::ZERO;
    let mut theta = Decimal::ZERO;
    for (j, u) in sorted.iter().enumerate() {
        cumulative += *u;
        let candidate = (cumulative - Decimal::ONE) / Decimal::from((j + 1) as i64);
        if *u > candidate {
            theta = candidate;
        }
    }

    v.iter().map(|x| (*x - theta).max(Decimal::ZERO)).collect()
}

/// Shorten `step` so no coordinate moves further than `MAX_STEP`; keeps
/// `step * gradient` and the projection sums representable.
fn cap_step(step: Decimal, grad: &[Decimal]) -> Decimal {
    let largest = max_abs(grad);
    if largest.is_zero() {
        return step;
    }
    MAX_STEP
        .checked_div(largest)
        .map_or(step, |cap| step.min(cap))
}

/// Spectral step `s's / s'y` for the next iteration, clamped to
/// `[MIN_STEP, MAX_STEP]`. Non-positive curvature takes the longest step.
fn barzilai_borwein_step(direction: &[Decimal], grad: &[Decimal], grad_next: &[Decimal]) -> Decimal {
    let y: Option<Vec<Decimal>> = grad_next
        .iter()
        .zip(grad.iter())
        .map(|(a, b)| a.checked_sub(*b))
        .collect();
    let sy = y.and_then(|y| checked_vec_dot(direction, &y));
    match sy {
        Some(sy) if sy > Decimal::ZERO => vec_dot(direction, direction)
            .checked_div(sy)
            .map_or(MAX_STEP, |s| s.clamp(MIN_STEP, MAX_STEP)),
        _ => MAX_STEP,
    }
}

fn max_abs(v: &[Decimal]) -> Decimal {
    v.iter().map(|x| x.abs()).max().unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(returns: &ReturnSeries, settings: &MaxSharpeSettings) -> PortfolioResult<()> {
    returns.validate()?;

    if returns.n_assets() < 2 {
        return Err(PortfolioError::InsufficientData(format!(
            "At least 2 assets required for optimization, got {}",
            returns.n_assets()
        )));
    }
    if returns.n_observations() < 2 {
        return Err(PortfolioError::InsufficientData(format!(
            "At least 2 return observations required to estimate covariance, got {}",
            returns.n_observations()
        )));
    }
    if settings.periods_per_year == 0 {
        return Err(PortfolioError::InvalidInput {
            field: "periods_per_year".into(),
            reason: "Must be at least 1".into(),
        });
    }
    if settings.max_iterations == 0 {
        return Err(PortfolioError::InvalidInput {
            field: "max_iterations".into(),
            reason: "Must be at least 1".into(),
        });
    }
    if settings.tolerance <= Decimal::ZERO {
        return Err(PortfolioError::InvalidInput {
            field: "tolerance".into(),
            reason: format!("Must be positive, got {}", settings.tolerance),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
