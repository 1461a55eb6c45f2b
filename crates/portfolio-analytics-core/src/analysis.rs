use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use crate::allocation::{
    equal_weights, evaluate_allocation, normalize_weights, optimize_max_sharpe_with_settings,
    AllocationStats, MaxSharpeSettings, WeightVector,
};
use crate::error::PortfolioError;
use crate::performance::{
    cumulative_returns, monthly_returns, summarize_performance, yearly_returns, CumulativePoint,
    MonthlyReturn, PerformanceSummary, YearlyReturn,
};
use crate::series::{
    compute_portfolio_returns, compute_returns, PortfolioReturnSeries, PriceSeries, ReturnSeries,
};
use crate::types::{with_metadata, ComputationOutput, Rate, ReturnFrequency, Weight};
use crate::PortfolioResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How the portfolio weights are chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Weighting {
    /// User-entered allocation, one non-negative value per asset. Renormalized
    /// to sum to one.
    Manual { weights: Vec<Decimal> },
    EqualWeight,
    /// Long-only weights maximising the annualised Sharpe ratio.
    MaxSharpe,
}

/// A single analysis request: prices plus the weighting to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub prices: PriceSeries,
    pub weighting: Weighting,
    /// Observation frequency of `prices`; drives every annualisation.
    #[serde(default)]
    pub frequency: ReturnFrequency,
    /// Annual risk-free rate for the Sharpe ratio of the performance summary.
    #[serde(default)]
    pub risk_free_rate: Rate,
    /// Solver budget for `MaxSharpe`. Its `periods_per_year` is overridden
    /// by `frequency`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<MaxSharpeSettings>,
    /// Use equal weights, with a warning, when the optimizer fails to converge.
    #[serde(default)]
    pub fallback_to_equal_weight: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub asset: String,
    pub weight: Weight,
}

/// Everything a dashboard renders for one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub allocation: Vec<AllocationEntry>,
    /// Ex-ante annualised stats of the allocation from sample moments.
    pub allocation_stats: AllocationStats,
    /// Solver steps when the weights came from the optimizer.
    pub optimizer_iterations: Option<u32>,
    pub summary: PerformanceSummary,
    pub portfolio_returns: PortfolioReturnSeries,
    pub cumulative: Vec<CumulativePoint>,
    pub monthly_returns: Vec<MonthlyReturn>,
    pub yearly_returns: Vec<YearlyReturn>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a full portfolio analysis.
///
/// Prices are aligned and turned into returns, weights are resolved from the
/// requested weighting, and the weighted portfolio series is summarised.
pub fn analyze_portfolio(
    request: &AnalysisRequest,
) -> PortfolioResult<ComputationOutput<AnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if request.prices.assets.is_empty() {
        return Err(PortfolioError::InvalidInput {
            field: "prices.assets".into(),
            reason: "Select at least one asset".into(),
        });
    }

    let returns = compute_returns(&request.prices)?;
    let periods_per_year = request.frequency.periods_per_year();

    let (weights, optimizer_iterations) =
        resolve_weights(request, &returns, periods_per_year, &mut warnings)?;

    let portfolio_returns = compute_portfolio_returns(&returns, &weights)?;
    let allocation_stats = evaluate_allocation(&returns, &weights, periods_per_year)?;
    let summary = summarize_performance(
        &portfolio_returns,
        periods_per_year,
        request.risk_free_rate,
    )?;

    let allocation: Vec<AllocationEntry> = returns
        .assets
        .iter()
        .zip(weights.iter())
        .map(|(asset, w)| AllocationEntry {
            asset: asset.clone(),
            weight: *w,
        })
        .collect();

    if allocation.len() > 1 {
        for entry in &allocation {
            if entry.weight > dec!(0.40) {
                warnings.push(format!(
                    "Concentrated position: {} has weight {:.4}",
                    entry.asset, entry.weight
                ));
            }
        }
        let hhi = weights.hhi();
        if hhi > dec!(0.5) {
            warnings.push(format!("High concentration: HHI = {:.4}", hhi));
        }
    }

    info!(
        assets = returns.n_assets(),
        observations = returns.n_observations(),
        sharpe = %summary.sharpe_ratio,
        "portfolio analysis complete"
    );

    let output = AnalysisOutput {
        allocation,
        allocation_stats,
        optimizer_iterations,
        cumulative: cumulative_returns(&portfolio_returns),
        monthly_returns: monthly_returns(&portfolio_returns),
        yearly_returns: yearly_returns(&portfolio_returns),
        summary,
        portfolio_returns,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio Analytics (weighted returns, Sharpe, drawdown, CAGR, calendar returns)",
        &serde_json::json!({
            "assets": returns.n_assets(),
            "observations": returns.n_observations(),
            "frequency": request.frequency.to_string(),
            "weighting": weighting_label(&request.weighting),
            "risk_free_rate": request.risk_free_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_weights(
    request: &AnalysisRequest,
    returns: &ReturnSeries,
    periods_per_year: u32,
    warnings: &mut Vec<String>,
) -> PortfolioResult<(WeightVector, Option<u32>)> {
    let n = returns.n_assets();
    match &request.weighting {
        Weighting::Manual { weights } => {
            if weights.len() != n {
                return Err(PortfolioError::DimensionMismatch {
                    context: "manual weights".into(),
                    expected: n,
                    actual: weights.len(),
                });
            }
            let normalized = normalize_weights(weights)?;
            let total: Decimal = weights.iter().sum();
            if (total - Decimal::ONE).abs() > dec!(0.000000001) {
                warnings.push(format!(
                    "Weights summed to {}; renormalized to 1",
                    total.normalize()
                ));
            }
            Ok((normalized, None))
        }
        Weighting::EqualWeight => Ok((equal_weights(n)?, None)),
        // A single asset takes the whole allocation; nothing to optimize.
        Weighting::MaxSharpe if n == 1 => Ok((equal_weights(1)?, None)),
        Weighting::MaxSharpe => {
            let settings = MaxSharpeSettings {
                periods_per_year,
                ..request.optimizer.clone().unwrap_or_default()
            };
            match optimize_max_sharpe_with_settings(returns, &settings) {
                Ok(solution) => Ok((solution.weights, Some(solution.iterations))),
                Err(e @ PortfolioError::OptimizationFailed { .. })
                    if request.fallback_to_equal_weight =>
                {
                    warn!(error = %e, "falling back to equal weights");
                    warnings.push(format!("{}; fell back to equal weights", e));
                    Ok((equal_weights(n)?, None))
                }
                Err(e) => Err(e),
            }
        }
    }
}

fn weighting_label(weighting: &Weighting) -> &'static str {
    match weighting {
        Weighting::Manual { .. } => "manual",
        Weighting::EqualWeight => "equal_weight",
        Weighting::MaxSharpe => "max_sharpe",
    }
}
