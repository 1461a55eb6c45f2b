use clap::Args;
use portfolio_analytics_core::allocation::{optimize_max_sharpe_with_settings, MaxSharpeSettings};
use portfolio_analytics_core::series::compute_returns;
use portfolio_analytics_core::types::{with_metadata, ReturnFrequency};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use crate::input;

/// Arguments for max-Sharpe optimization
#[derive(Args)]
pub struct OptimizeArgs {
    /// Price file: CSV (`date,<TICKER>...`), JSON or YAML. Reads JSON from stdin if omitted
    #[arg(long)]
    pub prices: Option<String>,

    /// Price frequency for annualisation: daily, weekly, monthly, quarterly, annual
    #[arg(long, default_value = "daily")]
    pub frequency: String,

    /// Maximum accepted solver steps
    #[arg(long, default_value = "500")]
    pub max_iterations: u32,

    /// Convergence tolerance on the projected step and objective change
    #[arg(long, default_value = "0.000000001")]
    pub tolerance: Decimal,
}

#[derive(Debug, Serialize)]
struct AssetWeight {
    asset: String,
    weight: Decimal,
}

#[derive(Debug, Serialize)]
struct OptimizeOutput {
    sharpe_ratio: Decimal,
    expected_return: Decimal,
    volatility: Decimal,
    iterations: u32,
    weights: Vec<AssetWeight>,
}

pub fn run_optimize(args: OptimizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let frequency: ReturnFrequency = args.frequency.parse()?;
    let prices = input::prices::load_prices(args.prices.as_deref())?;
    let returns = compute_returns(&prices)?;

    let settings = MaxSharpeSettings {
        periods_per_year: frequency.periods_per_year(),
        max_iterations: args.max_iterations,
        tolerance: args.tolerance,
    };
    let solution = optimize_max_sharpe_with_settings(&returns, &settings)?;

    let weights = returns
        .assets
        .iter()
        .zip(solution.weights.iter())
        .map(|(asset, w)| AssetWeight {
            asset: asset.clone(),
            weight: *w,
        })
        .collect();

    let output = with_metadata(
        "Max-Sharpe (long-only, fully invested; spectral projected gradient)",
        &serde_json::json!({
            "assets": returns.n_assets(),
            "observations": returns.n_observations(),
            "frequency": frequency.to_string(),
            "max_iterations": settings.max_iterations,
            "tolerance": settings.tolerance.to_string(),
        }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        OptimizeOutput {
            sharpe_ratio: solution.stats.sharpe_ratio,
            expected_return: solution.stats.expected_return,
            volatility: solution.stats.volatility,
            iterations: solution.iterations,
            weights,
        },
    );

    Ok(serde_json::to_value(output)?)
}
