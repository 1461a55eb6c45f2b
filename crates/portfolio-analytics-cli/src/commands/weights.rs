use clap::Args;
use portfolio_analytics_core::allocation::normalize_weights;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// Arguments for allocation normalization
#[derive(Args)]
pub struct NormalizeArgs {
    /// Comma-separated raw allocation values (e.g. "0.3,0.2,0.5")
    #[arg(long, value_delimiter = ',', required = true)]
    pub weights: Vec<Decimal>,

    /// Comma-separated ticker names, one per weight
    #[arg(long, value_delimiter = ',')]
    pub assets: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct NormalizeOutput {
    weights: Vec<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assets: Option<Vec<String>>,
    raw_total: Decimal,
    hhi: Decimal,
}

pub fn run_normalize(args: NormalizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(ref assets) = args.assets {
        if assets.len() != args.weights.len() {
            return Err(format!(
                "--assets has {} names but --weights has {} values",
                assets.len(),
                args.weights.len()
            )
            .into());
        }
    }

    let normalized = normalize_weights(&args.weights)?;
    let output = NormalizeOutput {
        raw_total: args.weights.iter().sum(),
        hhi: normalized.hhi(),
        weights: normalized.into_inner(),
        assets: args.assets,
    };

    Ok(serde_json::to_value(output)?)
}
