use clap::Args;
use portfolio_analytics_core::allocation::normalize_weights;
use portfolio_analytics_core::series::{compute_portfolio_returns, compute_returns};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::input;

/// Arguments for return series computation
#[derive(Args)]
pub struct ReturnsArgs {
    /// Price file: CSV (`date,<TICKER>...`), JSON or YAML. Reads JSON from stdin if omitted
    #[arg(long)]
    pub prices: Option<String>,

    /// Comma-separated allocation, one value per ticker; renormalized to sum to one.
    /// Prints the weighted portfolio return series instead of per-asset returns
    #[arg(long, value_delimiter = ',')]
    pub weights: Option<Vec<Decimal>>,
}

/// One row per date: `date` followed by either each asset's return or the
/// single `portfolio_return` column.
pub fn run_returns(args: ReturnsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let prices = input::prices::load_prices(args.prices.as_deref())?;
    let returns = compute_returns(&prices)?;

    let rows: Vec<Value> = match args.weights {
        Some(raw) => {
            let weights = normalize_weights(&raw)?;
            let portfolio = compute_portfolio_returns(&returns, &weights)?;
            portfolio
                .iter()
                .map(|(date, r)| {
                    let mut row = Map::new();
                    row.insert("date".into(), Value::String(date.to_string()));
                    row.insert("portfolio_return".into(), serde_json::to_value(r)?);
                    Ok(Value::Object(row))
                })
                .collect::<Result<_, serde_json::Error>>()?
        }
        None => returns
            .dates
            .iter()
            .zip(returns.rows.iter())
            .map(|(date, row_returns)| {
                let mut row = Map::new();
                row.insert("date".into(), Value::String(date.to_string()));
                for (asset, r) in returns.assets.iter().zip(row_returns.iter()) {
                    row.insert(asset.clone(), serde_json::to_value(r)?);
                }
                Ok(Value::Object(row))
            })
            .collect::<Result<_, serde_json::Error>>()?,
    };

    Ok(Value::Array(rows))
}
