use clap::{Args, ValueEnum};
use portfolio_analytics_core::allocation::MaxSharpeSettings;
use portfolio_analytics_core::analysis::{analyze_portfolio, AnalysisRequest, Weighting};
use portfolio_analytics_core::types::ReturnFrequency;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Method {
    Manual,
    EqualWeight,
    MaxSharpe,
}

/// Arguments for a full portfolio analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Analysis request file (JSON or YAML). Takes precedence over the flags below
    #[arg(long)]
    pub input: Option<String>,

    /// Price file: CSV (`date,<TICKER>...`), JSON or YAML
    #[arg(long)]
    pub prices: Option<String>,

    /// How to choose the weights
    #[arg(long, value_enum, default_value = "max-sharpe")]
    pub method: Method,

    /// Comma-separated allocation for --method manual, one value per ticker
    #[arg(long, value_delimiter = ',')]
    pub weights: Option<Vec<Decimal>>,

    /// Price frequency for annualisation: daily, weekly, monthly, quarterly, annual
    #[arg(long, default_value = "daily")]
    pub frequency: String,

    /// Annual risk-free rate for the performance Sharpe ratio
    #[arg(long, default_value = "0")]
    pub risk_free_rate: Decimal,

    /// Maximum solver steps for --method max-sharpe
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Use equal weights when the optimizer does not converge
    #[arg(long)]
    pub fallback: bool,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = build_request(args)?;
    let output = analyze_portfolio(&request)?;
    Ok(serde_json::to_value(output)?)
}

fn build_request(args: AnalyzeArgs) -> Result<AnalysisRequest, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_document(path);
    }
    if args.prices.is_none() {
        // A whole request may be piped in instead of a price file.
        return input::stdin::read_piped()?.ok_or_else(|| {
            "Provide --input <request>, --prices <file> or pipe a request via stdin".into()
        });
    }

    let prices = input::prices::load_prices(args.prices.as_deref())?;
    let weighting = match args.method {
        Method::Manual => Weighting::Manual {
            weights: args
                .weights
                .ok_or("--method manual requires --weights")?,
        },
        Method::EqualWeight => Weighting::EqualWeight,
        Method::MaxSharpe => Weighting::MaxSharpe,
    };
    let frequency: ReturnFrequency = args.frequency.parse()?;
    let optimizer = args.max_iterations.map(|max_iterations| MaxSharpeSettings {
        max_iterations,
        ..MaxSharpeSettings::default()
    });

    Ok(AnalysisRequest {
        prices,
        weighting,
        frequency,
        risk_free_rate: args.risk_free_rate,
        optimizer,
        fallback_to_equal_weight: args.fallback,
    })
}
