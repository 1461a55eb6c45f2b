mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::analyze::AnalyzeArgs;
use commands::optimize::OptimizeArgs;
use commands::returns::ReturnsArgs;
use commands::weights::NormalizeArgs;

/// Portfolio returns, performance and max-Sharpe allocation analytics
#[derive(Parser)]
#[command(
    name = "pfa",
    version,
    about = "Portfolio returns, performance and max-Sharpe allocation analytics",
    long_about = "A CLI for analysing a portfolio of assets from daily closing prices \
                  with decimal precision. Computes asset and portfolio returns, \
                  normalizes allocations, finds the long-only max-Sharpe portfolio \
                  and summarises performance (Sharpe, drawdown, CAGR, calendar returns)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver and alignment details to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-asset or weighted portfolio returns from a price file
    Returns(ReturnsArgs),
    /// Rescale raw allocation values so they sum to one
    Normalize(NormalizeArgs),
    /// Long-only weights maximising the annualised Sharpe ratio
    Optimize(OptimizeArgs),
    /// Full portfolio analysis: allocation, performance summary, calendar returns
    Analyze(AnalyzeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Returns(args) => commands::returns::run_returns(args),
        Commands::Normalize(args) => commands::weights::run_normalize(args),
        Commands::Optimize(args) => commands::optimize::run_optimize(args),
        Commands::Analyze(args) => commands::analyze::run_analyze(args),
        Commands::Version => {
            println!("pfa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
