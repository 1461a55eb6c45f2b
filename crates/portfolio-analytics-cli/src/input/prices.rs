use chrono::NaiveDate;
use portfolio_analytics_core::series::{PriceObservation, PriceSeries};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::input;

/// Load closing prices from `--prices`, or from a document piped on stdin.
///
/// `.csv` files use the `date,<TICKER>...` layout; any other extension is a
/// JSON or YAML `PriceSeries` document.
pub fn load_prices(path: Option<&str>) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    match path {
        Some(p) if is_csv(p) => {
            let canonical = input::file::resolve_path(p)?;
            let file = std::fs::File::open(&canonical)
                .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
            let prices = parse_price_csv(file)
                .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
            debug!(
                assets = prices.n_assets(),
                rows = prices.len(),
                "loaded price csv"
            );
            Ok(prices)
        }
        Some(p) => input::file::read_document(p),
        None => input::stdin::read_piped()?
            .ok_or_else(|| "Provide --prices <file> or pipe a price series via stdin".into()),
    }
}

fn is_csv(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Parse a wide price table: a `date` column followed by one close column per
/// ticker. Dates are ISO `YYYY-MM-DD`; an empty cell is a missing close.
pub fn parse_price_csv<R: Read>(reader: R) -> Result<PriceSeries, Box<dyn std::error::Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    match headers.get(0) {
        Some(h) if h.eq_ignore_ascii_case("date") => {}
        _ => return Err("First column must be 'date'".into()),
    }
    let assets: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    if assets.is_empty() {
        return Err("Price file has no ticker columns".into());
    }

    let mut observations = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // Header is line 1
        let line = i + 2;
        let date_cell = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_cell, "%Y-%m-%d")
            .map_err(|e| format!("line {}: invalid date '{}': {}", line, date_cell, e))?;
        let closes = record
            .iter()
            .skip(1)
            .map(|cell| {
                if cell.is_empty() {
                    Ok(None)
                } else {
                    Decimal::from_str(cell)
                        .map(Some)
                        .map_err(|e| format!("line {}: invalid price '{}': {}", line, cell, e))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        observations.push(PriceObservation { date, closes });
    }

    Ok(PriceSeries::new(assets, observations))
}
