pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Split a result object into flattened scalar fields (`summary.sharpe_ratio`)
/// and named row sets (arrays of objects such as `allocation`).
pub(crate) fn split_result(map: &Map<String, Value>) -> (Vec<(String, Value)>, Vec<(String, Vec<Value>)>) {
    let mut fields = Vec::new();
    let mut row_sets = Vec::new();
    flatten_into("", map, &mut fields, &mut row_sets);
    (fields, row_sets)
}

fn flatten_into(
    prefix: &str,
    map: &Map<String, Value>,
    fields: &mut Vec<(String, Value)>,
    row_sets: &mut Vec<(String, Vec<Value>)>,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, fields, row_sets),
            Value::Array(items) if items.first().is_some_and(Value::is_object) => {
                row_sets.push((name, items.clone()));
            }
            _ => fields.push((name, val.clone())),
        }
    }
}

/// Column order for a row set: `date` first when present, then the rest.
pub(crate) fn row_headers(first: &Map<String, Value>) -> Vec<&str> {
    let mut headers: Vec<&str> = first.keys().map(String::as_str).collect();
    if let Some(pos) = headers.iter().position(|h| *h == "date") {
        let date = headers.remove(pos);
        headers.insert(0, date);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_split_result() {
        let result = json!({
            "summary": {"sharpe_ratio": "1.2", "cagr": null},
            "allocation": [{"asset": "LT", "weight": "1"}],
            "optimizer_iterations": 12
        });
        let (fields, row_sets) = split_result(result.as_object().unwrap());
        let names: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["optimizer_iterations", "summary.cagr", "summary.sharpe_ratio"]
        );
        assert_eq!(row_sets.len(), 1);
        assert_eq!(row_sets[0].0, "allocation");
    }
}
