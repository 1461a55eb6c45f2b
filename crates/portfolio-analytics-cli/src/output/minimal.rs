use serde_json::Value;

/// Key output fields, most important first.
const PRIORITY_KEYS: [&str; 5] = [
    "sharpe_ratio",
    "weights",
    "total_return",
    "portfolio_return",
    "cagr",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority, first in the
/// result object and then in its `summary`, and falls back to the first field.
pub fn print_minimal(value: &Value) {
    // Try to extract the "result" envelope
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        let summary = map.get("summary").and_then(Value::as_object);
        for key in &PRIORITY_KEYS {
            let found = map
                .get(*key)
                .or_else(|| summary.and_then(|s| s.get(*key)));
            if let Some(val) = found {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    // Row output (e.g. return series): the latest row is the answer
    if let Value::Array(rows) = result_obj {
        if let Some(last) = rows.last() {
            println!("{}", format_minimal(last));
        }
        return;
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(format_minimal)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
