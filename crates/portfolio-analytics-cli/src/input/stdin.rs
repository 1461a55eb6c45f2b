use serde::de::DeserializeOwned;
use std::io::{self, Read};

use crate::input::file::DocumentFormat;

/// Deserialize a request or price document piped on stdin.
///
/// `None` when stdin is an interactive terminal or nothing was piped, so the
/// caller can report which flag is missing.
pub fn read_piped<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// JSON when the text opens an object or array, YAML otherwise.
fn parse_piped<T: DeserializeOwned>(text: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let format = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        DocumentFormat::Json
    } else {
        DocumentFormat::Yaml
    };
    let value = match format {
        DocumentFormat::Json => serde_json::from_str(trimmed)
            .map_err(|e| format!("Failed to parse JSON from stdin: {}", e))?,
        DocumentFormat::Yaml => serde_yaml::from_str(trimmed)
            .map_err(|e| format!("Failed to parse YAML from stdin: {}", e))?,
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_analytics_core::series::PriceSeries;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_input_is_none() {
        let parsed: Option<PriceSeries> = parse_piped("  \n").unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn test_json_and_yaml_documents() {
        let json = r#"{"assets": ["LT"], "observations": [{"date": "2024-01-02", "closes": ["10"]}]}"#;
        let yaml = "assets: [LT]\nobservations:\n  - date: 2024-01-02\n    closes: [\"10\"]\n";
        let from_json: PriceSeries = parse_piped(json).unwrap().unwrap();
        let from_yaml: PriceSeries = parse_piped(yaml).unwrap().unwrap();
        assert_eq!(from_json, from_yaml);
        assert_eq!(from_json.assets, vec!["LT".to_string()]);
    }

    #[test]
    fn test_malformed_json_reports_source() {
        let err = parse_piped::<PriceSeries>("{\"assets\": ").unwrap_err();
        assert!(err.to_string().contains("stdin"));
    }
}
