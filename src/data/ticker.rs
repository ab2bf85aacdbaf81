use std::collections::BTreeMap;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use log::warn;

use crate::error::Result;

/// One monitored stock, as uploaded by the operator.
///
/// Only `ticker` and `comment` carry meaning; any other CSV column is kept
/// in `extra` and written back out flat when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub comment: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl TickerRecord {
    pub fn new(ticker: &str, comment: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            comment: comment.to_string(),
            extra: BTreeMap::new(),
        }
    }

    fn from_row(mut row: BTreeMap<String, String>) -> Option<Self> {
        let ticker = row.remove("ticker").unwrap_or_default().trim().to_string();
        let comment = row.remove("comment").unwrap_or_default();

        if ticker.is_empty() {
            warn!("Dropping record without a ticker (comment: '{}')", comment);
            return None;
        }

        Some(Self { ticker, comment, extra: row })
    }
}

/// Parses CSV text with a header row into typed rows.
///
/// Headers are trimmed and lower-cased before deserialization, empty lines are
/// skipped and all values stay strings. Rows that fail to deserialize are
/// logged and dropped.
pub fn parse_csv<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let normalized: csv::StringRecord = headers
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
        .collect();
    reader.set_headers(normalized.clone());

    let mut rows = Vec::new();
    let mut errors = 0usize;

    for (line_num, result) in reader.records().enumerate() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        match record.deserialize::<T>(Some(&normalized)) {
            Ok(row) => rows.push(row),
            Err(e) => {
                errors += 1;
                warn!("Skipping CSV row {}: {}", line_num + 2, e);
            }
        }
    }

    if errors > 0 {
        warn!("Parsed {} CSV rows with {} errors", rows.len(), errors);
    }

    Ok(rows)
}

/// Decodes a base64 payload into the UTF-8 CSV text it carries.
pub fn decode_base64(input: &str) -> Result<String> {
    // Form decoding turns an unescaped '+' into a space
    let cleaned: String = input
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('+'),
            c if c.is_whitespace() => None,
            c => Some(c),
        })
        .collect();

    let bytes = STANDARD.decode(cleaned.as_bytes())?;
    Ok(String::from_utf8(bytes)?)
}

/// Parses an uploaded base64-encoded CSV into ticker records.
pub fn parse_base64_csv(input: &str) -> Result<Vec<TickerRecord>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let text = decode_base64(input)?;
    // Rows go through a string map so numeric-looking values stay strings
    let rows: Vec<BTreeMap<String, String>> = parse_csv(&text)?;

    Ok(rows.into_iter().filter_map(TickerRecord::from_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> String {
        STANDARD.encode(text.as_bytes())
    }

    #[test]
    fn test_parse_base64_csv_basic() {
        let input = encode("ticker,comment\nAAPL,Apple\nMSFT,Microsoft\n");
        let records = parse_base64_csv(&input).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], TickerRecord::new("AAPL", "Apple"));
        assert_eq!(records[1], TickerRecord::new("MSFT", "Microsoft"));
    }

    #[test]
    fn test_headers_are_normalized_and_extra_columns_kept() {
        let input = encode(" Ticker , COMMENT ,Sector\nCDR,CD Projekt,Gaming\n\n");
        let records = parse_base64_csv(&input).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ticker, "CDR");
        assert_eq!(records[0].comment, "CD Projekt");
        assert_eq!(records[0].extra.get("sector").map(String::as_str), Some("Gaming"));
    }

    #[test]
    fn test_missing_comment_defaults_to_empty() {
        let input = encode("ticker\nIBM\n");
        let records = parse_base64_csv(&input).unwrap();
        assert_eq!(records, vec![TickerRecord::new("IBM", "")]);
    }

    #[test]
    fn test_rows_without_ticker_are_dropped() {
        let input = encode("ticker,comment\n,orphan\nKO,Coca-Cola\n");
        let records = parse_base64_csv(&input).unwrap();
        assert_eq!(records, vec![TickerRecord::new("KO", "Coca-Cola")]);
    }

    #[test]
    fn test_numeric_looking_values_stay_strings() {
        let input = encode("ticker,comment,target\n1234,Numeric ticker,12.50\n");
        let records = parse_base64_csv(&input).unwrap();
        assert_eq!(records[0].ticker, "1234");
        assert_eq!(records[0].extra.get("target").map(String::as_str), Some("12.50"));
    }

    #[test]
    fn test_utf8_content_survives() {
        let input = encode("ticker,comment\nPKN,Orlen – paliwa żółte\n");
        let records = parse_base64_csv(&input).unwrap();
        assert_eq!(records[0].comment, "Orlen – paliwa żółte");
    }

    #[test]
    fn test_form_mangled_plus_is_restored() {
        // ">>>" at a 3-byte boundary encodes to "Pj4+"
        let csv = "ticker,comment\nXY,>>>\n";
        let encoded = encode(csv);
        assert!(encoded.contains('+'));

        let mangled = encoded.replace('+', " ");
        let records = parse_base64_csv(&mangled).unwrap();
        assert_eq!(records[0].comment, ">>>");
    }

    #[test]
    fn test_empty_input_yields_no_records() {
        assert!(parse_base64_csv("").unwrap().is_empty());
        assert!(parse_base64_csv("   \n").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        assert!(parse_base64_csv("not*base64!").is_err());
    }

    #[test]
    fn test_serialization_flattens_extra_columns() {
        let mut record = TickerRecord::new("AAPL", "Apple");
        record.extra.insert("sector".to_string(), "Tech".to_string());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["ticker"], "AAPL");
        assert_eq!(json["comment"], "Apple");
        assert_eq!(json["sector"], "Tech");
    }
}
