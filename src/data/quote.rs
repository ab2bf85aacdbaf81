use std::fmt;
use serde::{Deserialize, Serialize};

use crate::data::ticker::parse_csv;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Quarterly => "QUARTERLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    /// Interval letter used by Stooq's `i=` parameter.
    pub fn stooq_interval(&self) -> &'static str {
        match self {
            Frequency::Daily => "d",
            Frequency::Weekly => "w",
            Frequency::Monthly => "m",
            Frequency::Quarterly => "q",
            Frequency::Yearly => "y",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One OHLCV row as returned by a quote API. Values are kept as the raw strings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct QuoteSample {
    pub timestamp: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    #[serde(default)]
    pub volume: String,
}

impl QuoteSample {
    pub fn close_price(&self) -> Option<f64> {
        self.close.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

// Stooq serves Polish column names
#[derive(Debug, Deserialize)]
struct StooqRow {
    data: String,
    otwarcie: String,
    najwyzszy: String,
    najnizszy: String,
    zamkniecie: String,
    #[serde(default)]
    wolumen: String,
}

impl From<StooqRow> for QuoteSample {
    fn from(row: StooqRow) -> Self {
        Self {
            timestamp: row.data,
            open: row.otwarcie,
            high: row.najwyzszy,
            low: row.najnizszy,
            close: row.zamkniecie,
            volume: row.wolumen,
        }
    }
}

/// Parses Alpha Vantage CSV, which is already ordered newest first.
pub fn parse_alpha_vantage_csv(text: &str) -> Result<Vec<QuoteSample>> {
    parse_csv(text)
}

/// Parses Stooq CSV (oldest first) into samples ordered newest first.
pub fn parse_stooq_csv(text: &str) -> Result<Vec<QuoteSample>> {
    let rows: Vec<StooqRow> = parse_csv(text)?;
    Ok(rows.into_iter().rev().map(QuoteSample::from).collect())
}
