//! Alpha Vantage `TIME_SERIES_*` quotes in CSV form.
//!
//! The free tier allows 5 calls per minute, which is why callers space their
//! requests out.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::data::{Frequency, QuoteSample, parse_alpha_vantage_csv};
use crate::error::{MonitorError, Result};
use crate::source::{get_text, QuoteSource};

const PROVIDER_ID: &str = "ALPHA_VANTAGE";

pub const URL_TEMPLATE: &str = "https://www.alphavantage.co/query?function=TIME_SERIES_{frequency}&symbol={ticker}&apikey={apikey}&outputsize=compact&datatype=csv";

pub struct AlphaVantageSource {
    client: Client,
    api_key: String,
}

impl AlphaVantageSource {
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    pub fn prepare_url(&self, frequency: Frequency, ticker: &str) -> String {
        URL_TEMPLATE
            .replace("{frequency}", frequency.as_str())
            .replace("{ticker}", &urlencoding::encode(ticker))
            .replace("{apikey}", &urlencoding::encode(&self.api_key))
    }
}

/// Alpha Vantage answers quota and lookup errors with a JSON object and HTTP 200.
fn check_body(body: &str) -> Result<()> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        let message = serde_json::from_str::<serde_json::Value>(trimmed)
            .ok()
            .and_then(|v| {
                ["Error Message", "Note", "Information"]
                    .iter()
                    .find_map(|key| v.get(*key).and_then(|m| m.as_str()).map(str::to_string))
            })
            .unwrap_or_else(|| "unexpected JSON response".to_string());

        return Err(MonitorError::Provider {
            provider: PROVIDER_ID.to_string(),
            message,
        });
    }
    Ok(())
}

#[async_trait]
impl QuoteSource for AlphaVantageSource {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch(&self, frequency: Frequency, ticker: &str) -> Result<Vec<QuoteSample>> {
        let url = self.prepare_url(frequency, ticker);
        debug!("Alpha Vantage request: {}", url.replace(&self.api_key, "***"));

        let body = get_text(&self.client, PROVIDER_ID, &url).await?;
        check_body(&body)?;
        parse_alpha_vantage_csv(&body)
    }
}
