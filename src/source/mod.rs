pub mod alpha_vantage;
pub mod stooq;

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::data::{Frequency, QuoteSample};
use crate::error::{MonitorError, Result};

pub use alpha_vantage::AlphaVantageSource;
pub use stooq::StooqSource;

/// A third-party API that returns recent quotes for a ticker, newest first.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn id(&self) -> &'static str;

    async fn fetch(&self, frequency: Frequency, ticker: &str) -> Result<Vec<QuoteSample>>;
}

pub fn build_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// GETs `url` and returns the body, mapping rate limiting and non-2xx statuses
/// to provider errors.
pub(crate) async fn get_text(client: &Client, provider: &str, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(MonitorError::Provider {
            provider: provider.to_string(),
            message: "rate limited".to_string(),
        });
    }

    if !status.is_success() {
        return Err(MonitorError::Provider {
            provider: provider.to_string(),
            message: format!("HTTP {}", status),
        });
    }

    Ok(response.text().await?)
}
