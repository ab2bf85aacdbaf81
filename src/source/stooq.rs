//! Stooq.pl historical CSV downloads, used for Warsaw-listed tickers.

use async_trait::async_trait;
use chrono::{Datelike, Days, Local, Months, NaiveDate, Weekday};
use log::debug;
use reqwest::Client;

use crate::config::STOOQ_SESSIONS;
use crate::data::{Frequency, QuoteSample, parse_stooq_csv};
use crate::error::{MonitorError, Result};
use crate::source::{get_text, QuoteSource};

const PROVIDER_ID: &str = "STOOQ";
const BASE_URL: &str = "https://stooq.pl/q/d/l/";

pub struct StooqSource {
    client: Client,
    base_url: String,
    sessions: u32,
}

impl StooqSource {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            sessions: STOOQ_SESSIONS,
        }
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First day of the window that covers the last `sessions` periods before `end`.
pub fn window_start(end: NaiveDate, frequency: Frequency, sessions: u32) -> NaiveDate {
    match frequency {
        Frequency::Daily => {
            let mut date = end;
            let mut remaining = sessions;
            while remaining > 0 {
                date = date.pred_opt().unwrap_or(date);
                if !is_weekend(date) {
                    remaining -= 1;
                }
            }
            date
        }
        Frequency::Weekly => end - Days::new(7 * sessions as u64),
        Frequency::Monthly => end.checked_sub_months(Months::new(sessions)).unwrap_or(end),
        Frequency::Quarterly => end.checked_sub_months(Months::new(3 * sessions)).unwrap_or(end),
        Frequency::Yearly => end.checked_sub_months(Months::new(12 * sessions)).unwrap_or(end),
    }
}

pub fn stooq_url(base_url: &str, ticker: &str, frequency: Frequency, sessions: u32, today: NaiveDate) -> String {
    let start = window_start(today, frequency, sessions);
    format!(
        "{}?f={}&t={}&s={}&i={}",
        base_url,
        start.format("%Y%m%d"),
        today.format("%Y%m%d"),
        urlencoding::encode(&ticker.to_lowercase()),
        frequency.stooq_interval()
    )
}

#[async_trait]
impl QuoteSource for StooqSource {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch(&self, frequency: Frequency, ticker: &str) -> Result<Vec<QuoteSample>> {
        let url = stooq_url(&self.base_url, ticker, frequency, self.sessions, Local::now().date_naive());
        debug!("Stooq request: {}", url);

        let body = get_text(&self.client, PROVIDER_ID, &url).await?;
        // Unknown tickers come back as a plain "Brak danych" line
        if !body.contains(',') {
            return Err(MonitorError::Provider {
                provider: PROVIDER_ID.to_string(),
                message: body.trim().to_string(),
            });
        }
        parse_stooq_csv(&body)
    }
}
