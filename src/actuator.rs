use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use chrono::{Datelike, NaiveDate, Weekday};
use log::{info, warn, error};

use crate::analysis::percent_change;
use crate::config::{DAILY_CUTOFF, MONTHLY_CUTOFF, WEEKLY_CUTOFF};
use crate::data::{dump_quotes, Frequency, Market, TickerRecord};
use crate::error::{MonitorError, Result};
use crate::mail::Mailer;
use crate::report::{self, ReportEntry};
use crate::source::QuoteSource;

/// One price-change check: which interval to fetch and the cutoff to report at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Check {
    pub frequency: Frequency,
    pub cutoff: f64,
}

pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.day() == 1)
}

pub fn is_reminder_day(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sat
}

/// Checks due on `date`: daily on weekdays, weekly on Saturday and monthly on
/// the last day of the month.
pub fn calendar_checks(date: NaiveDate) -> Vec<Check> {
    let mut checks = Vec::new();

    match date.weekday() {
        Weekday::Sat => checks.push(Check { frequency: Frequency::Weekly, cutoff: WEEKLY_CUTOFF }),
        Weekday::Sun => {}
        _ => checks.push(Check { frequency: Frequency::Daily, cutoff: DAILY_CUTOFF }),
    }

    if is_last_day_of_month(date) {
        checks.push(Check { frequency: Frequency::Monthly, cutoff: MONTHLY_CUTOFF });
    }

    checks
}

/// Fetches quotes, reports movers and sends reminders for one market.
pub struct Actuator {
    market: Market,
    source: Arc<dyn QuoteSource>,
    mailer: Arc<dyn Mailer>,
    token: String,
    request_delay: Duration,
    quote_dump_dir: Option<PathBuf>,
}

impl Actuator {
    pub fn new(
        market: Market,
        source: Arc<dyn QuoteSource>,
        mailer: Arc<dyn Mailer>,
        token: String,
        request_delay: Duration,
    ) -> Self {
        Self {
            market,
            source,
            mailer,
            token,
            request_delay,
            quote_dump_dir: None,
        }
    }

    pub fn with_quote_dump_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.quote_dump_dir = dir;
        self
    }

    /// Runs every check due on `date`, then the Saturday reminder. Failures are
    /// logged and never stop the remaining checks.
    pub async fn run_calendar_checks(&self, date: NaiveDate, records: &[TickerRecord]) {
        let checks = calendar_checks(date);
        info!(
            "[{}] Running {} checks for {} ({} tickers)",
            self.market, checks.len(), date, records.len()
        );

        for check in checks {
            if let Err(e) = self.report_changes(check.frequency, check.cutoff, records).await {
                error!("[{}] {} report failed: {}", self.market, check.frequency, e);
            }
        }

        if is_reminder_day(date) {
            if let Err(e) = self.send_reminder(records).await {
                error!("[{}] Reminder failed: {}", self.market, e);
            }
        }
    }

    /// Fetches each ticker in turn, pausing between requests to stay under the
    /// API quota, and mails the movers whose change exceeds `cutoff`.
    pub async fn report_changes(
        &self,
        frequency: Frequency,
        cutoff: f64,
        records: &[TickerRecord],
    ) -> Result<()> {
        let mut entries = Vec::with_capacity(records.len());

        for (i, record) in records.iter().enumerate() {
            match self.fetch_change(frequency, &record.ticker).await {
                Ok(change) => entries.push(ReportEntry {
                    change,
                    cutoff,
                    record: record.clone(),
                }),
                Err(e) => warn!("[{}] Skipping {}: {}", self.market, record.ticker, e),
            }

            if i + 1 < records.len() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        let text = report::change_report(&entries);
        if text.is_empty() {
            info!(
                "[{}] {} check: no change above {}% across {} tickers",
                self.market, frequency, cutoff, entries.len()
            );
            return Ok(());
        }

        self.mailer
            .send(&report::change_subject(frequency), &report::mail_body(&text, &self.token))
            .await
    }

    pub async fn send_reminder(&self, records: &[TickerRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let text = report::all_stocks_report(records);
        self.mailer
            .send(report::REMINDER_SUBJECT, &report::mail_body(&text, &self.token))
            .await
    }

    async fn fetch_change(&self, frequency: Frequency, ticker: &str) -> Result<f64> {
        let samples = self.source.fetch(frequency, ticker).await?;

        if let Some(dir) = &self.quote_dump_dir {
            if let Err(e) = dump_quotes(dir, ticker, frequency, &samples) {
                warn!("[{}] Could not dump quotes for {}: {}", self.market, ticker, e);
            }
        }

        percent_change(&samples).ok_or_else(|| MonitorError::InsufficientData {
            ticker: ticker.to_string(),
        })
    }
}
