use std::sync::Arc;
use chrono::Local;
use futures::FutureExt;
use log::{info, warn, error};

use crate::actuator::Actuator;
use crate::data::{parse_base64_csv, Market, TickerRecord, TickerStore};
use crate::error::Result;
use crate::scheduler::{RequestScheduler, ScheduledJob};

/// Owns one market's ticker list: its files, its timers and the actuator that
/// runs when they fire.
pub struct Monitor {
    market: Market,
    store: TickerStore,
    scheduler: RequestScheduler,
    actuator: Arc<Actuator>,
    hour: u32,
    minute: u32,
}

impl Monitor {
    pub fn new(market: Market, store: TickerStore, actuator: Arc<Actuator>, hour: u32, minute: u32) -> Self {
        Self {
            market,
            store,
            scheduler: RequestScheduler::new(market.name()),
            actuator,
            hour,
            minute,
        }
    }

    pub fn market(&self) -> Market {
        self.market
    }

    pub fn scheduler(&self) -> &RequestScheduler {
        &self.scheduler
    }

    /// Replaces the monitored list with `raw` (base64 CSV) and re-arms the
    /// schedule. An upload that fails to parse leaves the previous list, files
    /// and timers untouched.
    pub fn monitor(&self, raw: &str) -> Result<usize> {
        let raw = raw.trim();
        let records = parse_base64_csv(raw)?;

        self.store.save_raw(raw)?;
        if let Err(e) = self.store.save_records(&records) {
            warn!("[{}] Could not write ticker dump: {}", self.market, e);
        }

        self.scheduler.clear_all_schedules();

        if records.is_empty() {
            info!("[{}] Ticker list is empty, nothing scheduled", self.market);
            return Ok(0);
        }

        let count = records.len();
        let id = self.scheduler.add_schedule_at_time(self.hour, self.minute, self.job(records));
        info!("[{}] Monitoring {} tickers (timer {})", self.market, count, id);
        Ok(count)
    }

    /// Re-arms the schedule from the persisted upload, if any.
    pub fn restore(&self) {
        let raw = match self.store.load_raw() {
            Ok(raw) => raw,
            Err(e) => {
                error!("[{}] Failed to load persisted tickers: {}", self.market, e);
                return;
            }
        };

        if raw.trim().is_empty() {
            info!("[{}] No persisted tickers, continuing without initial schedule", self.market);
            return;
        }

        match self.monitor(&raw) {
            Ok(count) => info!("✅ [{}] Restored and scheduled {} tickers on startup", self.market, count),
            Err(e) => error!("[{}] Persisted tickers could not be parsed: {}", self.market, e),
        }
    }

    pub fn records(&self) -> Result<Vec<TickerRecord>> {
        self.store.load_records()
    }

    fn job(&self, records: Vec<TickerRecord>) -> ScheduledJob {
        let records = Arc::new(records);
        let actuator = self.actuator.clone();

        Arc::new(move || {
            let records = records.clone();
            let actuator = actuator.clone();
            async move {
                actuator
                    .run_calendar_checks(Local::now().date_naive(), &records)
                    .await;
            }
            .boxed()
        })
    }
}
