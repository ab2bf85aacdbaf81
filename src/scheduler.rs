//! Wall-clock timers that fire a job once at the next `HH:MM` and then every
//! 24 hours.
//!
//! Every timer is a spawned task tracked in a registry and cancelled with
//! `abort()`. The registry is replaced wholesale: `clear_all_schedules` aborts
//! everything and bumps a generation counter, so a one-shot timer that is
//! already firing cannot register its recurring timer into a newer schedule.
//!
//! Timer tasks only wait. Each firing runs its job on a task of its own, so
//! clearing the schedule stops future firings but lets a running job finish.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use futures::future::BoxFuture;
use log::{info, debug};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::config::RECURRING_PERIOD_SECS;

pub type ScheduledJob = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(Uuid);

impl TimerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct TimerEntry {
    id: TimerId,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Registry {
    generation: u64,
    time_outs: Vec<TimerEntry>,
    schedules: Vec<TimerEntry>,
}

/// Delay from `now` until the next `hour:minute:00`; tomorrow if that time
/// today is not strictly in the future.
pub fn calculate_initial_delay(now: NaiveDateTime, hour: u32, minute: u32) -> Duration {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let mut target = now.date().and_time(time);

    if target <= now {
        target = target
            .checked_add_days(Days::new(1))
            .unwrap_or(target);
    }

    (target - now).to_std().unwrap_or(Duration::ZERO)
}

pub fn format_delay(delay: Duration) -> String {
    let secs = delay.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[derive(Clone)]
pub struct RequestScheduler {
    name: String,
    period: Duration,
    registry: Arc<Mutex<Registry>>,
}

impl RequestScheduler {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_period(name, Duration::from_secs(RECURRING_PERIOD_SECS))
    }

    pub fn with_period(name: impl Into<String>, period: Duration) -> Self {
        Self {
            name: name.into(),
            period,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    pub fn clear_all_schedules(&self) {
        let mut registry = self.registry.lock().unwrap();
        registry.generation += 1;

        let time_outs = std::mem::take(&mut registry.time_outs);
        let schedules = std::mem::take(&mut registry.schedules);
        drop(registry);

        let cleared = time_outs.len() + schedules.len();
        for entry in time_outs.into_iter().chain(schedules) {
            debug!("[{}] Cancelling timer {}", self.name, entry.id);
            entry.handle.abort();
        }

        if cleared > 0 {
            info!("[{}] Cleared {} timers", self.name, cleared);
        }
    }

    /// Arms a one-shot timer for the next `hour:minute` local time. When it
    /// fires it starts the recurring timer and then runs `job` once.
    pub fn add_schedule_at_time(&self, hour: u32, minute: u32, job: ScheduledJob) -> TimerId {
        let delay = calculate_initial_delay(Local::now().naive_local(), hour, minute);
        info!(
            "[{}] Initial execution scheduled at {:02}:{:02}, in {} ({} seconds)",
            self.name, hour, minute, format_delay(delay), delay.as_secs()
        );
        self.add_schedule_after(delay, job)
    }

    /// Arms a one-shot timer that fires after `delay`.
    pub fn add_schedule_after(&self, delay: Duration, job: ScheduledJob) -> TimerId {
        let id = TimerId::new();
        let mut registry = self.registry.lock().unwrap();
        let generation = registry.generation;

        let scheduler = self.clone();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            debug!("[{}] One-shot timer {} fired", scheduler.name, id);

            if scheduler.register_recurring(generation, job.clone()).is_none() {
                return;
            }
            tokio::spawn(job());
        });

        registry.time_outs.push(TimerEntry { id, handle });
        id
    }

    /// Arms the recurring timer, first tick one period from now, unless the
    /// schedule was cleared since `generation` was read.
    fn register_recurring(&self, generation: u64, job: ScheduledJob) -> Option<TimerId> {
        let mut registry = self.registry.lock().unwrap();
        if registry.generation != generation {
            debug!("[{}] Schedule was replaced, not arming recurring timer", self.name);
            return None;
        }

        let id = TimerId::new();
        let period = self.period;
        let name = self.name.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                debug!("[{}] Recurring timer {} fired", name, id);
                tokio::spawn(job());
            }
        });

        registry.schedules.push(TimerEntry { id, handle });
        info!("[{}] Recurring timer armed, every {}", self.name, format_delay(period));
        Some(id)
    }

    /// Number of (one-shot, recurring) timers that are still pending or running.
    pub fn active_timers(&self) -> (usize, usize) {
        let registry = self.registry.lock().unwrap();
        let live = |entries: &Vec<TimerEntry>| {
            entries.iter().filter(|e| !e.handle.is_finished()).count()
        };
        (live(&registry.time_outs), live(&registry.schedules))
    }
}
