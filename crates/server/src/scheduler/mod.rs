//! The lifecycle scheduler.
//!
//! Two independently-scheduled periodic sweeps advance battle items through
//! their state machine:
//!
//! ```text
//! ACTIVE (is_expired = false, expiry_date >= now)
//!   └─ expiry sweep ─▶ EXPIRED (is_expired = true)
//!                        └─ purge sweep ─▶ PURGED (row deleted)
//! ```
//!
//! Request handlers never compute lifecycle transitions; they read the cached
//! `is_expired` flag (or compare `expiry_date` where precision matters) and
//! rely on the sweeps to keep the flag honest.
//!
//! The scheduler runs in-process as a single tokio task ticking once a
//! minute. Each tick checks both sweeps for dueness against an injected
//! [`Clock`], so tests can drive time explicitly instead of sleeping. A sweep
//! that fails logs the error and is retried at its next scheduled run; the
//! task itself never dies with it.

pub mod sweeps;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::SchedulerConfig;

/// Interval between scheduler ticks (seconds).
const TICK_INTERVAL_SECS: u64 = 60;

/// A source of the current instant.
///
/// Production uses [`SystemClock`]; tests substitute fixed instants to
/// time-travel deterministically.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Error parsing a [`SweepSchedule`] from its configuration string.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("invalid sweep schedule '{0}': expected 'daily@HH:MM' or 'every@SECSs'")]
pub struct ScheduleParseError(String);

/// When a sweep should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepSchedule {
    /// Run once daily at a given hour and minute (UTC).
    Daily {
        /// Hour of day (0-23, UTC).
        hour: u8,
        /// Minute of hour (0-59).
        min: u8,
    },
    /// Run every N seconds.
    Every {
        /// Interval in seconds between runs.
        secs: u64,
    },
}

impl SweepSchedule {
    /// Returns `true` if a run is due at `now`, given when the sweep last ran.
    ///
    /// `Daily` is due once the day's scheduled instant has passed and the
    /// last run predates it; `Every` is due once the interval has elapsed.
    /// A sweep that has never run is due as soon as its instant arrives
    /// (immediately, for `Every`).
    #[must_use]
    pub fn is_due(&self, last_run: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match *self {
            Self::Daily { hour, min } => {
                let Some(scheduled) = now
                    .date_naive()
                    .and_hms_opt(u32::from(hour), u32::from(min), 0)
                    .map(|naive| Utc.from_utc_datetime(&naive))
                else {
                    return false;
                };

                now >= scheduled && last_run.is_none_or(|last| last < scheduled)
            }
            Self::Every { secs } => last_run.is_none_or(|last| {
                let elapsed = now.signed_duration_since(last);
                elapsed.num_seconds() >= 0 && elapsed.num_seconds().unsigned_abs() >= secs
            }),
        }
    }
}

impl fmt::Display for SweepSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily { hour, min } => write!(f, "daily at {hour:02}:{min:02} UTC"),
            Self::Every { secs } => write!(f, "every {secs}s"),
        }
    }
}

impl FromStr for SweepSchedule {
    type Err = ScheduleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ScheduleParseError(s.to_owned());

        let (kind, value) = s.split_once('@').ok_or_else(err)?;
        match kind {
            "daily" => {
                let (hour, min) = value.split_once(':').ok_or_else(err)?;
                let hour: u8 = hour.parse().map_err(|_| err())?;
                let min: u8 = min.parse().map_err(|_| err())?;
                if hour > 23 || min > 59 {
                    return Err(err());
                }
                Ok(Self::Daily { hour, min })
            }
            "every" => {
                let secs: u64 = value
                    .strip_suffix('s')
                    .unwrap_or(value)
                    .parse()
                    .map_err(|_| err())?;
                if secs == 0 {
                    return Err(err());
                }
                Ok(Self::Every { secs })
            }
            _ => Err(err()),
        }
    }
}

/// Dueness bookkeeping for one sweep.
#[derive(Debug, Clone)]
struct SweepTask {
    name: &'static str,
    schedule: SweepSchedule,
    last_run: Option<DateTime<Utc>>,
}

impl SweepTask {
    const fn new(name: &'static str, schedule: SweepSchedule) -> Self {
        Self {
            name,
            schedule,
            last_run: None,
        }
    }

    fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.schedule.is_due(self.last_run, now)
    }

    /// Record a run attempt. Recorded even when the sweep failed: the retry
    /// happens at the next scheduled instant, and the predicate it retries is
    /// absolute, so nothing is lost in between.
    fn mark_run(&mut self, now: DateTime<Utc>) {
        self.last_run = Some(now);
    }
}

/// Background scheduler driving the expiry and purge sweeps.
pub struct LifecycleScheduler<C: Clock = SystemClock> {
    pool: PgPool,
    config: SchedulerConfig,
    expiry: SweepTask,
    purge: SweepTask,
    clock: C,
}

impl LifecycleScheduler<SystemClock> {
    /// Create a scheduler on wall-clock time.
    #[must_use]
    pub fn new(pool: PgPool, config: SchedulerConfig) -> Self {
        Self::with_clock(pool, config, SystemClock)
    }
}

impl<C: Clock + 'static> LifecycleScheduler<C> {
    /// Create a scheduler with an explicit clock.
    #[must_use]
    pub fn with_clock(pool: PgPool, config: SchedulerConfig, clock: C) -> Self {
        let expiry = SweepTask::new("expiry", config.expiry_schedule);
        let purge = SweepTask::new("purge", config.purge_schedule);
        Self {
            pool,
            config,
            expiry,
            purge,
            clock,
        }
    }

    /// Spawn the scheduler loop.
    ///
    /// The returned handle is normally just dropped; the loop runs for the
    /// life of the process.
    pub fn spawn(mut self) -> JoinHandle<()> {
        info!(
            expiry = %self.config.expiry_schedule,
            purge = %self.config.purge_schedule,
            grace_days = self.config.purge_grace_days,
            "lifecycle scheduler started"
        );

        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(TICK_INTERVAL_SECS));
            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }

    /// Execute one scheduler tick: run whichever sweeps are due.
    async fn tick(&mut self) {
        let now = self.clock.now();

        if self.expiry.is_due(now) {
            self.expiry.mark_run(now);
            match sweeps::run_expiry_sweep(&self.pool, now).await {
                Ok(flagged) => {
                    info!(sweep = self.expiry.name, rows = flagged, "sweep completed");
                }
                Err(e) => {
                    error!(sweep = self.expiry.name, error = %e, "sweep failed");
                }
            }
        }

        if self.purge.is_due(now) {
            self.purge.mark_run(now);
            match sweeps::run_purge_sweep(&self.pool, now, self.config.purge_grace()).await {
                Ok(deleted) => {
                    info!(sweep = self.purge.name, rows = deleted, "sweep completed");
                }
                Err(e) => {
                    error!(sweep = self.purge.name, error = %e, "sweep failed");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_daily() {
        let schedule: SweepSchedule = "daily@02:00".parse().unwrap();
        assert_eq!(schedule, SweepSchedule::Daily { hour: 2, min: 0 });

        let schedule: SweepSchedule = "daily@23:59".parse().unwrap();
        assert_eq!(schedule, SweepSchedule::Daily { hour: 23, min: 59 });
    }

    #[test]
    fn test_parse_every() {
        let schedule: SweepSchedule = "every@3600s".parse().unwrap();
        assert_eq!(schedule, SweepSchedule::Every { secs: 3600 });

        let schedule: SweepSchedule = "every@90".parse().unwrap();
        assert_eq!(schedule, SweepSchedule::Every { secs: 90 });
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("hourly".parse::<SweepSchedule>().is_err());
        assert!("daily@24:00".parse::<SweepSchedule>().is_err());
        assert!("daily@02:60".parse::<SweepSchedule>().is_err());
        assert!("daily@two".parse::<SweepSchedule>().is_err());
        assert!("every@0".parse::<SweepSchedule>().is_err());
        assert!("".parse::<SweepSchedule>().is_err());
    }

    #[test]
    fn test_daily_not_due_before_scheduled_time() {
        let schedule = SweepSchedule::Daily { hour: 2, min: 0 };
        assert!(!schedule.is_due(None, at(1, 59)));
    }

    #[test]
    fn test_daily_due_after_scheduled_time() {
        let schedule = SweepSchedule::Daily { hour: 2, min: 0 };
        assert!(schedule.is_due(None, at(2, 0)));
        assert!(schedule.is_due(None, at(14, 30)));
    }

    #[test]
    fn test_daily_runs_once_per_day() {
        let schedule = SweepSchedule::Daily { hour: 2, min: 0 };

        // Ran at 02:00; a tick at 02:01 the same day is not due again.
        assert!(!schedule.is_due(Some(at(2, 0)), at(2, 1)));

        // The next day it is due again.
        let next_day = at(2, 0) + Duration::days(1);
        assert!(schedule.is_due(Some(at(2, 0)), next_day));
    }

    #[test]
    fn test_daily_due_when_last_run_predates_today() {
        let schedule = SweepSchedule::Daily { hour: 2, min: 0 };
        let yesterday = at(2, 0) - Duration::days(1);
        assert!(schedule.is_due(Some(yesterday), at(2, 0)));
    }

    #[test]
    fn test_every_due_immediately_then_after_interval() {
        let schedule = SweepSchedule::Every { secs: 600 };
        assert!(schedule.is_due(None, at(12, 0)));
        assert!(!schedule.is_due(Some(at(12, 0)), at(12, 5)));
        assert!(schedule.is_due(Some(at(12, 0)), at(12, 10)));
    }

    #[test]
    fn test_sweep_task_marks_runs() {
        let mut task = SweepTask::new("expiry", SweepSchedule::Daily { hour: 2, min: 0 });

        assert!(task.is_due(at(2, 0)));
        task.mark_run(at(2, 0));
        // Re-running in the same tick window is a no-op at the scheduling
        // level, mirroring the idempotence of the sweep statement itself.
        assert!(!task.is_due(at(2, 1)));
        assert!(task.is_due(at(2, 0) + Duration::days(1)));
    }

    #[test]
    fn test_default_schedules_keep_purge_after_expiry() {
        // The documented defaults: expiry at 02:00, purge at 03:00, so a
        // freshly-flagged batch is committed before purging is considered.
        let expiry: SweepSchedule = "daily@02:00".parse().unwrap();
        let purge: SweepSchedule = "daily@03:00".parse().unwrap();

        assert!(expiry.is_due(None, at(2, 30)));
        assert!(!purge.is_due(None, at(2, 30)));
        assert!(purge.is_due(None, at(3, 0)));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SweepSchedule::Daily { hour: 2, min: 0 }.to_string(),
            "daily at 02:00 UTC"
        );
        assert_eq!(SweepSchedule::Every { secs: 90 }.to_string(), "every 90s");
    }
}
