//! Sweep scheduling tests.
//!
//! The scheduler's dueness logic takes explicit instants, so these tests
//! time-travel without sleeping.

use armory_server::scheduler::SweepSchedule;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn june(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, hour, min, 0)
        .single()
        .expect("valid date")
}

#[test]
fn daily_sweep_fires_once_after_its_hour() {
    let schedule: SweepSchedule = "daily@02:00".parse().expect("valid schedule");

    // Not due before 02:00.
    assert!(!schedule.is_due(None, june(1, 1, 59)));

    // Due at and after 02:00.
    assert!(schedule.is_due(None, june(1, 2, 0)));
    assert!(schedule.is_due(None, june(1, 22, 0)));

    // After running, quiet for the rest of the day.
    let ran = june(1, 2, 0);
    assert!(!schedule.is_due(Some(ran), june(1, 2, 1)));
    assert!(!schedule.is_due(Some(ran), june(1, 23, 59)));

    // Due again the next day.
    assert!(schedule.is_due(Some(ran), june(2, 2, 0)));
}

#[test]
fn daily_sweep_catches_up_after_downtime() {
    // Last ran three days ago; the process was down over the scheduled hour.
    // The first tick past today's instant runs it.
    let schedule: SweepSchedule = "daily@02:00".parse().expect("valid schedule");
    assert!(schedule.is_due(Some(june(1, 2, 0)), june(4, 7, 30)));
}

#[test]
fn interval_sweep_fires_immediately_then_spaces_out() {
    let schedule: SweepSchedule = "every@600s".parse().expect("valid schedule");

    assert!(schedule.is_due(None, june(1, 12, 0)));
    assert!(!schedule.is_due(Some(june(1, 12, 0)), june(1, 12, 9)));
    assert!(schedule.is_due(Some(june(1, 12, 0)), june(1, 12, 10)));
}

#[test]
fn expiry_and_purge_defaults_never_coincide() {
    // The shipped defaults stagger the sweeps an hour apart so the expiry
    // batch commits before purging is considered.
    let expiry: SweepSchedule = "daily@02:00".parse().expect("valid schedule");
    let purge: SweepSchedule = "daily@03:00".parse().expect("valid schedule");

    // Simulate the minute tick across the whole night, tracking run times.
    let mut expiry_runs: Vec<DateTime<Utc>> = Vec::new();
    let mut purge_runs: Vec<DateTime<Utc>> = Vec::new();

    let mut tick = june(1, 0, 0);
    let end = june(1, 6, 0);
    while tick < end {
        if expiry.is_due(expiry_runs.last().copied(), tick) {
            expiry_runs.push(tick);
        }
        if purge.is_due(purge_runs.last().copied(), tick) {
            purge_runs.push(tick);
        }
        tick += Duration::minutes(1);
    }

    assert_eq!(expiry_runs, vec![june(1, 2, 0)]);
    assert_eq!(purge_runs, vec![june(1, 3, 0)]);
}

#[test]
fn schedule_strings_round_trip_through_config_format() {
    for (input, display) in [
        ("daily@02:00", "daily at 02:00 UTC"),
        ("daily@23:59", "daily at 23:59 UTC"),
        ("every@3600s", "every 3600s"),
    ] {
        let schedule: SweepSchedule = input.parse().expect("valid schedule");
        assert_eq!(schedule.to_string(), display);
    }
}

#[test]
fn malformed_schedule_strings_are_rejected() {
    for input in ["", "daily", "daily@", "daily@25:00", "every@-5", "cron@* * *"] {
        assert!(
            input.parse::<SweepSchedule>().is_err(),
            "accepted {input:?}"
        );
    }
}
