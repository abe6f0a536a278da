//! Pure time logic for the battle item lifecycle.
//!
//! Every item moves through `active → expiring-soon → expired → purged` as a
//! function of its `expiry_date` and the current instant alone. The background
//! sweeps and the stats queries both derive their predicates from the
//! functions here, so the SQL and the in-process logic cannot drift apart.
//!
//! The persisted `is_expired` flag is a cached projection of
//! [`is_expired`](fn@is_expired) with at most one sweep interval of staleness;
//! wherever precision matters (the 24-hour expiring-soon window, active
//! counts) callers compare `expiry_date` directly instead of trusting the
//! flag.

use chrono::{DateTime, Duration, Utc};

/// Width of the "expiring soon" window used by the dashboard stats.
#[must_use]
pub fn soon_window() -> Duration {
    Duration::hours(24)
}

/// End of the expiring-soon window starting at `now`.
#[must_use]
pub fn soon_window_end(now: DateTime<Utc>) -> DateTime<Utc> {
    now + soon_window()
}

/// Whether an item with this `expiry_date` has expired as of `now`.
///
/// Expiry is exclusive: an item whose expiry instant equals `now` is still
/// active.
#[must_use]
pub fn is_expired(expiry_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expiry_date < now
}

/// The purge threshold: items that expired before this instant are eligible
/// for hard deletion.
///
/// The cutoff is measured from `expiry_date`, never from the moment the
/// expiry sweep flipped the cached flag, so the two sweeps cannot race on
/// ordering.
#[must_use]
pub fn purge_cutoff(now: DateTime<Utc>, grace: Duration) -> DateTime<Utc> {
    now - grace
}

/// Where an item currently sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleStage {
    /// Not yet expired, more than the soon-window away from expiry.
    Active,
    /// Not yet expired, but will be within the soon-window.
    ExpiringSoon,
    /// Expired, still within the grace period and visible to the owner.
    Expired,
    /// Expired and past the grace period; the purge sweep will delete it.
    PurgeDue,
}

impl LifecycleStage {
    /// Classify an item by its expiry instant.
    #[must_use]
    pub fn classify(expiry_date: DateTime<Utc>, now: DateTime<Utc>, grace: Duration) -> Self {
        if is_expired(expiry_date, now) {
            if expiry_date < purge_cutoff(now, grace) {
                Self::PurgeDue
            } else {
                Self::Expired
            }
        } else if expiry_date <= soon_window_end(now) {
            Self::ExpiringSoon
        } else {
            Self::Active
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_expiry_is_exclusive_at_now() {
        let now = at(2025, 6, 1, 12);
        assert!(!is_expired(now, now));
        assert!(is_expired(now - Duration::seconds(1), now));
        assert!(!is_expired(now + Duration::seconds(1), now));
    }

    #[test]
    fn test_classify_active_beyond_soon_window() {
        let now = at(2025, 6, 1, 12);
        let expiry = now + Duration::hours(25);
        assert_eq!(
            LifecycleStage::classify(expiry, now, Duration::days(3)),
            LifecycleStage::Active
        );
    }

    #[test]
    fn test_classify_expiring_soon_within_24h() {
        let now = at(2025, 6, 1, 12);
        let grace = Duration::days(3);
        assert_eq!(
            LifecycleStage::classify(now + Duration::hours(1), now, grace),
            LifecycleStage::ExpiringSoon
        );
        // The window is inclusive at both ends.
        assert_eq!(
            LifecycleStage::classify(soon_window_end(now), now, grace),
            LifecycleStage::ExpiringSoon
        );
        assert_eq!(
            LifecycleStage::classify(now, now, grace),
            LifecycleStage::ExpiringSoon
        );
    }

    #[test]
    fn test_classify_expired_within_grace() {
        let now = at(2025, 6, 4, 12);
        let expiry = now - Duration::days(1);
        assert_eq!(
            LifecycleStage::classify(expiry, now, Duration::days(3)),
            LifecycleStage::Expired
        );
    }

    #[test]
    fn test_classify_purge_due_past_grace() {
        let now = at(2025, 6, 10, 12);
        let expiry = now - Duration::days(4);
        assert_eq!(
            LifecycleStage::classify(expiry, now, Duration::days(3)),
            LifecycleStage::PurgeDue
        );
    }

    #[test]
    fn test_grace_boundary_survives() {
        // Exactly at the cutoff the strict `<` keeps the item.
        let now = at(2025, 6, 10, 12);
        let grace = Duration::days(3);
        let expiry = purge_cutoff(now, grace);
        assert_eq!(
            LifecycleStage::classify(expiry, now, grace),
            LifecycleStage::Expired
        );
    }

    #[test]
    fn test_item_expired_yesterday_walkthrough() {
        // Created with expiry = now - 1 day: expired but within grace.
        let created_now = at(2025, 6, 1, 12);
        let expiry = created_now - Duration::days(1);
        let grace = Duration::days(3);

        assert_eq!(
            LifecycleStage::classify(expiry, created_now, grace),
            LifecycleStage::Expired
        );

        // Four days later the grace period has elapsed.
        let later = created_now + Duration::days(4);
        assert_eq!(
            LifecycleStage::classify(expiry, later, grace),
            LifecycleStage::PurgeDue
        );
    }
}
