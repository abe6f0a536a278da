//! The two lifecycle sweep operations.
//!
//! Each sweep is one predicate-based batch statement. There is no per-row
//! loop and no checkpoint state: the predicates are expressed in absolute
//! time, so a crashed or failed run is fully covered by the next one.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use armory_core::types::lifecycle;

use crate::db::BattleItemRepository;

/// Mark every item whose expiry has passed.
///
/// Selects `is_expired = false AND expiry_date < now` and flips the flag in
/// one batch update. Idempotent: a second run with no newly-expired items
/// affects zero rows and touches nothing already flagged.
///
/// # Errors
///
/// Returns `sqlx::Error` if the batch statement fails.
pub async fn run_expiry_sweep(pool: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    BattleItemRepository::new(pool).mark_expired_batch(now).await
}

/// Delete flagged items whose grace period has elapsed.
///
/// Selects `is_expired = true AND expiry_date < now - grace`. The threshold
/// is computed from `expiry_date` alone, so this sweep never depends on when
/// the expiry sweep ran.
///
/// # Errors
///
/// Returns `sqlx::Error` if the batch statement fails.
pub async fn run_purge_sweep(
    pool: &PgPool,
    now: DateTime<Utc>,
    grace: Duration,
) -> Result<u64, sqlx::Error> {
    let cutoff = lifecycle::purge_cutoff(now, grace);
    BattleItemRepository::new(pool).purge_batch(cutoff).await
}
