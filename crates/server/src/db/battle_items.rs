//! Battle item repository: CRUD, the two lifecycle sweeps, and the
//! principal-scoped aggregates behind the dashboard.
//!
//! Both sweeps are single predicate-based batch statements expressed in
//! absolute time (`< now`, `< cutoff`), never "rows touched since last run".
//! A failed sweep changes nothing the next run cannot pick up again.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use armory_core::{BattleItemId, ItemType, ListenerId, UserId};

use super::RepositoryError;
use crate::models::BattleItem;

/// Repository for battle item database operations.
pub struct BattleItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BattleItemRepository<'a> {
    /// Create a new battle item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Create a single item under an already-guarded listener.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        listener_id: ListenerId,
        item_type: ItemType,
        expiry_date: DateTime<Utc>,
    ) -> Result<BattleItem, RepositoryError> {
        let item = sqlx::query_as::<_, BattleItem>(
            r"
            INSERT INTO battle_item (listener_id, item_type, expiry_date)
            VALUES ($1, $2, $3)
            RETURNING id, listener_id, item_type, expiry_date, is_expired,
                      created_at, updated_at
            ",
        )
        .bind(listener_id)
        .bind(item_type)
        .bind(expiry_date)
        .fetch_one(self.pool)
        .await?;

        Ok(item)
    }

    /// Create many items sharing one expiry instant, all-or-nothing.
    ///
    /// The caller has already fanned a `{item_type, quantity}` form out into
    /// one entry per item; this inserts them inside a single transaction so a
    /// bulk create never partially applies.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails (the
    /// transaction rolls back).
    pub async fn create_many(
        &self,
        listener_id: ListenerId,
        item_types: &[ItemType],
        expiry_date: DateTime<Utc>,
    ) -> Result<Vec<BattleItem>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(item_types.len());

        for item_type in item_types {
            let item = sqlx::query_as::<_, BattleItem>(
                r"
                INSERT INTO battle_item (listener_id, item_type, expiry_date)
                VALUES ($1, $2, $3)
                RETURNING id, listener_id, item_type, expiry_date, is_expired,
                          created_at, updated_at
                ",
            )
            .bind(listener_id)
            .bind(item_type)
            .bind(expiry_date)
            .fetch_one(&mut *tx)
            .await?;
            created.push(item);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// List every item of a listener, soonest expiry first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_listener(
        &self,
        listener_id: ListenerId,
    ) -> Result<Vec<BattleItem>, RepositoryError> {
        let items = sqlx::query_as::<_, BattleItem>(
            r"
            SELECT id, listener_id, item_type, expiry_date, is_expired,
                   created_at, updated_at
            FROM battle_item
            WHERE listener_id = $1
            ORDER BY expiry_date ASC, id ASC
            ",
        )
        .bind(listener_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// List a listener's unexpired items (`expiry_date >= now`), soonest
    /// expiry first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active_for_listener(
        &self,
        listener_id: ListenerId,
        now: DateTime<Utc>,
    ) -> Result<Vec<BattleItem>, RepositoryError> {
        let items = sqlx::query_as::<_, BattleItem>(
            r"
            SELECT id, listener_id, item_type, expiry_date, is_expired,
                   created_at, updated_at
            FROM battle_item
            WHERE listener_id = $1 AND expiry_date >= $2
            ORDER BY expiry_date ASC, id ASC
            ",
        )
        .bind(listener_id)
        .bind(now)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Update an item's type and expiry (the only editable fields).
    ///
    /// The cached `is_expired` flag is recomputed from the new expiry in the
    /// same statement, so an edit can never leave the flag permanently wrong
    /// in a direction the one-way expiry sweep would not fix.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: BattleItemId,
        item_type: ItemType,
        expiry_date: DateTime<Utc>,
    ) -> Result<BattleItem, RepositoryError> {
        sqlx::query_as::<_, BattleItem>(
            r"
            UPDATE battle_item
            SET item_type = $2,
                expiry_date = $3,
                is_expired = ($3 < now()),
                updated_at = now()
            WHERE id = $1
            RETURNING id, listener_id, item_type, expiry_date, is_expired,
                      created_at, updated_at
            ",
        )
        .bind(id)
        .bind(item_type)
        .bind(expiry_date)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: BattleItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM battle_item
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    // =========================================================================
    // Lifecycle sweeps
    // =========================================================================

    /// Expiry sweep: flag every unflagged item whose expiry has passed.
    ///
    /// One batch statement. Rows already flagged are not touched, which keeps
    /// the sweep idempotent and leaves their `updated_at` alone. Returns the
    /// number of rows flipped.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the statement fails; the next scheduled run
    /// retries the same absolute predicate.
    pub async fn mark_expired_batch(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE battle_item
            SET is_expired = TRUE, updated_at = $1
            WHERE is_expired = FALSE AND expiry_date < $1
            ",
        )
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Purge sweep: hard-delete flagged items that expired before `cutoff`.
    ///
    /// `cutoff` is `now - grace`, measured from `expiry_date` so the sweep
    /// never depends on when the expiry sweep happened to run. Returns the
    /// number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the statement fails.
    pub async fn purge_batch(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r"
            DELETE FROM battle_item
            WHERE is_expired = TRUE AND expiry_date < $1
            ",
        )
        .bind(cutoff)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Principal-scoped aggregates
    // =========================================================================
    //
    // These compare expiry_date live rather than trusting the cached flag, so
    // a request one second before the expiry sweep and one second after both
    // reflect true elapsed time.

    /// Count a user's unexpired items across all their listeners.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_active_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM battle_item bi
            JOIN listener l ON l.id = bi.listener_id
            WHERE l.user_id = $1 AND bi.expiry_date >= $2
            ",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Count a user's items expiring inside `[now, window_end]`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_expiring_within(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM battle_item bi
            JOIN listener l ON l.id = bi.listener_id
            WHERE l.user_id = $1 AND bi.expiry_date >= $2 AND bi.expiry_date <= $3
            ",
        )
        .bind(user_id)
        .bind(now)
        .bind(window_end)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Per-type counts of a user's unexpired items.
    ///
    /// Only types with at least one item come back from the query; the stats
    /// route completes the vector over the full type set so clients never see
    /// a missing category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_active_by_type(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<(ItemType, i64)>, RepositoryError> {
        let counts = sqlx::query_as::<_, (ItemType, i64)>(
            r"
            SELECT bi.item_type, COUNT(*)
            FROM battle_item bi
            JOIN listener l ON l.id = bi.listener_id
            WHERE l.user_id = $1 AND bi.expiry_date >= $2
            GROUP BY bi.item_type
            ",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(self.pool)
        .await?;

        Ok(counts)
    }
}
