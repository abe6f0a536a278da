//! The ownership guard.
//!
//! Every single-entity read and every mutation goes through this guard before
//! touching the store. Given a principal and a target, the guard returns the
//! record if and only if it is reachable from that principal through the
//! ownership chain (`listener.user_id` for listeners, item → listener → user
//! for battle items).
//!
//! A failed check is reported as [`GuardError::NotFoundOrForbidden`], which is
//! indistinguishable from the record not existing. This is what keeps one
//! tenant from probing for another tenant's IDs.
//!
//! Bulk/list queries do not use the guard; they filter by `user_id` inside
//! the query predicate instead.

use sqlx::PgPool;
use thiserror::Error;

use armory_core::{BattleItemId, ListenerId, UserId};

use crate::models::{BattleItem, Listener};

/// Outcome of a failed ownership check.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The target does not exist, or belongs to someone else. Callers must
    /// not be able to tell which.
    #[error("not found or access denied")]
    NotFoundOrForbidden,

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Resolves whether a principal may act on a listener or battle item.
pub struct OwnershipGuard<'a> {
    pool: &'a PgPool,
}

impl<'a> OwnershipGuard<'a> {
    /// Create a new ownership guard.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a listener iff it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `GuardError::NotFoundOrForbidden` if the listener is absent or
    /// owned by another user, `GuardError::Database` on query failure.
    pub async fn listener(
        &self,
        listener_id: ListenerId,
        user_id: UserId,
    ) -> Result<Listener, GuardError> {
        sqlx::query_as::<_, Listener>(
            r"
            SELECT id, name, user_id, created_at, updated_at
            FROM listener
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(listener_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(GuardError::NotFoundOrForbidden)
    }

    /// Fetch a battle item iff its listener belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `GuardError::NotFoundOrForbidden` if the item is absent or
    /// reachable only through another user's listener, `GuardError::Database`
    /// on query failure.
    pub async fn battle_item(
        &self,
        item_id: BattleItemId,
        user_id: UserId,
    ) -> Result<BattleItem, GuardError> {
        sqlx::query_as::<_, BattleItem>(
            r"
            SELECT bi.id, bi.listener_id, bi.item_type, bi.expiry_date,
                   bi.is_expired, bi.created_at, bi.updated_at
            FROM battle_item bi
            JOIN listener l ON l.id = bi.listener_id
            WHERE bi.id = $1 AND l.user_id = $2
            ",
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(GuardError::NotFoundOrForbidden)
    }
}
