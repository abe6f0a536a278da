//! Listener repository for database operations.
//!
//! All single-entity access from handlers goes through the ownership guard
//! first; the queries here either take an already-guarded ID or filter by
//! `user_id` in the predicate.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use armory_core::{ListenerId, UserId};

use super::RepositoryError;
use crate::models::{Listener, ListenerSummary};

/// Repository for listener database operations.
pub struct ListenerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ListenerRepository<'a> {
    /// Create a new listener repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a listener for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, user_id: UserId, name: &str) -> Result<Listener, RepositoryError> {
        let listener = sqlx::query_as::<_, Listener>(
            r"
            INSERT INTO listener (name, user_id)
            VALUES ($1, $2)
            RETURNING id, name, user_id, created_at, updated_at
            ",
        )
        .bind(name)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(listener)
    }

    /// List a user's listeners, newest first, each with its live count of
    /// unexpired items (`expiry_date >= now`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_active_counts(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<ListenerSummary>, RepositoryError> {
        let summaries = sqlx::query_as::<_, ListenerSummary>(
            r"
            SELECT l.id, l.name, l.user_id, l.created_at, l.updated_at,
                   COUNT(bi.id) FILTER (WHERE bi.expiry_date >= $2) AS active_item_count
            FROM listener l
            LEFT JOIN battle_item bi ON bi.listener_id = l.id
            WHERE l.user_id = $1
            GROUP BY l.id
            ORDER BY l.created_at DESC
            ",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(self.pool)
        .await?;

        Ok(summaries)
    }

    /// Count a user's listeners.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_user(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM listener
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Rename a listener. The name is the only editable field; ownership
    /// never moves.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listener doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_name(
        &self,
        id: ListenerId,
        name: &str,
    ) -> Result<Listener, RepositoryError> {
        sqlx::query_as::<_, Listener>(
            r"
            UPDATE listener
            SET name = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, name, user_id, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a listener. The schema cascades to its battle items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listener doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ListenerId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM listener
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
}
