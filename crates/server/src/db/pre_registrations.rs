//! Registration allow-list repository.
//!
//! Admins reserve usernames here before the owner can register. Completing
//! registration consumes the entry and links the created account.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use armory_core::{PreRegistrationId, UserId, Username};

use super::RepositoryError;
use crate::models::user::{LinkedUser, PreRegistration};

/// Internal row type for allow-list queries with the linked account joined in.
#[derive(Debug, sqlx::FromRow)]
struct PreRegistrationRow {
    id: PreRegistrationId,
    username: Username,
    is_registered: bool,
    registered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    linked_user_id: Option<UserId>,
    linked_is_active: Option<bool>,
    linked_created_at: Option<DateTime<Utc>>,
}

impl From<PreRegistrationRow> for PreRegistration {
    fn from(row: PreRegistrationRow) -> Self {
        let user = match (row.linked_user_id, row.linked_is_active, row.linked_created_at) {
            (Some(id), Some(is_active), Some(created_at)) => Some(LinkedUser {
                id,
                is_active,
                created_at,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            username: row.username,
            is_registered: row.is_registered,
            registered_at: row.registered_at,
            user,
            created_at: row.created_at,
        }
    }
}

/// Repository for the registration allow-list.
pub struct PreRegistrationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PreRegistrationRepository<'a> {
    /// Create a new allow-list repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reserve a username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is already reserved.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, username: &Username) -> Result<PreRegistration, RepositoryError> {
        let row = sqlx::query_as::<_, PreRegistrationRow>(
            r"
            INSERT INTO pre_registered_user (username)
            VALUES ($1)
            RETURNING id, username, is_registered, registered_at, created_at,
                      NULL::integer AS linked_user_id,
                      NULL::boolean AS linked_is_active,
                      NULL::timestamptz AS linked_created_at
            ",
        )
        .bind(username)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already reserved".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// List the whole allow-list, newest first, with linked accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<PreRegistration>, RepositoryError> {
        let rows = sqlx::query_as::<_, PreRegistrationRow>(
            r"
            SELECT p.id, p.username, p.is_registered, p.registered_at, p.created_at,
                   u.id AS linked_user_id,
                   u.is_active AS linked_is_active,
                   u.created_at AS linked_created_at
            FROM pre_registered_user p
            LEFT JOIN app_user u ON u.id = p.user_id
            ORDER BY p.created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Look up an allow-list entry by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<PreRegistration>, RepositoryError> {
        let row = sqlx::query_as::<_, PreRegistrationRow>(
            r"
            SELECT p.id, p.username, p.is_registered, p.registered_at, p.created_at,
                   u.id AS linked_user_id,
                   u.is_active AS linked_is_active,
                   u.created_at AS linked_created_at
            FROM pre_registered_user p
            LEFT JOIN app_user u ON u.id = p.user_id
            WHERE p.username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Mark an entry consumed and link the account created from it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no entry exists for the username.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn mark_registered(
        &self,
        username: &Username,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE pre_registered_user
            SET is_registered = TRUE, registered_at = now(), user_id = $2
            WHERE username = $1
            ",
        )
        .bind(username)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete an allow-list entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: PreRegistrationId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM pre_registered_user
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
