//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use armory_core::{UserId, Username};

use super::RepositoryError;
use crate::models::User;

/// Internal row type carrying the password hash alongside the account.
#[derive(Debug, sqlx::FromRow)]
struct UserAuthRow {
    id: UserId,
    username: Username,
    password_hash: String,
    is_active: bool,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserAuthRow> for (User, String) {
    fn from(row: UserAuthRow) -> Self {
        (
            User {
                id: row.id,
                username: row.username,
                is_active: row.is_active,
                is_admin: row.is_admin,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            row.password_hash,
        )
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new active, non-admin user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO app_user (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, is_active, is_admin, created_at, updated_at
            ",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already exists".to_owned());
            }
            RepositoryError::Database(e)
        })
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, username, is_active, is_admin, created_at, updated_at
            FROM app_user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user plus their password hash by username, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_auth_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            r"
            SELECT id, username, password_hash, is_active, is_admin,
                   created_at, updated_at
            FROM app_user
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List every account, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r"
            SELECT id, username, is_active, is_admin, created_at, updated_at
            FROM app_user
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Flip a user's active flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn toggle_active(&self, id: UserId) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE app_user
            SET is_active = NOT is_active, updated_at = now()
            WHERE id = $1
            RETURNING id, username, is_active, is_admin, created_at, updated_at
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Flip a user's admin flag.
    ///
    /// The self-demotion guard lives in the admin routes; this operation
    /// toggles unconditionally.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn toggle_admin(&self, id: UserId) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE app_user
            SET is_admin = NOT is_admin, updated_at = now()
            WHERE id = $1
            RETURNING id, username, is_active, is_admin, created_at, updated_at
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
