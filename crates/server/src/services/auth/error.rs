//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated by an admin.
    #[error("account disabled")]
    AccountDisabled,

    /// The username is not on the registration allow-list.
    #[error("username not pre-registered")]
    NotPreRegistered,

    /// The allow-list entry was already consumed.
    #[error("username already registered")]
    AlreadyRegistered,

    /// Username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] armory_core::UsernameError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
