//! Database operations.
//!
//! # Tables
//!
//! - `app_user` - Accounts (username + argon2 hash, active/admin flags)
//! - `pre_registered_user` - Registration allow-list
//! - `listener` - Named entities owned by one user each
//! - `battle_item` - The perishable items the lifecycle engine manages
//! - `session` - Session storage (created by the session store itself)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p armory-cli -- migrate
//! ```
//!
//! Queries use sqlx's runtime API with `FromRow` models so the workspace
//! builds without a live database.

pub mod battle_items;
pub mod listeners;
pub mod ownership;
pub mod pre_registrations;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use battle_items::BattleItemRepository;
pub use listeners::ListenerRepository;
pub use ownership::OwnershipGuard;
pub use pre_registrations::PreRegistrationRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
