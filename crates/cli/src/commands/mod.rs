//! CLI command implementations.

pub mod migrate;
pub mod sweep;
pub mod users;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] armory_core::UsernameError),

    #[error("No such user: {0}")]
    NoSuchUser(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] armory_server::db::RepositoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] armory_server::config::ConfigError),
}

/// Connect to the database named by `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))?;

    Ok(armory_server::db::create_pool(&database_url).await?)
}
