//! Database migration command.
//!
//! Migration files live in `crates/server/migrations/`. They are embedded at
//! compile time, so the CLI binary carries them wherever it goes.

use super::CommandError;

/// Run server database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
