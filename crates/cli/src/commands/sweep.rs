//! Manual sweep commands.
//!
//! Runs the same batch statements as the in-process scheduler, immediately.
//! Because the sweep predicates are absolute, running one by hand never
//! conflicts with the scheduled runs.

use chrono::Utc;

use armory_server::config::ServerConfig;
use armory_server::scheduler::sweeps;

use super::CommandError;

/// Run the expiry sweep once.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or the statement fails.
pub async fn expiry() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    let flagged = sweeps::run_expiry_sweep(&pool, Utc::now()).await?;
    tracing::info!(rows = flagged, "expiry sweep complete");
    Ok(())
}

/// Run the purge sweep once, using the configured grace period.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or the statement fails.
pub async fn purge() -> Result<(), CommandError> {
    let config = ServerConfig::from_env()?;
    let pool = super::connect().await?;

    let deleted =
        sweeps::run_purge_sweep(&pool, Utc::now(), config.scheduler.purge_grace()).await?;
    tracing::info!(rows = deleted, "purge sweep complete");
    Ok(())
}
