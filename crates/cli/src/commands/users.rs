//! User management commands.

use armory_core::Username;
use armory_server::db::{PreRegistrationRepository, UserRepository};

use super::CommandError;

/// Reserve a username on the registration allow-list.
///
/// # Errors
///
/// Returns `CommandError` if the username is malformed or already reserved.
pub async fn pre_register(username: &str) -> Result<(), CommandError> {
    let username = Username::parse(username)?;
    let pool = super::connect().await?;

    let entry = PreRegistrationRepository::new(&pool)
        .create(&username)
        .await?;

    tracing::info!(id = %entry.id, username = %entry.username, "username reserved");
    Ok(())
}

/// Grant or revoke the admin capability.
///
/// The first admin of a fresh deployment is promoted here; after that,
/// admins can manage each other through the API (though never themselves).
///
/// # Errors
///
/// Returns `CommandError::NoSuchUser` if the account doesn't exist.
pub async fn set_admin(username: &str, admin: bool) -> Result<(), CommandError> {
    let username = Username::parse(username)?;
    let pool = super::connect().await?;

    let users = UserRepository::new(&pool);
    let (user, _) = users
        .get_auth_by_username(&username)
        .await?
        .ok_or_else(|| CommandError::NoSuchUser(username.to_string()))?;

    if user.is_admin == admin {
        tracing::info!(username = %user.username, is_admin = admin, "no change needed");
        return Ok(());
    }

    let user = users.toggle_admin(user.id).await?;
    tracing::info!(username = %user.username, is_admin = user.is_admin, "admin flag updated");
    Ok(())
}
