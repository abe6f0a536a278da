//! Admin route handlers.
//!
//! Everything here requires the admin capability on the principal; none of it
//! goes through the ownership guard because these are not tenant-scoped
//! resources.
//!
//! The toggle endpoints refuse to operate on the caller's own account. An
//! admin who could demote or deactivate themselves can lock the whole
//! deployment out of the admin surface.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::Deserialize;

use armory_core::{PreRegistrationId, UserId, Username};

use crate::db::{PreRegistrationRepository, UserRepository};
use crate::error::AppError;
use crate::middleware::auth::RequireAdmin;
use crate::models::{CurrentUser, PreRegistration, User};
use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pre-register", post(pre_register))
        .route("/pre-registered-users", get(list_pre_registered))
        .route("/pre-registered-users/{id}", axum::routing::delete(delete_pre_registered))
        .route("/users", get(list_users))
        .route("/users/{id}/toggle-active", patch(toggle_active))
        .route("/users/{id}/toggle-admin", patch(toggle_admin))
}

/// Request carrying the username to reserve.
#[derive(Debug, Deserialize)]
pub struct PreRegisterRequest {
    pub username: Option<String>,
}

/// Reject operations an admin attempts against their own account.
fn ensure_not_self(target: UserId, current: &CurrentUser, what: &str) -> Result<(), AppError> {
    if target == current.id {
        return Err(AppError::Forbidden(format!(
            "Cannot change your own {what}"
        )));
    }
    Ok(())
}

/// Reserve a username on the registration allow-list.
///
/// # Errors
///
/// Returns 400 for a malformed username, 409 when already reserved.
pub async fn pre_register(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<PreRegisterRequest>,
) -> Result<(StatusCode, Json<PreRegistration>), AppError> {
    let raw = body
        .username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Validation("Username is required".to_owned()))?;
    let username =
        Username::parse(&raw).map_err(|e| AppError::Validation(e.to_string()))?;

    let entry = PreRegistrationRepository::new(state.pool())
        .create(&username)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// List the allow-list with linked accounts, newest first.
///
/// # Errors
///
/// Returns `AppError::Database` on query failure.
pub async fn list_pre_registered(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<PreRegistration>>, AppError> {
    let entries = PreRegistrationRepository::new(state.pool())
        .list_all()
        .await?;

    Ok(Json(entries))
}

/// Delete an allow-list entry.
///
/// # Errors
///
/// Returns 404 when the entry doesn't exist.
pub async fn delete_pre_registered(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PreRegistrationId>,
) -> Result<StatusCode, AppError> {
    PreRegistrationRepository::new(state.pool())
        .delete(id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List every account.
///
/// # Errors
///
/// Returns `AppError::Database` on query failure.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = UserRepository::new(state.pool()).list_all().await?;

    Ok(Json(users))
}

/// Flip another account's active flag.
///
/// # Errors
///
/// Returns 403 when targeting the caller's own account, 404 for an unknown
/// user.
pub async fn toggle_active(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    ensure_not_self(id, &admin, "active status")?;

    let user = UserRepository::new(state.pool()).toggle_active(id).await?;
    tracing::info!(admin_id = %admin.id, user_id = %user.id, is_active = user.is_active, "active flag toggled");

    Ok(Json(user))
}

/// Flip another account's admin flag.
///
/// # Errors
///
/// Returns 403 when targeting the caller's own account, 404 for an unknown
/// user.
pub async fn toggle_admin(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    ensure_not_self(id, &admin, "admin status")?;

    let user = UserRepository::new(state.pool()).toggle_admin(id).await?;
    tracing::info!(admin_id = %admin.id, user_id = %user.id, is_admin = user.is_admin, "admin flag toggled");

    Ok(Json(user))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn admin(id: i32) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            username: Username::parse("the_admin").unwrap(),
            is_admin: true,
        }
    }

    #[test]
    fn test_self_toggle_is_forbidden() {
        let current = admin(1);
        let err = ensure_not_self(UserId::new(1), &current, "admin status").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_toggling_another_user_is_allowed() {
        let current = admin(1);
        assert!(ensure_not_self(UserId::new(2), &current, "admin status").is_ok());
    }
}
