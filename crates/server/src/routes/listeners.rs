//! Listener route handlers.
//!
//! Every single-entity operation runs the ownership guard first; the listing
//! endpoint filters by the principal inside the query.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;

use armory_core::ListenerId;

use crate::db::{BattleItemRepository, ListenerRepository, OwnershipGuard};
use crate::error::AppError;
use crate::middleware::auth::RequireAuth;
use crate::models::{BattleItem, Listener, ListenerSummary};
use crate::state::AppState;

/// Build the listener router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/items", get(items))
}

/// Request for creating or renaming a listener.
#[derive(Debug, Deserialize)]
pub struct ListenerNameRequest {
    pub name: Option<String>,
}

/// Query string for the item listing.
#[derive(Debug, Default, Deserialize)]
pub struct ItemsQuery {
    /// When true, only unexpired items are returned.
    #[serde(default)]
    pub active: bool,
}

fn require_name(name: Option<String>) -> Result<String, AppError> {
    name.map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("Listener name is required".to_owned()))
}

/// List the principal's listeners, newest first, with live active counts.
///
/// # Errors
///
/// Returns `AppError::Database` on query failure.
pub async fn list(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ListenerSummary>>, AppError> {
    let summaries = ListenerRepository::new(state.pool())
        .list_with_active_counts(current.id, Utc::now())
        .await?;

    Ok(Json(summaries))
}

/// Create a listener owned by the principal.
///
/// # Errors
///
/// Returns `AppError::Validation` when the name is missing.
pub async fn create(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ListenerNameRequest>,
) -> Result<(StatusCode, Json<Listener>), AppError> {
    let name = require_name(body.name)?;

    let listener = ListenerRepository::new(state.pool())
        .create(current.id, &name)
        .await?;

    Ok((StatusCode::CREATED, Json(listener)))
}

/// Fetch one listener through the ownership guard.
///
/// # Errors
///
/// Returns `AppError::NotFound` when absent or owned by someone else.
pub async fn show(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ListenerId>,
) -> Result<Json<Listener>, AppError> {
    let listener = OwnershipGuard::new(state.pool())
        .listener(id, current.id)
        .await?;

    Ok(Json(listener))
}

/// Rename a listener. Ownership never changes.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the guard rejects the target.
pub async fn update(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ListenerId>,
    Json(body): Json<ListenerNameRequest>,
) -> Result<Json<Listener>, AppError> {
    let name = require_name(body.name)?;

    OwnershipGuard::new(state.pool())
        .listener(id, current.id)
        .await?;

    let listener = ListenerRepository::new(state.pool())
        .update_name(id, &name)
        .await?;

    Ok(Json(listener))
}

/// Delete a listener and (via cascade) all its items.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the guard rejects the target.
pub async fn delete(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ListenerId>,
) -> Result<StatusCode, AppError> {
    OwnershipGuard::new(state.pool())
        .listener(id, current.id)
        .await?;

    ListenerRepository::new(state.pool()).delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List a listener's items, soonest expiry first.
///
/// `?active=true` restricts to `expiry_date >= now`.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the guard rejects the target.
pub async fn items(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ListenerId>,
    Query(query): Query<ItemsQuery>,
) -> Result<Json<Vec<BattleItem>>, AppError> {
    OwnershipGuard::new(state.pool())
        .listener(id, current.id)
        .await?;

    let repo = BattleItemRepository::new(state.pool());
    let items = if query.active {
        repo.list_active_for_listener(id, Utc::now()).await?
    } else {
        repo.list_for_listener(id).await?
    };

    Ok(Json(items))
}
