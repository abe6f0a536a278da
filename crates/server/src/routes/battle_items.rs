//! Battle item route handlers.
//!
//! Item types arrive as strings and are validated against the closed set
//! here, so an unknown type is a 400 with a useful message rather than a
//! generic body-rejection. Expiry dates are RFC 3339 instants; a create
//! request may omit the expiry, in which case the configured default TTL
//! applies.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use armory_core::{BattleItemId, ItemType, ListenerId};

use crate::db::{BattleItemRepository, OwnershipGuard};
use crate::error::AppError;
use crate::middleware::auth::RequireAuth;
use crate::models::BattleItem;
use crate::state::AppState;

/// Upper bound on a single bulk-create line, to keep one form submission from
/// fanning out into an unbounded insert.
const MAX_BULK_QUANTITY: i64 = 1000;

/// Build the battle item router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/bulk", post(create_bulk))
        .route(
            "/{id}",
            axum::routing::get(show).put(update).delete(delete),
        )
}

/// Request for creating a single item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub listener_id: Option<ListenerId>,
    pub item_type: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Request for creating many items sharing one expiry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateRequest {
    pub listener_id: Option<ListenerId>,
    pub items: Option<Vec<BulkLine>>,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// One `{itemType, quantity}` line of a bulk create.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkLine {
    pub item_type: Option<String>,
    pub quantity: Option<i64>,
}

/// Request for editing an item. Both fields are required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub item_type: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// A bulk line whose quantity is unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("quantity for {item_type} must be between 0 and {MAX_BULK_QUANTITY} (got {quantity})")]
pub struct BulkQuantityError {
    pub item_type: ItemType,
    pub quantity: i64,
}

/// Fan a list of `(item_type, quantity)` pairs out into one entry per item.
///
/// Quantity N produces N entries; zero-quantity lines are silently skipped,
/// modeling a multi-select form where some counters were left at zero.
///
/// # Errors
///
/// Returns [`BulkQuantityError`] for a negative or absurdly large quantity.
pub fn expand_quantities(lines: &[(ItemType, i64)]) -> Result<Vec<ItemType>, BulkQuantityError> {
    let mut expanded = Vec::new();

    for &(item_type, quantity) in lines {
        if !(0..=MAX_BULK_QUANTITY).contains(&quantity) {
            return Err(BulkQuantityError {
                item_type,
                quantity,
            });
        }
        #[allow(clippy::cast_sign_loss)] // range-checked above
        expanded.extend(std::iter::repeat_n(item_type, quantity as usize));
    }

    Ok(expanded)
}

fn parse_item_type(raw: Option<String>) -> Result<ItemType, AppError> {
    let raw = raw.ok_or_else(|| AppError::Validation("itemType is required".to_owned()))?;
    ItemType::parse(&raw).map_err(|_| AppError::Validation("Invalid itemType".to_owned()))
}

fn require_listener_id(id: Option<ListenerId>) -> Result<ListenerId, AppError> {
    id.ok_or_else(|| AppError::Validation("listenerId is required".to_owned()))
}

/// Create one battle item.
///
/// # Errors
///
/// Returns 400 for a missing/invalid item type, 404 when the listener is not
/// reachable through the caller's ownership chain.
pub async fn create(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<BattleItem>), AppError> {
    let listener_id = require_listener_id(body.listener_id)?;
    let item_type = parse_item_type(body.item_type)?;
    let expiry_date = body
        .expiry_date
        .unwrap_or_else(|| Utc::now() + state.config().default_item_ttl());

    OwnershipGuard::new(state.pool())
        .listener(listener_id, current.id)
        .await?;

    let item = BattleItemRepository::new(state.pool())
        .create(listener_id, item_type, expiry_date)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Create many battle items sharing one expiry instant.
///
/// `{items: [{itemType: "GLOVE", quantity: 2}, {itemType: "MIST", quantity: 0}]}`
/// creates exactly two GLOVE records and no MIST record, atomically.
///
/// # Errors
///
/// Returns 400 for an invalid type or quantity, 404 on ownership failure.
pub async fn create_bulk(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<BulkCreateRequest>,
) -> Result<(StatusCode, Json<Vec<BattleItem>>), AppError> {
    let listener_id = require_listener_id(body.listener_id)?;
    let lines = body
        .items
        .filter(|items| !items.is_empty())
        .ok_or_else(|| AppError::Validation("items must be a non-empty array".to_owned()))?;
    let expiry_date = body
        .expiry_date
        .unwrap_or_else(|| Utc::now() + state.config().default_item_ttl());

    let mut parsed = Vec::with_capacity(lines.len());
    for line in lines {
        let item_type = parse_item_type(line.item_type)?;
        let quantity = line
            .quantity
            .ok_or_else(|| AppError::Validation("quantity is required".to_owned()))?;
        parsed.push((item_type, quantity));
    }

    let expanded =
        expand_quantities(&parsed).map_err(|e| AppError::Validation(e.to_string()))?;

    OwnershipGuard::new(state.pool())
        .listener(listener_id, current.id)
        .await?;

    let items = BattleItemRepository::new(state.pool())
        .create_many(listener_id, &expanded, expiry_date)
        .await?;

    Ok((StatusCode::CREATED, Json(items)))
}

/// Fetch one item through the ownership guard.
///
/// # Errors
///
/// Returns 404 when absent or reachable only through another user's listener.
pub async fn show(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<BattleItemId>,
) -> Result<Json<BattleItem>, AppError> {
    let item = OwnershipGuard::new(state.pool())
        .battle_item(id, current.id)
        .await?;

    Ok(Json(item))
}

/// Edit an item's type and expiry.
///
/// # Errors
///
/// Returns 400 for missing fields, 404 when the guard rejects the target.
pub async fn update(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<BattleItemId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<BattleItem>, AppError> {
    let item_type = parse_item_type(body.item_type)?;
    let expiry_date = body
        .expiry_date
        .ok_or_else(|| AppError::Validation("expiryDate is required".to_owned()))?;

    OwnershipGuard::new(state.pool())
        .battle_item(id, current.id)
        .await?;

    let item = BattleItemRepository::new(state.pool())
        .update(id, item_type, expiry_date)
        .await?;

    Ok(Json(item))
}

/// Delete an item.
///
/// # Errors
///
/// Returns 404 when the guard rejects the target.
pub async fn delete(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<BattleItemId>,
) -> Result<StatusCode, AppError> {
    OwnershipGuard::new(state.pool())
        .battle_item(id, current.id)
        .await?;

    BattleItemRepository::new(state.pool()).delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_fans_out_quantities() {
        let expanded =
            expand_quantities(&[(ItemType::Glove, 2), (ItemType::Mist, 0)]).unwrap();
        assert_eq!(expanded, vec![ItemType::Glove, ItemType::Glove]);
    }

    #[test]
    fn test_expand_all_zero_is_empty_not_error() {
        let expanded = expand_quantities(&[(ItemType::Mist, 0), (ItemType::Time, 0)]).unwrap();
        assert!(expanded.is_empty());
    }

    #[test]
    fn test_expand_preserves_line_order() {
        let expanded = expand_quantities(&[
            (ItemType::StunHammer, 1),
            (ItemType::Glove, 2),
            (ItemType::ThirdBooster, 1),
        ])
        .unwrap();
        assert_eq!(
            expanded,
            vec![
                ItemType::StunHammer,
                ItemType::Glove,
                ItemType::Glove,
                ItemType::ThirdBooster,
            ]
        );
    }

    #[test]
    fn test_expand_rejects_negative_quantity() {
        let err = expand_quantities(&[(ItemType::Glove, -1)]).unwrap_err();
        assert_eq!(err.item_type, ItemType::Glove);
        assert_eq!(err.quantity, -1);
    }

    #[test]
    fn test_expand_rejects_oversized_quantity() {
        assert!(expand_quantities(&[(ItemType::Glove, MAX_BULK_QUANTITY + 1)]).is_err());
        assert!(expand_quantities(&[(ItemType::Glove, MAX_BULK_QUANTITY)]).is_ok());
    }
}
