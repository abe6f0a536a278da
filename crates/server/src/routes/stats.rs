//! Dashboard stats route handlers.
//!
//! All aggregates are computed live from `expiry_date` comparisons at request
//! time, so the numbers reflect true elapsed time regardless of when the
//! expiry sweep last ran. Only `expiry_date` is consulted; the cached
//! `is_expired` flag plays no part here.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;

use armory_core::types::lifecycle;
use armory_core::ItemType;

use crate::db::{BattleItemRepository, ListenerRepository};
use crate::error::AppError;
use crate::middleware::auth::RequireAuth;
use crate::state::AppState;

/// Build the stats router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/items-summary", get(items_summary))
}

/// Headline numbers for the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_listeners: i64,
    pub total_active_items: i64,
    pub expiring_soon_items: i64,
}

/// One entry of the per-type summary.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeCount {
    pub item_type: ItemType,
    pub count: i64,
}

/// Complete a sparse per-type count over the full type set.
///
/// The group-by query only returns types that have items; clients chart the
/// result, so every declared type must appear, zeroes included.
#[must_use]
pub fn complete_summary(counts: &[(ItemType, i64)]) -> Vec<TypeCount> {
    ItemType::ALL
        .iter()
        .map(|&item_type| TypeCount {
            item_type,
            count: counts
                .iter()
                .find(|(ty, _)| *ty == item_type)
                .map_or(0, |&(_, count)| count),
        })
        .collect()
}

/// Listener, active-item and expiring-soon counts for the principal.
///
/// # Errors
///
/// Returns `AppError::Database` on query failure.
pub async fn dashboard(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    let now = Utc::now();

    let listeners = ListenerRepository::new(state.pool());
    let items = BattleItemRepository::new(state.pool());

    let total_listeners = listeners.count_for_user(current.id).await?;
    let total_active_items = items.count_active_for_user(current.id, now).await?;
    let expiring_soon_items = items
        .count_expiring_within(current.id, now, lifecycle::soon_window_end(now))
        .await?;

    Ok(Json(DashboardStats {
        total_listeners,
        total_active_items,
        expiring_soon_items,
    }))
}

/// Per-type active counts for the principal, complete over the type set.
///
/// # Errors
///
/// Returns `AppError::Database` on query failure.
pub async fn items_summary(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<TypeCount>>, AppError> {
    let counts = BattleItemRepository::new(state.pool())
        .count_active_by_type(current.id, Utc::now())
        .await?;

    Ok(Json(complete_summary(&counts)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_includes_every_type() {
        let summary = complete_summary(&[]);
        assert_eq!(summary.len(), ItemType::ALL.len());
        assert!(summary.iter().all(|entry| entry.count == 0));
    }

    #[test]
    fn test_summary_carries_counts_and_zero_fills() {
        let summary = complete_summary(&[(ItemType::Glove, 2), (ItemType::Time, 5)]);

        assert_eq!(summary.len(), ItemType::ALL.len());
        for entry in &summary {
            let expected = match entry.item_type {
                ItemType::Glove => 2,
                ItemType::Time => 5,
                _ => 0,
            };
            assert_eq!(entry.count, expected, "type {}", entry.item_type);
        }
    }

    #[test]
    fn test_summary_counts_sum_to_total() {
        let counts = [(ItemType::Mist, 3), (ItemType::SecondBooster, 4)];
        let summary = complete_summary(&counts);

        let total: i64 = summary.iter().map(|entry| entry.count).sum();
        assert_eq!(total, 7);
    }

    #[test]
    fn test_summary_order_is_canonical() {
        let summary = complete_summary(&[(ItemType::ThirdBooster, 1)]);
        let order: Vec<ItemType> = summary.iter().map(|entry| entry.item_type).collect();
        assert_eq!(order, ItemType::ALL.to_vec());
    }
}
