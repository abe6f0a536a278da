//! Listener domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use armory_core::{ListenerId, UserId};

/// A named entity owned by exactly one user.
///
/// Listeners own battle items exclusively; deleting a listener deletes its
/// items (enforced by the schema's cascade).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    /// Unique listener ID.
    pub id: ListenerId,
    /// Display name. The only editable field.
    pub name: String,
    /// Owning user. Never changes after creation.
    pub user_id: UserId,
    /// When the listener was created.
    pub created_at: DateTime<Utc>,
    /// When the listener was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A listener plus its active-item count, as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ListenerSummary {
    pub id: ListenerId,
    pub name: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Items with `expiry_date >= now`, computed live at request time.
    pub active_item_count: i64,
}
