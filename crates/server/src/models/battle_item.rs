//! Battle item domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use armory_core::{BattleItemId, ItemType, ListenerId};

/// A perishable battle item owned by a listener.
///
/// `is_expired` is a cached projection of `expiry_date < now`, refreshed by
/// the expiry sweep; it may lag the truth by at most one sweep interval. The
/// stats queries compare `expiry_date` directly where that staleness would
/// show.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BattleItem {
    /// Unique item ID.
    pub id: BattleItemId,
    /// Owning listener. Never changes after creation.
    pub listener_id: ListenerId,
    /// Which of the six item kinds this is.
    pub item_type: ItemType,
    /// The instant this item stops being usable.
    pub expiry_date: DateTime<Utc>,
    /// Cached lifecycle flag maintained by the expiry sweep.
    pub is_expired: bool,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}
