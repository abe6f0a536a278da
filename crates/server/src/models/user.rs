//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use armory_core::{PreRegistrationId, UserId, Username};

/// An account (domain type).
///
/// The password hash is deliberately not part of this type; repositories
/// return it separately where login needs it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login/display name.
    pub username: Username,
    /// Deactivated accounts cannot log in. Users are never hard-deleted.
    pub is_active: bool,
    /// Grants access to the admin surface.
    pub is_admin: bool,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// An entry on the registration allow-list.
///
/// Registration is only permitted for usernames an admin put here first;
/// completing registration consumes the entry and links the created user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreRegistration {
    /// Unique entry ID.
    pub id: PreRegistrationId,
    /// The reserved username.
    pub username: Username,
    /// Whether registration has been completed for this entry.
    pub is_registered: bool,
    /// When registration was completed, if it was.
    pub registered_at: Option<DateTime<Utc>>,
    /// The account created from this entry, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<LinkedUser>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
}

/// The slice of a registered account shown next to its allow-list entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedUser {
    pub id: UserId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
