//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (DB ping)
//!
//! # Auth
//! POST /api/auth/check-username             - Pre-registration lookup
//! POST /api/auth/register                   - Complete a pre-registered signup
//! POST /api/auth/login                      - Login
//! POST /api/auth/logout                     - Logout
//! GET  /api/auth/me                         - Current account
//!
//! # Listeners
//! GET  /api/listeners                       - Own listeners with active counts
//! POST /api/listeners                       - Create listener
//! GET  /api/listeners/{id}                  - Listener detail
//! PUT  /api/listeners/{id}                  - Rename listener
//! DELETE /api/listeners/{id}                - Delete listener (cascades to items)
//! GET  /api/listeners/{id}/items            - Items, soonest expiry first
//!                                             (?active=true filters unexpired)
//!
//! # Battle items
//! POST /api/battle-items                    - Create one item
//! POST /api/battle-items/bulk               - Create many items, one expiry
//! GET  /api/battle-items/{id}               - Item detail
//! PUT  /api/battle-items/{id}               - Edit type/expiry
//! DELETE /api/battle-items/{id}             - Delete item
//!
//! # Stats
//! GET  /api/stats/dashboard                 - Listener/active/expiring counts
//! GET  /api/stats/items-summary             - Per-type active counts (all types)
//!
//! # Admin (admin capability required)
//! POST /api/admin/pre-register              - Reserve a username
//! GET  /api/admin/pre-registered-users      - List the allow-list
//! DELETE /api/admin/pre-registered-users/{id} - Delete an allow-list entry
//! GET  /api/admin/users                     - List every account
//! PATCH /api/admin/users/{id}/toggle-active - Flip an account's active flag
//! PATCH /api/admin/users/{id}/toggle-admin  - Flip an account's admin flag
//! ```

pub mod admin;
pub mod auth;
pub mod battle_items;
pub mod listeners;
pub mod stats;

use axum::Router;

use crate::state::AppState;

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::routes())
        .nest("/api/listeners", listeners::routes())
        .nest("/api/battle-items", battle_items::routes())
        .nest("/api/stats", stats::routes())
        .nest("/api/admin", admin::routes())
}
