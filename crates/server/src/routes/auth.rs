//! Auth route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::middleware::auth::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthService, RegistrationStatus};
use crate::state::AppState;

/// Build the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/check-username", post(check_username))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Request carrying only a username.
#[derive(Debug, Deserialize)]
pub struct UsernameRequest {
    pub username: Option<String>,
}

/// Request carrying credentials.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Message-plus-account response for register/login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: User,
}

/// Simple message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn require_field(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(message.to_owned()))
}

/// Check whether a username can register.
///
/// 200 when available, 404 when not pre-registered, 409 when already used.
///
/// # Errors
///
/// Returns `AppError` per the outcomes above.
pub async fn check_username(
    State(state): State<AppState>,
    Json(body): Json<UsernameRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let username = require_field(body.username, "Username is required")?;

    let auth = AuthService::new(state.pool());
    match auth.registration_status(&username).await? {
        RegistrationStatus::Available => Ok(Json(MessageResponse {
            message: "Username is available for registration".to_owned(),
        })),
        RegistrationStatus::NotPreRegistered => Err(AppError::NotFound(
            "This username is not pre-registered".to_owned(),
        )),
        RegistrationStatus::AlreadyRegistered => Err(AppError::Conflict(
            "This username is already registered".to_owned(),
        )),
    }
}

/// Complete registration for a pre-registered username.
///
/// # Errors
///
/// Returns `AppError` on validation, admission or database failure.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let username = require_field(body.username, "Username and password are required")?;
    let password = require_field(body.password, "Username and password are required")?;

    let auth = AuthService::new(state.pool());
    let user = auth.register(&username, &password).await?;

    establish_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_owned(),
            user,
        }),
    ))
}

/// Login with username and password.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` for bad credentials,
/// `AppError::Forbidden` for deactivated accounts.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let username = require_field(body.username, "Username and password are required")?;
    let password = require_field(body.password, "Username and password are required")?;

    let auth = AuthService::new(state.pool());
    let user = auth.login(&username, &password).await?;

    // A fresh session id on privilege change
    session.cycle_id().await.map_err(session_error)?;
    establish_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_owned(),
        user,
    }))
}

/// Logout the current session.
///
/// # Errors
///
/// Returns `AppError::Internal` if the session store fails.
pub async fn logout(session: Session) -> Result<Json<MessageResponse>, AppError> {
    clear_current_user(&session).await.map_err(session_error)?;

    Ok(Json(MessageResponse {
        message: "Logout successful".to_owned(),
    }))
}

/// The current account, freshly loaded.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the account vanished since login.
pub async fn me(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(Json(user))
}

async fn establish_session(session: &Session, user: &User) -> Result<(), AppError> {
    let current = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        is_admin: user.is_admin,
    };
    set_current_user(session, &current)
        .await
        .map_err(session_error)
}

fn session_error(e: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session store error: {e}"))
}
