//! Authentication service.
//!
//! Registration is admission-controlled: a username must be on the
//! pre-registration allow-list and not yet consumed. Passwords are hashed
//! with Argon2id. Token/cookie plumbing is not handled here; the routes put
//! the resulting principal into the session.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use armory_core::Username;

use crate::db::RepositoryError;
use crate::db::pre_registrations::PreRegistrationRepository;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Whether a username can currently register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Pre-registered and unconsumed.
    Available,
    /// Not on the allow-list at all.
    NotPreRegistered,
    /// Allow-list entry already consumed.
    AlreadyRegistered,
}

/// Authentication service.
///
/// Handles registration admission, account creation and login verification.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    pre_registrations: PreRegistrationRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            pre_registrations: PreRegistrationRepository::new(pool),
        }
    }

    /// Check whether a username is available for registration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` for malformed input and
    /// `AuthError::Repository` on database failure.
    pub async fn registration_status(
        &self,
        username: &str,
    ) -> Result<RegistrationStatus, AuthError> {
        let username = Username::parse(username)?;

        let status = match self.pre_registrations.get_by_username(&username).await? {
            None => RegistrationStatus::NotPreRegistered,
            Some(entry) if entry.is_registered => RegistrationStatus::AlreadyRegistered,
            Some(_) => RegistrationStatus::Available,
        };

        Ok(status)
    }

    /// Register a new user with username and password.
    ///
    /// Only permitted for an unconsumed allow-list entry; on success the
    /// entry is marked consumed and linked to the created account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotPreRegistered` / `AuthError::AlreadyRegistered`
    /// when admission fails, `AuthError::InvalidUsername` /
    /// `AuthError::WeakPassword` on validation failure.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        validate_password(password)?;

        match self.pre_registrations.get_by_username(&username).await? {
            None => return Err(AuthError::NotPreRegistered),
            Some(entry) if entry.is_registered => return Err(AuthError::AlreadyRegistered),
            Some(_) => {}
        }

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&username, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AlreadyRegistered,
                other => AuthError::Repository(other),
            })?;

        self.pre_registrations
            .mark_registered(&username, user.id)
            .await?;

        Ok(user)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown username or
    /// wrong password, `AuthError::AccountDisabled` for a deactivated
    /// account.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        // An unparseable username cannot name an account; report it the same
        // way as an unknown one.
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_auth_by_username(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(matches!(
            verify_password("incorrect horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }
}
