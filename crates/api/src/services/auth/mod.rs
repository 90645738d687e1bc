//! Authentication service.
//!
//! Password accounts with HS256 bearer tokens. Every authenticated request
//! re-resolves the token subject against the user store, so a deleted
//! account stops working immediately even while its token is unexpired.

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, TokenIssuer};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use emporium_core::{Email, Role, UserId};

use crate::db::{RepositoryError, Store};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
}

impl Identity {
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user.id
    }
}

/// Registration form.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Login form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A fresh token and the account it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a dyn Store,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, tokens: &'a TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Register a customer account and sign them in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, AuthError> {
        let user = create_account(
            self.store,
            &request.email,
            &request.password,
            request.name,
            request.phone,
            Role::Customer,
        )
        .await?;

        let token = self.tokens.issue(user.id, &user.email, user.role)?;
        Ok(AuthSession { token, user })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, AuthError> {
        let email = Email::parse(&request.email)?;

        let (user, password_hash) = self
            .store
            .user_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&request.password, &password_hash)?;

        let token = self.tokens.issue(user.id, &user.email, user.role)?;
        Ok(AuthSession { token, user })
    }

    /// Resolve a bearer token to a live user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` or `AuthError::InvalidToken` for a
    /// bad token, and `AuthError::UserNotFound` if its subject was deleted.
    pub async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.tokens.verify(token)?;
        let user = self
            .store
            .user_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(Identity { user })
    }

    /// Check the caller holds `role`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` on mismatch.
    pub fn require_role(identity: &Identity, role: Role) -> Result<(), AuthError> {
        if identity.user.role == role {
            Ok(())
        } else {
            Err(AuthError::Forbidden(role))
        }
    }
}

/// Validate and persist a new account with the given role.
///
/// Shared by self-service registration (always `Customer`) and operator
/// tooling that bootstraps admins.
///
/// # Errors
///
/// Returns `AuthError::InvalidEmail`, `AuthError::WeakPassword` or
/// `AuthError::UserAlreadyExists`.
pub async fn create_account(
    store: &dyn Store,
    email: &str,
    password: &str,
    name: String,
    phone: Option<String>,
    role: Role,
) -> Result<User, AuthError> {
    let email = Email::parse(email)?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let user = User {
        id: UserId::generate(),
        email,
        name,
        phone,
        role,
        created_at: Utc::now(),
    };

    store
        .insert_user(&user, &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

    info!(user_id = %user.id, role = %user.role, "Account created");
    Ok(user)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
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
