//! Authentication service.
//!
//! Password registration and login, plus the session [`TokenService`].

mod error;
mod token;

pub use error::{AuthError, TokenError};
pub use token::{Claims, TokenService};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use taskie_core::Email;

use crate::db::{RepositoryError, Store};
use crate::models::user::{validate_password, validate_username};
use crate::models::{LoginRequest, NewUser, RegisterRequest, User, ValidationError};

/// Authentication service.
///
/// Handles user registration and password login.
pub struct AuthService<'a> {
    store: &'a dyn Store,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, tokens: &'a TokenService) -> Self {
        Self { store, tokens }
    }

    /// Register a new user with role `user` and no capabilities.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a bad username or password.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        let username = validate_username(request.username)?;
        let email = request
            .email
            .ok_or_else(|| ValidationError::required("email"))?;
        let email = Email::parse(&email)?;
        let password = validate_password(request.password.as_deref())?;

        let password_hash = hash_password(password)?;

        let user = self
            .store
            .create_user(NewUser {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with email and password, returning a fresh session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if either field is missing.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, request: LoginRequest) -> Result<(String, User), AuthError> {
        let email = request
            .email
            .ok_or_else(|| ValidationError::required("email"))?;
        let password = request
            .password
            .ok_or_else(|| ValidationError::required("password"))?;

        // A malformed address cannot belong to any account.
        let email = Email::parse(&email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&password, &user.password_hash)?;

        let token = self.tokens.issue(user.id)?;
        tracing::debug!(user_id = %user.id, "User logged in");
        Ok((token, user))
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
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
