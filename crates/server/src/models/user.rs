//! User account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskie_core::{Email, Permissions, Principal, Role, UserId};

use super::ValidationError;

/// Maximum username length in characters.
pub const MAX_USERNAME_LENGTH: usize = 64;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A registered user.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub permissions: Permissions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The user as seen by the permission model.
    #[must_use]
    pub const fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            role: self.role,
            permissions: self.permissions,
        }
    }
}

/// Input for creating a user. Role and permissions start at their defaults.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    pub password_hash: String,
}

/// Partial capability update; absent flags are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsPatch {
    pub can_create_task: Option<bool>,
    pub can_create_location: Option<bool>,
}

impl PermissionsPatch {
    /// Returns `true` when no flag is carried.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.can_create_task.is_none() && self.can_create_location.is_none()
    }

    /// Apply the patch to a set of permissions.
    #[must_use]
    pub fn apply(self, current: Permissions) -> Permissions {
        Permissions {
            can_create_task: self.can_create_task.unwrap_or(current.can_create_task),
            can_create_location: self
                .can_create_location
                .unwrap_or(current.can_create_location),
        }
    }
}

/// Body of `PUT /admin/updatePermissions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionsRequest {
    pub user_id: Option<UserId>,
    #[serde(flatten)]
    pub patch: PermissionsPatch,
}

impl UpdatePermissionsRequest {
    /// Extract the target user and the patch.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `userId` is missing.
    pub fn validate(self) -> Result<(UserId, PermissionsPatch), ValidationError> {
        let user_id = self.user_id.ok_or_else(|| ValidationError::required("userId"))?;
        Ok((user_id, self.patch))
    }
}

/// Body of `POST /register`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validate a username: trimmed, non-empty, bounded length.
///
/// # Errors
///
/// Returns `ValidationError` for a blank or overlong username.
pub fn validate_username(raw: Option<String>) -> Result<String, ValidationError> {
    let username = super::required_text("username", raw)?;
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::new(
            "username",
            format!("username must be at most {MAX_USERNAME_LENGTH} characters"),
        ));
    }
    Ok(username)
}

/// Validate a plaintext password against the minimum length.
///
/// # Errors
///
/// Returns `ValidationError` for a missing or short password.
pub fn validate_password(raw: Option<&str>) -> Result<&str, ValidationError> {
    let password = raw.ok_or_else(|| ValidationError::required("password"))?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new(
            "password",
            format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(password)
}
