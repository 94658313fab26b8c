//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password registration/login and session tokens
//! - `tasks` / `locations` / `updates` - Resource services gated by the permission model
//! - `users` - Admin capability management
//! - `dashboard` - Aggregate counts for the dashboard view
//!
//! Every mutating resource operation asks [`AccessPolicy::can_perform`]
//! before touching the store; a denial changes nothing.

pub mod auth;
pub mod dashboard;
pub mod locations;
pub mod tasks;
pub mod updates;
pub mod users;

pub use auth::{AuthError, AuthService, TokenError, TokenService};
pub use dashboard::{Dashboard, DashboardService};
pub use locations::LocationService;
pub use tasks::TaskService;
pub use updates::UpdateService;
pub use users::UserService;

use thiserror::Error;

use taskie_core::{AccessPolicy, Action, Identity};

use crate::db::RepositoryError;
use crate::models::ValidationError;

/// Errors from resource services.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The caller's identity may not perform the action.
    #[error("not permitted to {0}")]
    Forbidden(Action),

    /// A missing or malformed field.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unknown entity id.
    #[error("not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ResourceError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// Consult the permission model, logging denials.
///
/// # Errors
///
/// Returns `ResourceError::Forbidden` when the policy denies `action`.
pub fn authorize(
    policy: &AccessPolicy,
    identity: &Identity,
    action: Action,
) -> Result<(), ResourceError> {
    if policy.can_perform(identity, action) {
        return Ok(());
    }
    tracing::warn!(
        user_id = ?identity.user_id().map(|id| id.as_i32()),
        action = %action,
        "Permission denied"
    );
    Err(ResourceError::Forbidden(action))
}
