//! Domain models for the Taskie API.
//!
//! Entities are returned by the stores; `*Request` types are the raw client
//! payloads and carry their own validation into the `New*`/`*Patch` types the
//! stores accept.

pub mod company_update;
pub mod location;
pub mod task;
pub mod user;

pub use company_update::{CompanyUpdate, CreateUpdateRequest, NewCompanyUpdate};
pub use location::{CreateLocationRequest, Location, LocationPatch, NewLocation, UpdateLocationRequest};
pub use task::{CreateTaskRequest, NewTask, Task, TaskPatch, UpdateTaskRequest};
pub use user::{
    LoginRequest, NewUser, PermissionsPatch, RegisterRequest, UpdatePermissionsRequest, User,
};

/// A missing or malformed client-supplied field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field as the client sent it.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        Self::new(field, format!("{field} is required"))
    }
}

/// Trim a required text field, rejecting absent or blank values.
pub(crate) fn required_text(
    field: &'static str,
    value: Option<String>,
) -> Result<String, ValidationError> {
    optional_text(field, value)?.ok_or_else(|| ValidationError::required(field))
}

/// Trim an optional text field; a present but blank value is an error.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, ValidationError> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err(ValidationError::new(field, format!("{field} must not be empty")))
            } else {
                Ok(Some(trimmed.to_owned()))
            }
        }
    }
}
