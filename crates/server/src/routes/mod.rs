//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                                 - Liveness banner
//! GET    /health                           - Health check
//! GET    /health/ready                     - Readiness (store answers)
//!
//! # Under /api/v1
//! POST   /register                         - Create account (201)
//! POST   /login                            - Exchange credentials for a token
//! GET    /me                               - Current user (auth)
//! GET    /dashboard                        - Counts and recent updates (auth)
//!
//! GET    /getTask                          - List tasks (public)
//! POST   /createTask                       - Create task (canCreateTask)
//! DELETE /deleteTask/{id}                  - Delete task (delete policy)
//! GET    /getLocation                      - List locations (public)
//! POST   /createLocation                   - Create location (canCreateLocation)
//! DELETE /deleteLocation/{id}              - Delete location (delete policy)
//! GET    /updates                          - List company updates (public)
//! POST   /addUpdate                        - Post update (admin)
//! DELETE /deleteUpdate/{id}                - Delete update (admin)
//!
//! GET    /admin/users                      - Users with permissions (admin)
//! PUT    /admin/updatePermissions          - Set capability flags (admin)
//! PUT    /admin/updateTask                 - Patch a task (admin)
//! PUT    /admin/updateLocation             - Patch a location (admin)
//! ```

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod locations;
pub mod tasks;
pub mod updates;

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::FromRequest,
    routing::{delete, get, post, put},
};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Version prefix for every API route.
pub const API_PREFIX: &str = "/api/v1";

/// JSON body extractor whose rejections become 400 validation errors.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `{"success": true, "message": ...}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

impl Ack {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

/// Parse a path segment id; anything unparseable cannot name an entity.
pub(crate) fn parse_id<T: FromStr>(raw: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("No entity with id {raw:?}")))
}

/// Routes nested under [`API_PREFIX`].
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/dashboard", get(dashboard::show))
        // Tasks
        .route("/getTask", get(tasks::list))
        .route("/createTask", post(tasks::create))
        .route("/deleteTask/{id}", delete(tasks::delete))
        // Locations
        .route("/getLocation", get(locations::list))
        .route("/createLocation", post(locations::create))
        .route("/deleteLocation/{id}", delete(locations::delete))
        // Company updates
        .route("/updates", get(updates::list))
        .route("/addUpdate", post(updates::create))
        .route("/deleteUpdate/{id}", delete(updates::delete))
        // Admin
        .route("/admin/users", get(admin::list_users))
        .route("/admin/updatePermissions", put(admin::update_permissions))
        .route("/admin/updateTask", put(admin::update_task))
        .route("/admin/updateLocation", put(admin::update_location))
}

#[cfg(test)]
mod tests {
    use taskie_core::TaskId;

    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id::<TaskId>("12").ok(), Some(TaskId::new(12)));
        assert!(matches!(
            parse_id::<TaskId>("abc"),
            Err(AppError::NotFound(_))
        ));
    }
}
