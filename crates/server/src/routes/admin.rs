//! Admin-only handlers: user permissions and entity patches.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{
    Location, Task, UpdateLocationRequest, UpdatePermissionsRequest, UpdateTaskRequest, User,
};
use crate::state::AppState;

use super::ApiJson;
use super::auth::UserResponse;

/// `GET /admin/users`
pub async fn list_users(
    admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.users().list(&admin.identity()).await?))
}

/// `PUT /admin/updatePermissions`
#[instrument(skip_all)]
pub async fn update_permissions(
    admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdatePermissionsRequest>,
) -> Result<Json<UserResponse>> {
    let user = state
        .users()
        .update_permissions(&admin.identity(), request)
        .await?;
    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}

/// `PUT /admin/updateTask`
#[instrument(skip_all)]
pub async fn update_task(
    admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateTaskRequest>,
) -> Result<Json<Task>> {
    Ok(Json(state.tasks().update(&admin.identity(), request).await?))
}

/// `PUT /admin/updateLocation`
#[instrument(skip_all)]
pub async fn update_location(
    admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateLocationRequest>,
) -> Result<Json<Location>> {
    Ok(Json(
        state.locations().update(&admin.identity(), request).await?,
    ))
}
