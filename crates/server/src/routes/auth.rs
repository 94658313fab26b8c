//! Registration, login, and current-user handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::state::AppState;

use super::ApiJson;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

/// `POST /register`
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = state.auth().register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            success: true,
            user,
        }),
    ))
}

/// `POST /login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (token, user) = state.auth().login(request).await?;
    Ok(Json(LoginResponse {
        success: true,
        token,
        user,
    }))
}

/// `GET /me`
pub async fn me(
    RequireAuth(principal): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>> {
    // The middleware just loaded this user; a miss means it was removed mid-request.
    let user = state
        .store()
        .find_user_by_id(principal.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_owned()))?;
    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}
