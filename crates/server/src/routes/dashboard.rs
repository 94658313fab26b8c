//! Dashboard handler.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::services::Dashboard;
use crate::state::AppState;

/// `GET /dashboard`
pub async fn show(_user: RequireAuth, State(state): State<AppState>) -> Result<Json<Dashboard>> {
    Ok(Json(state.dashboard().summary().await?))
}
