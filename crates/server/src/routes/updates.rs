//! Company update handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use taskie_core::UpdateId;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{CompanyUpdate, CreateUpdateRequest};
use crate::state::AppState;

use super::{Ack, ApiJson, parse_id};

/// `GET /updates`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CompanyUpdate>>> {
    Ok(Json(state.updates().list().await?))
}

/// `POST /addUpdate`
#[instrument(skip_all)]
pub async fn create(
    admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUpdateRequest>,
) -> Result<(StatusCode, Json<CompanyUpdate>)> {
    let update = state.updates().create(&admin.identity(), request).await?;
    Ok((StatusCode::CREATED, Json(update)))
}

/// `DELETE /deleteUpdate/{id}`
#[instrument(skip(admin, state))]
pub async fn delete(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ack>> {
    let id: UpdateId = parse_id(&id)?;
    state.updates().delete(&admin.identity(), id).await?;
    Ok(Ack::new("Update deleted"))
}
