//! Location handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use taskie_core::LocationId;

use crate::error::Result;
use crate::middleware::CurrentIdentity;
use crate::models::{CreateLocationRequest, Location};
use crate::state::AppState;

use super::{Ack, ApiJson, parse_id};

/// `GET /getLocation`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Location>>> {
    Ok(Json(state.locations().list().await?))
}

/// `POST /createLocation`
#[instrument(skip_all)]
pub async fn create(
    CurrentIdentity(identity): CurrentIdentity,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateLocationRequest>,
) -> Result<(StatusCode, Json<Location>)> {
    let location = state.locations().create(&identity, request).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// `DELETE /deleteLocation/{id}`
#[instrument(skip(identity, state))]
pub async fn delete(
    CurrentIdentity(identity): CurrentIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ack>> {
    let id: LocationId = parse_id(&id)?;
    state.locations().delete(&identity, id).await?;
    Ok(Ack::new("Location deleted"))
}
