//! Task handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use taskie_core::TaskId;

use crate::error::Result;
use crate::middleware::CurrentIdentity;
use crate::models::{CreateTaskRequest, Task};
use crate::state::AppState;

use super::{Ack, ApiJson, parse_id};

/// `GET /getTask`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Task>>> {
    Ok(Json(state.tasks().list().await?))
}

/// `POST /createTask`
#[instrument(skip_all)]
pub async fn create(
    CurrentIdentity(identity): CurrentIdentity,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>)> {
    let task = state.tasks().create(&identity, request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `DELETE /deleteTask/{id}`
#[instrument(skip(identity, state))]
pub async fn delete(
    CurrentIdentity(identity): CurrentIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ack>> {
    let id: TaskId = parse_id(&id)?;
    state.tasks().delete(&identity, id).await?;
    Ok(Ack::new("Task deleted"))
}
