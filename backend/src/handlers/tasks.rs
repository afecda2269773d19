use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Json,
};
use orbit_shared::{CreateTaskRequest, Task, UpdateTaskRequest};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const NOT_FOUND: &str = "Task not found";

/// Newest first.
pub async fn get_tasks(State(state): State<AppState>) -> AppResult<Json<Vec<Task>>> {
    let mut tasks = state.store.list_tasks().await?;
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(tasks))
}

pub async fn get_task(
    id: Result<Path<Uuid>, PathRejection>,
    State(state): State<AppState>,
) -> AppResult<Json<Task>> {
    let Path(id) = id?;
    state
        .store
        .get_task(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(NOT_FOUND))
}

pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let Json(payload) = payload?;
    payload.validate()?;
    let task = Task::new(payload);
    state.store.put_task(&task).await?;
    info!(task_id = %task.id, category = task.category.as_str(), "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    id: Result<Path<Uuid>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> AppResult<Json<Task>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    payload.validate()?;
    let mut task = state
        .store
        .get_task(id)
        .await?
        .ok_or(AppError::NotFound(NOT_FOUND))?;
    task.apply(payload);
    state.store.put_task(&task).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    id: Result<Path<Uuid>, PathRejection>,
    State(state): State<AppState>,
) -> AppResult<Json<Value>> {
    let Path(id) = id?;
    if !state.store.delete_task(id).await? {
        return Err(AppError::NotFound(NOT_FOUND));
    }
    info!(task_id = %id, "task deleted");
    Ok(Json(json!({ "id": id, "message": "Task deleted" })))
}
