//! AI endpoints. The dispatcher never fails; an exhausted fallback shows
//! up as `[]` for list results and `null` for single records.

use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    response::Json,
};
use orbit_shared::{MoodDetection, Suggestion, TaskStatus, TaskSummary};
use serde::Deserialize;
use serde_json::Value;

use crate::ai::ImageInput;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

const IMAGE_FIELD: &str = "image";
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

#[derive(Debug, Deserialize)]
pub struct MoodAdviceRequest {
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub extra: Value,
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub text: String,
}

pub async fn get_suggestions(State(state): State<AppState>) -> Json<Vec<Suggestion>> {
    Json(state.ai.get_suggestions().await.unwrap_or_default())
}

pub async fn get_mood_advice(
    State(state): State<AppState>,
    payload: Result<Json<MoodAdviceRequest>, JsonRejection>,
) -> AppResult<Json<Vec<String>>> {
    let Json(payload) = payload?;
    let advice = state.ai.get_mood_advice(&payload.mood, &payload.extra).await;
    Ok(Json(advice.unwrap_or_default()))
}

pub async fn analyze_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Option<MoodDetection>>> {
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if !bytes.is_empty() {
            image = Some(ImageInput {
                bytes: bytes.to_vec(),
                mime_type,
            });
        }
        break;
    }

    let image = image.ok_or_else(|| AppError::BadRequest("No image uploaded".to_string()))?;
    Ok(Json(state.ai.analyze_image(&image).await))
}

pub async fn classify_task(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> AppResult<Json<Option<Suggestion>>> {
    let Json(payload) = payload?;
    if payload.text.trim().is_empty() {
        return Err(AppError::Validation {
            field: "text",
            reason: "must not be blank",
        });
    }
    Ok(Json(state.ai.classify_task(&payload.text).await))
}

/// Summarizes the active tasks, newest first.
pub async fn get_summary(State(state): State<AppState>) -> AppResult<Json<Option<TaskSummary>>> {
    let mut tasks: Vec<_> = state
        .store
        .list_tasks()
        .await?
        .into_iter()
        .filter(|t| t.status == TaskStatus::Active)
        .collect();
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(state.ai.get_summary(&tasks).await))
}

pub async fn get_tips(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.ai.get_tips().await.unwrap_or_default())
}
