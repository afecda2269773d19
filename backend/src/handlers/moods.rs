use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use orbit_shared::{CreateMoodRequest, MoodEntry};
use serde_json::{json, Value};
use tracing::info;

use crate::error::AppResult;
use crate::state::AppState;

/// Mood history is only ever shown as the most recent entries.
pub const MOOD_HISTORY_LIMIT: usize = 50;

pub async fn get_moods(State(state): State<AppState>) -> AppResult<Json<Vec<MoodEntry>>> {
    let mut moods = state.store.list_moods().await?;
    moods.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    moods.truncate(MOOD_HISTORY_LIMIT);
    Ok(Json(moods))
}

pub async fn create_mood(
    State(state): State<AppState>,
    payload: Result<Json<CreateMoodRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MoodEntry>)> {
    let Json(payload) = payload?;
    payload.validate()?;
    let mood = MoodEntry::new(payload);
    state.store.put_mood(&mood).await?;
    Ok((StatusCode::CREATED, Json(mood)))
}

pub async fn clear_moods(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let deleted = state.store.clear_moods().await?;
    info!(deleted, "mood history cleared");
    Ok(Json(json!({ "message": "Mood history cleared", "deleted": deleted })))
}
