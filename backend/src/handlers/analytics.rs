use axum::{extract::State, response::Json};
use orbit_shared::AnalyticsSummary;

use crate::error::AppResult;
use crate::state::AppState;

pub async fn get_summary(State(state): State<AppState>) -> AppResult<Json<AnalyticsSummary>> {
    let tasks = state.store.list_tasks().await?;
    Ok(Json(AnalyticsSummary::from_tasks(&tasks)))
}
