use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer,
};

use super::{ai, analytics, moods, tasks};
use crate::state::AppState;

/// All API routes, with anything else served from `static_dir`.
pub fn build_router(state: AppState, static_dir: &str, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/tasks", get(tasks::get_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/api/moods",
            get(moods::get_moods)
                .post(moods::create_mood)
                .delete(moods::clear_moods),
        )
        .route("/api/analytics/summary", get(analytics::get_summary))
        .route("/api/ai/suggestions", get(ai::get_suggestions))
        .route("/api/ai/mood-advice", post(ai::get_mood_advice))
        .route("/api/ai/analyze-image", post(ai::analyze_image))
        .route("/api/ai/classify", post(ai::classify_task))
        .route("/api/ai/summary", get(ai::get_summary))
        .route("/api/ai/tips", get(ai::get_tips))
        .fallback_service(ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
