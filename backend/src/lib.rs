//! Daily Orbit server: task and mood tracking with AI suggestions.

pub mod ai;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;
pub mod store;

pub use handlers::build_router;
pub use state::AppState;
