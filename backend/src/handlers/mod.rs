//! HTTP handlers, one module per resource.

pub mod ai;
pub mod analytics;
pub mod moods;
mod router;
pub mod tasks;

pub use router::build_router;
