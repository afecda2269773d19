use orbit_backend::{build_router, config::Config, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("failed to load .env: {e}");
        }
    }

    let config = Config::from_env()?;
    let state = AppState::from_config(&config)?;

    info!(
        storage = ?config.storage,
        ai_mode = %state.ai.mode(),
        engine = state.ai.engine_name(),
        static_dir = %config.static_dir,
        "starting Daily Orbit"
    );

    let app = build_router(state, &config.static_dir, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
