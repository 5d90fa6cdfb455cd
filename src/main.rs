use std::sync::Arc;

use habit_api::state::AppState;
use habit_api::store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up API_PUBLIC_BASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = habit_api::config::config();
    tracing::info!("Starting Habit API in {:?} mode", config.environment);

    let state = AppState::new(Arc::new(MemoryStore::new()))
        .map_err(|e| anyhow::anyhow!("failed to build sort registry: {}", e))?;
    let app = habit_api::app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("HABIT_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Habit API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
