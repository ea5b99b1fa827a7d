use tracing_subscriber::EnvFilter;

use rag_console::api;
use rag_console::config::Config;
use rag_console::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let state = AppState::new(config.clone())?;
    tracing::info!("Backend: {}", state.backend.base_url());

    // A failed first load is not fatal: the page shows the error and offers a retry.
    if let Err(e) = api::settings::run_load(&state).await {
        tracing::warn!("Initial settings load failed, using defaults until reload: {e}");
    }

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Console listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
