use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_explorer::{
    api::{create_router, AppState},
    config::Config,
    services::HttpSearchBackend,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_explorer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let backend = HttpSearchBackend::from_config(&config).context("Failed to build backend client")?;
    let state = AppState::new(Arc::new(backend));

    // Options load in the background; filter entry works before they arrive
    let explorer = state.explorer.clone();
    tokio::spawn(async move {
        explorer.load_options().await;
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    tracing::info!(
        addr = %config.bind_addr(),
        backend_url = %config.backend_url,
        "Movie explorer listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
