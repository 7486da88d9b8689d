use anyhow::Context;
use hoa_backend::config::AppConfig;
use hoa_backend::{create_router, initialize_backend};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let bind = config.server.bind.clone();
    let state = initialize_backend(config).await?;

    let _sweeper = state.reservation_service.spawn_hold_sweeper();
    let app = create_router(state);

    info!("Starting HOA server on {}", bind);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on {}", bind);

    axum::serve(listener, app).await?;

    Ok(())
}
