//! Tollgate Server: application entry point.

use anyhow::Context;
use tollgate_db::DbManager;
use tollgate_server::{AppState, ServerConfig, build_router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    let config = ServerConfig::from_env().context("load server configuration")?;
    tracing::info!(bind = %config.bind_addr, "Starting Tollgate server");

    let manager = DbManager::open(&config.db)
        .await
        .context("open catalog store")?;

    let state = AppState::new(manager.client().clone(), config.identity_header.clone());
    if config.seed_on_startup {
        state
            .admin
            .seeder()
            .seed_rbac_data()
            .await
            .context("seed RBAC catalog")?;
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Tollgate server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("serve HTTP")?;

    tracing::info!("Tollgate server stopped");
    Ok(())
}
