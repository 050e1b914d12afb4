use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use kanelm_api::app::{build_app, services::DynOwnershipStore, AppServices};
use kanelm_api::config::AppConfig;
use kanelm_infra::{InMemoryOwnershipStore, PostgresOwnershipStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    kanelm_observability::init();

    let config = AppConfig::from_env().context("invalid server configuration")?;

    let table = kanelm_infra::load_permission_table(&config.permissions_path)
        .context("failed to load permission table")?;

    let store: DynOwnershipStore = match &config.database_url {
        Some(url) => Arc::new(
            PostgresOwnershipStore::connect(url, config.db_max_connections)
                .await
                .context("failed to connect to ownership database")?,
        ),
        None => {
            tracing::warn!("DATABASE_URL not set; using empty in-memory ownership store");
            Arc::new(InMemoryOwnershipStore::new())
        }
    };

    let services = Arc::new(AppServices::new(table, store, &config));

    let shutdown = CancellationToken::new();
    let eviction = services
        .sessions()
        .spawn_eviction(config.session, shutdown.clone());

    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {e}");
            }
        })
        .await
        .context("server error")?;

    shutdown.cancel();
    eviction.await.context("session eviction task panicked")?;

    Ok(())
}
