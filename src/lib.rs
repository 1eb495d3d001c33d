pub mod analyzer; // Prescription analysis core
pub mod api; // JSON HTTP boundary
pub mod catalog; // Catalog contract + memory/SQLite backends
pub mod config;
pub mod db;
pub mod models;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::catalog::{seed, CatalogError, CatalogStore, InMemoryCatalog, SqliteCatalog};
use crate::config::{AppConfig, CatalogBackend, ConfigError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Seed(#[from] seed::SeedError),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Signal handler error: {0}")]
    Signal(#[from] std::io::Error),
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}

/// Open the configured catalog backend, seeding it when enabled.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn CatalogStore>, StartupError> {
    let store: Arc<dyn CatalogStore> = match &config.catalog {
        CatalogBackend::Sqlite(path) => Arc::new(SqliteCatalog::open(path)?),
        CatalogBackend::Memory => {
            tracing::warn!("Using in-memory catalog; entries are lost on exit");
            Arc::new(InMemoryCatalog::new())
        }
    };

    if config.seed_catalog {
        seed::seed_if_empty(store.as_ref())?;
    }
    Ok(store)
}

/// Start the service and block until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    let store = open_store(&config)?;
    let ctx = api::ApiContext::new(store, &config);

    let server = api::start_api_server(ctx, config.bind_addr)
        .await
        .map_err(StartupError::Server)?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    tokio::signal::ctrl_c().await?;
    server.stop().await;
    Ok(())
}
