//! Application state management

use database::common::RetryConfig;
use database::postgres::{DatabaseConnection, connect_from_config_with_retry, run_migrations};
use domain_products::InMemoryProductRepository;
use eyre::eyre;
use migration::Migrator;
use tracing::info;

use crate::config::{Config, StorageBackend};

/// Storage behind the product repository
#[derive(Clone)]
pub enum Storage {
    Postgres(DatabaseConnection),
    Memory(InMemoryProductRepository),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
}

impl AppState {
    /// Connect to the configured storage, applying migrations for Postgres
    pub async fn initialize(config: Config) -> eyre::Result<Self> {
        let storage = match config.storage {
            StorageBackend::Postgres => {
                let pg_config = config
                    .postgres
                    .clone()
                    .ok_or_else(|| eyre!("PostgreSQL configuration missing"))?;

                info!("Connecting to PostgreSQL");
                let retry = RetryConfig::new().with_max_retries(config.db_connect_retries);
                let db = connect_from_config_with_retry(pg_config, Some(retry)).await?;
                run_migrations::<Migrator>(&db, config.app.name).await?;

                Storage::Postgres(db)
            }
            StorageBackend::Memory => {
                info!("Using in-memory product storage");
                Storage::Memory(InMemoryProductRepository::new())
            }
        };

        Ok(Self { config, storage })
    }

    /// Release storage resources on shutdown
    pub async fn close(self) {
        if let Storage::Postgres(db) = self.storage {
            info!("Shutting down: closing PostgreSQL connections");
            match db.close().await {
                Ok(()) => info!("PostgreSQL connection pool closed"),
                Err(e) => tracing::warn!(error = %e, "Failed to close PostgreSQL pool"),
            }
        }
    }
}
