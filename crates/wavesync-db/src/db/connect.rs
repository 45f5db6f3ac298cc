//! Document store selection and Postgres pool setup.

use super::document::DocumentStore;
use super::memory::InMemoryDocumentStore;
use super::postgres::PgDocumentStore;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wavesync_core::{Config, DocumentStoreBackend};

/// Build the document store selected by `DOCUMENT_STORE`.
pub async fn connect_document_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    match config.document_store() {
        DocumentStoreBackend::Postgres => {
            let pool = setup_database(config).await?;
            Ok(Arc::new(PgDocumentStore::new(pool)))
        }
        DocumentStoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; catalog entries are lost on exit");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
    }
}

/// Setup database connection pool and run migrations
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url()
        .context("DATABASE_URL must be set when DOCUMENT_STORE=postgres")?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    // Workspace migrations/ from the crate root
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
