mod invoices;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// SQLite client for the invoice record store.
pub struct StoreClient {
    pool: SqlitePool,
}

impl StoreClient {
    /// Connect to SQLite and return a client with a connection pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        tracing::info!("Connecting to SQLite");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let client = Self { pool };
        client.health_check().await?;
        tracing::info!("SQLite connection established");

        Ok(client)
    }

    /// Verify the connection is alive.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        tracing::info!("Running SQLite migrations");

        sqlx::migrate!("src/store/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        tracing::info!("SQLite migrations complete");
        Ok(())
    }

    /// Get a reference to the underlying connection pool.
    #[allow(dead_code)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite connection error: {0}")]
    Connection(String),

    #[error("SQLite query error: {0}")]
    Query(String),

    #[error("SQLite migration error: {0}")]
    Migration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Could not allocate a unique invoice id after {0} attempts")]
    IdCollision(u32),
}

impl From<StoreError> for billing_common::BillingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => billing_common::BillingError::NotFound(msg),
            StoreError::Validation(msg) => billing_common::BillingError::Validation(msg),
            other => billing_common::BillingError::Database(other.to_string()),
        }
    }
}
