//! Database connection pool management
//!
//! Builds the SQLx SQLite pool from `DatabaseConfig`, applies migrations and
//! exposes health checks for the readiness endpoint.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use ec_shared::config::DatabaseConfig;

use crate::InfrastructureError;

/// How long SQLite waits on a locked database before returning SQLITE_BUSY
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DatabasePool {
    /// SQLx SQLite connection pool
    pool: SqlitePool,
    /// Configuration used to create this pool
    config: DatabaseConfig,
}

impl DatabasePool {
    /// Create a new database connection pool
    ///
    /// File databases are created on first use, along with their parent
    /// directory. Foreign keys are enforced on every connection.
    ///
    /// # Example
    /// ```no_run
    /// use ec_infra::database::DatabasePool;
    /// use ec_shared::config::DatabaseConfig;
    ///
    /// async fn create_pool() -> Result<DatabasePool, Box<dyn std::error::Error>> {
    ///     let pool = DatabasePool::new(DatabaseConfig::new("sqlite://data/shop.db")).await?;
    ///     pool.run_migrations().await?;
    ///     Ok(pool)
    /// }
    /// ```
    pub async fn new(config: DatabaseConfig) -> Result<Self, InfrastructureError> {
        tracing::info!(
            max_connections = config.max_connections,
            in_memory = config.is_in_memory(),
            "Creating database connection pool"
        );

        let connect_options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| InfrastructureError::Config(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        if !config.is_in_memory() {
            if let Some(parent) = connect_options.clone().get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        InfrastructureError::Config(format!(
                            "Cannot create database directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }
        }

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout));

        // An in-memory database lives only as long as its connection
        pool_options = if config.is_in_memory() {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options
                .idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(1800))
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to create database pool");
                InfrastructureError::Database(e)
            })?;

        tracing::info!("Database connection pool created");

        Ok(Self { pool, config })
    }

    /// Private in-memory database with migrations applied. Used by tests and
    /// local runs without a file.
    pub async fn in_memory() -> Result<Self, InfrastructureError> {
        let pool = Self::new(DatabaseConfig::in_memory()).await?;
        pool.run_migrations().await?;
        Ok(pool)
    }

    /// Get a reference to the underlying SQLx pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Apply the embedded migrations in `infra/migrations`
    pub async fn run_migrations(&self) -> Result<(), InfrastructureError> {
        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// Check if the database answers a trivial query
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let row = sqlx::query("SELECT 1").fetch_one(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Database health check failed");
            InfrastructureError::Database(e)
        })?;

        let value: i64 = sqlx::Row::try_get(&row, 0)?;
        Ok(value == 1)
    }

    /// Close all connections in the pool. Call during shutdown.
    pub async fn close(&self) {
        tracing::info!("Closing database connection pool");
        self.pool.close().await;
    }
}
