//! # Store Database Handle
//!
//! Opens the store's SQLite file and hands out repositories over one shared
//! pool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PosConfig.database_path ──► DbConfig::new(path)                        │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                    Database::new(config).await                          │
//! │                    open pool, apply 0001_initial_schema                 │
//! │                                   │                                     │
//! │          ┌────────────────────────┼─────────────────────────┐           │
//! │          ▼                        ▼                         ▼           │
//! │   db.products()            db.customers()             db.sales()        │
//! │   catalog lookups          saved customers            sale transaction  │
//! │                                                                         │
//! │  Tills sharing one file: WAL journal, writers wait up to busy_timeout   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! In-memory databases (tests) run on a single connection that never idles
//! out, since the data lives and dies with it.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::customer::CustomerRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use lats_core::BusinessInfo;

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// How to open the store database.
///
/// ```rust
/// use std::time::Duration;
/// use lats_db::DbConfig;
///
/// let config = DbConfig::new("/var/lib/lats/lats.db")
///     .max_connections(3)
///     .busy_timeout(Duration::from_secs(10));
/// assert_eq!(config.max_connections, 3);
/// assert!(!config.is_in_memory());
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// One till rarely needs more than a handful. Default: 4
    pub max_connections: u32,

    /// How long a writer waits for another till's sale transaction to
    /// release the file. Default: 5 seconds
    pub busy_timeout: Duration,

    /// How long to wait for a free pooled connection. Default: 30 seconds
    pub acquire_timeout: Duration,

    /// Apply pending migrations on open. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// File database, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Private in-memory database for tests.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            ..DbConfig::new(IN_MEMORY_PATH)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };

        Ok(options.foreign_keys(true).busy_timeout(self.busy_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the store database. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    business: Arc<BusinessInfo>,
}

impl Database {
    /// Opens the pool and, if configured, applies migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening store database");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);
        if config.is_in_memory() {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database {
            pool,
            business: Arc::default(),
        };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Store schema up to date");
        Ok(())
    }

    /// Sets the store details printed on receipts.
    pub fn with_business_info(mut self, business: BusinessInfo) -> Self {
        self.business = Arc::new(business);
        self
    }

    pub fn business_info(&self) -> &BusinessInfo {
        &self.business
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone()).with_business_info(Arc::clone(&self.business))
    }

    /// Closes the pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        debug!("Closing store database");
        self.pool.close().await;
    }

    /// True if a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert!(total >= 1);
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_pool_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_defaults() {
        let file = DbConfig::new("/tmp/lats-test.db").max_connections(0);
        assert_eq!(file.max_connections, 1);
        assert_eq!(file.busy_timeout, Duration::from_secs(5));
        assert!(file.run_migrations);

        let memory = DbConfig::in_memory().run_migrations(false);
        assert!(memory.is_in_memory());
        assert_eq!(memory.max_connections, 1);
        assert!(!memory.run_migrations);
    }
}
