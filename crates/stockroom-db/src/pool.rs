//! # Connection Pool
//!
//! Opening the SQLite database that backs Stockroom.
//!
//! Every connection is opened with:
//! - `journal_mode = WAL`: history and catalog reads run against the last
//!   committed snapshot while an inventory transaction holds the write lock
//! - `synchronous = NORMAL`
//! - `foreign_keys = ON`: line items, headers and products reference each other
//! - `busy_timeout`: how long a second writer queues for the lock before
//!   the statement fails with `SQLITE_BUSY`
//!
//! ```text
//!   inventory call A ──► conn 1   BEGIN … header insert (takes write lock) … COMMIT
//!   inventory call B ──► conn 2   BEGIN … header insert (queues ≤ busy_timeout)
//!   history query    ──► conn 3   reads the WAL snapshot, never blocks
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::inventory::InventoryService;
use crate::migrations;
use crate::repository::category::CategoryRepository;
use crate::repository::product::ProductRepository;
use crate::repository::transaction::TransactionRepository;
use crate::repository::user::UserRepository;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Pool and connection settings.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/stockroom/stockroom.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database file, created on first open. `:memory:` for a private in-memory database.
    pub database_path: PathBuf,

    /// Upper bound on pooled connections (5).
    pub max_connections: u32,

    /// Connections opened eagerly and kept around (1).
    pub min_connections: u32,

    /// Wait for a free pooled connection before giving up (30s).
    pub acquire_timeout: Duration,

    /// Idle connections above `min_connections` are closed after this (10 min).
    /// `None` keeps them forever.
    pub idle_timeout: Option<Duration>,

    /// Per-statement wait on another connection's write lock (5s).
    pub busy_timeout: Duration,

    /// Apply pending migrations when the pool opens.
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// A fresh, private in-memory database.
    ///
    /// An in-memory database lives and dies with its connection, so the pool
    /// holds exactly one and never reaps it. Anything running inside an
    /// inventory transaction must go through that transaction.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            ..DbConfig::new(IN_MEMORY)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
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
        self.database_path == Path::new(IN_MEMORY)
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
        };

        Ok(options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the pool. Clones share it; every accessor below is a thin
/// wrapper over a pool clone.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./stockroom.db")).await?;
///
/// let header_id = db
///     .inventory()
///     .create_transaction(&CreateTransactionRequest::inbound([(1, 5)]), user_id)
///     .await?;
/// let history = db.transactions().get_by_initiator(user_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let connect_options = config.connect_options()?;

        debug!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            busy_timeout_ms = u64::try_from(config.busy_timeout.as_millis()).unwrap_or(u64::MAX),
            "Opening SQLite pool"
        );

        let pool = config
            .pool_options()
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        info!(path = %config.database_path.display(), "Database ready");
        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        debug!("Schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Read side of the transaction log.
    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.pool.clone())
    }

    /// The only writer of product stock.
    pub fn inventory(&self) -> InventoryService {
        InventoryService::new(self.pool.clone())
    }

    /// Waits for checked-out connections to return, then closes the pool.
    /// Every later call on this handle or its clones fails.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }

    /// `true` if a trivial statement round-trips.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}
