//! # stockroom-db: Database Layer and Inventory Engine
//!
//! SQLite storage for Stockroom via sqlx, plus the inventory transaction
//! engine that is the only writer of product stock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  stockroom-api service (TransactionService::create)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockroom-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ category/      │    │  (embedded)  │  │   │
//! │  │   │               │    │ product/user/  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ transaction    │    │ 001_init.sql │  │   │
//! │  │   └───────▲───────┘    └────────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │   ┌───────┴────────────────────────────┐                       │   │
//! │  │   │ InventoryService (inventory.rs)    │                       │   │
//! │  │   │ one SQLite transaction per request │                       │   │
//! │  │   └────────────────────────────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and engine error types
//! - [`repository`] - Repository implementations
//! - [`inventory`] - The inventory transaction engine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, DbConfig};
//! use stockroom_core::CreateTransactionRequest;
//!
//! let db = Database::new(DbConfig::new("./stockroom.db")).await?;
//!
//! let header_id = db
//!     .inventory()
//!     .create_transaction(&CreateTransactionRequest::outbound([(1, 2)]), user_id)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod inventory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, TransactionError, TransactionErrorKind, TransactionResult};
pub use inventory::InventoryService;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::stock::StockLedger;
pub use repository::transaction::TransactionRepository;
pub use repository::user::{UserCredentials, UserRepository};
