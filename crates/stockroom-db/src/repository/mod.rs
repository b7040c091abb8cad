//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Owns Which SQL                                   │
//! │                                                                         │
//! │  Service layer (stockroom-api)                                         │
//! │       │                                                                 │
//! │       ├── db.categories() / db.products() / db.users()                 │
//! │       │      └── plain CRUD, one statement per call, own the pool      │
//! │       │                                                                 │
//! │       ├── db.transactions()                                            │
//! │       │      └── read-only history (headers + items)                   │
//! │       │                                                                 │
//! │       └── db.inventory()  (crate::inventory)                           │
//! │              └── one unit of work per call, built from the             │
//! │                  connection-level helpers:                             │
//! │                    StockLedger::lock_for_update / set_stock            │
//! │                    transaction::insert_header / insert_item            │
//! │                                                                         │
//! │  ProductRepository never writes `stock`; only the engine does.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository) - Category CRUD
//! - [`ProductRepository`](product::ProductRepository) - Product catalog CRUD
//! - [`UserRepository`](user::UserRepository) - Accounts and credentials
//! - [`TransactionRepository`](transaction::TransactionRepository) - Transaction history
//! - [`StockLedger`](stock::StockLedger) - Locked stock reads and writes

pub mod category;
pub mod product;
pub mod stock;
pub mod transaction;
pub mod user;
