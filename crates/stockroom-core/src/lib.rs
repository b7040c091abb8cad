//! # stockroom-core
//!
//! Domain types and rules for the Stockroom inventory service. Nothing in
//! here touches a database, a socket or a file; `stockroom-db` and
//! `stockroom-api` build on it.
//!
//! ```text
//!   router ──► stockroom-api ──► stockroom-db ──► SQLite
//!                   │                 │
//!                   └──────┬──────────┘
//!                          ▼
//!                   stockroom-core   (types, requests, validation, stock rule)
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, TransactionHeader, etc.)
//! - [`requests`] - Inbound request shapes decoded by the HTTP layer
//! - [`stock`] - The IN/OUT stock rule
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::stock::apply_movement;
//! use stockroom_core::TransactionType;
//!
//! assert_eq!(apply_movement(TransactionType::In, 0, 5), Ok(5));
//! assert!(apply_movement(TransactionType::Out, 3, 4).is_err());
//! ```

pub mod error;
pub mod requests;
pub mod stock;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, StockError, ValidationError};
pub use requests::*;
pub use types::*;

/// Maximum line items accepted in a single inventory transaction.
///
/// Each item extends how long the write lock is held.
pub const MAX_TRANSACTION_ITEMS: usize = 100;

/// Maximum length of free-text names (category, product, person names).
pub const MAX_NAME_LEN: usize = 200;

/// Minimum password length accepted at registration/profile update.
pub const MIN_PASSWORD_LEN: usize = 8;
