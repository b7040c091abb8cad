//! Errors raised by the storage layer ([`DbError`]) and by the inventory
//! engine ([`TransactionError`]).
//!
//! `sqlx::Error` is folded into `DbError` at the repository boundary. The
//! engine wraps that in `TransactionError::Persistence`/`Commit` next to its
//! own business refusals, and the API crate maps both onto response codes.

use std::time::Duration;

use stockroom_core::{StockError, ValidationError};
use thiserror::Error;

/// A storage failure, sorted by what the caller can do about it.
#[derive(Debug, Error)]
pub enum DbError {
    /// A keyed update or delete matched no row.
    #[error("{entity} {id} does not exist")]
    NotFound { entity: String, id: String },

    /// `users.email` is the only unique column.
    #[error("{field} = '{value}' is already taken")]
    UniqueViolation { field: String, value: String },

    /// A missing category or initiator on insert, or a delete of a row
    /// something still points at (a product with history, a category in use).
    #[error("Referenced row missing or still in use: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (e.g. `stock >= 0`).
    #[error("Check constraint failed: {message}")]
    CheckViolation { message: String },

    /// Another writer held the lock for longer than `busy_timeout`.
    #[error("Database locked by another writer: {0}")]
    Busy(String),

    /// The caller's deadline elapsed before the unit of work could commit.
    #[error("Deadline of {0:?} exceeded before commit")]
    DeadlineExceeded(Duration),

    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// Any other error SQLite reported for a statement.
    #[error("Statement failed: {0}")]
    QueryFailed(String),

    /// No pooled connection freed up within the acquire timeout.
    #[error("Timed out waiting for a database connection")]
    PoolExhausted,

    #[error("Database driver error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True for lock contention and timeouts, which a caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DbError::Busy(_) | DbError::PoolExhausted | DbError::DeadlineExceeded(_)
        )
    }
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => classify(&*db_err),
            sqlx::Error::RowNotFound => DbError::not_found("Row", "?"),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

/// Sorts an error reported by SQLite itself.
fn classify(db_err: &dyn sqlx::error::DatabaseError) -> DbError {
    let message = db_err.message().to_string();

    // Extended result codes carry the primary code in the low byte.
    let primary = db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| code & 0xff);
    if let Some(SQLITE_BUSY | SQLITE_LOCKED) = primary {
        return DbError::Busy(message);
    }

    use sqlx::error::ErrorKind;
    match db_err.kind() {
        // SQLite names the column ("UNIQUE constraint failed: users.email")
        // but never the value.
        ErrorKind::UniqueViolation => DbError::UniqueViolation {
            field: message
                .strip_prefix("UNIQUE constraint failed: ")
                .unwrap_or("unknown")
                .to_string(),
            value: "?".to_string(),
        },
        ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
        ErrorKind::CheckViolation => DbError::CheckViolation { message },
        _ => DbError::QueryFailed(message),
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Inventory Engine Errors
// =============================================================================

/// Why an inventory transaction was not recorded.
///
/// Every variant means the same thing for the store: nothing was written.
/// The header, its items and every stock change were rolled back together.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Malformed request, rejected before touching the database.
    #[error("Invalid transaction request: {0}")]
    Validation(#[from] ValidationError),

    /// A line item references a product that does not exist.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: i64 },

    /// OUT would drive a product's stock below zero.
    #[error(
        "Insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// IN would overflow a product's stock counter.
    #[error("Stock overflow for product {product_id}: current {current}, adding {quantity}")]
    StockOverflow {
        product_id: i64,
        current: i64,
        quantity: i64,
    },

    /// A store operation failed while applying the transaction
    /// (I/O, lock timeout, constraint, deadline).
    #[error("Persistence failure: {0}")]
    Persistence(#[source] DbError),

    /// Every line item applied but the commit itself failed.
    #[error("Commit failed: {0}")]
    Commit(#[source] DbError),
}

/// Flat discriminant of [`TransactionError`] for callers that only branch
/// on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionErrorKind {
    Validation,
    ProductNotFound,
    InsufficientStock,
    StockOverflow,
    PersistenceFailure,
    CommitFailure,
}

impl TransactionError {
    /// Attaches the offending product to a stock rule refusal.
    pub fn from_stock(product_id: i64, err: StockError) -> Self {
        match err {
            StockError::Insufficient {
                available,
                requested,
            } => TransactionError::InsufficientStock {
                product_id,
                available,
                requested,
            },
            StockError::Overflow { current, quantity } => TransactionError::StockOverflow {
                product_id,
                current,
                quantity,
            },
        }
    }

    pub fn kind(&self) -> TransactionErrorKind {
        match self {
            TransactionError::Validation(_) => TransactionErrorKind::Validation,
            TransactionError::ProductNotFound { .. } => TransactionErrorKind::ProductNotFound,
            TransactionError::InsufficientStock { .. } => TransactionErrorKind::InsufficientStock,
            TransactionError::StockOverflow { .. } => TransactionErrorKind::StockOverflow,
            TransactionError::Persistence(_) => TransactionErrorKind::PersistenceFailure,
            TransactionError::Commit(_) => TransactionErrorKind::CommitFailure,
        }
    }

    /// The product a business-rule failure is about, if any.
    pub fn product_id(&self) -> Option<i64> {
        match self {
            TransactionError::ProductNotFound { product_id }
            | TransactionError::InsufficientStock { product_id, .. }
            | TransactionError::StockOverflow { product_id, .. } => Some(*product_id),
            _ => None,
        }
    }
}

/// Result type for inventory engine operations.
pub type TransactionResult<T> = Result<T, TransactionError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stock_attaches_product() {
        let err = TransactionError::from_stock(
            42,
            StockError::Insufficient {
                available: 6,
                requested: 7,
            },
        );

        assert_eq!(err.kind(), TransactionErrorKind::InsufficientStock);
        assert_eq!(err.product_id(), Some(42));
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 42: available 6, requested 7"
        );
    }

    #[test]
    fn test_kinds() {
        let err: TransactionError = ValidationError::Empty {
            field: "items".to_string(),
        }
        .into();
        assert_eq!(err.kind(), TransactionErrorKind::Validation);
        assert_eq!(err.product_id(), None);

        let err = TransactionError::Commit(DbError::Busy("database is locked".to_string()));
        assert_eq!(err.kind(), TransactionErrorKind::CommitFailure);
    }

    #[test]
    fn test_transient() {
        assert!(DbError::Busy("locked".to_string()).is_transient());
        assert!(DbError::DeadlineExceeded(Duration::from_millis(5)).is_transient());
        assert!(!DbError::not_found("Product", 3).is_transient());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
