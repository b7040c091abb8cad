//! [`ApiError`]: what every service method returns on failure.
//!
//! Lower-layer errors convert with `?`:
//!
//! | Source | Code | Status |
//! |---|---|---|
//! | `ValidationError` | `VALIDATION_ERROR` + per-field `errors` | 400 |
//! | missing user/category/product | `NOT_FOUND` | 404 |
//! | unique or foreign-key violation | `CONFLICT` | 409 |
//! | `InsufficientStock` | `INSUFFICIENT_STOCK` | 422 |
//! | `StockOverflow`, check violation | `BUSINESS_LOGIC` | 422 |
//! | lock wait, deadline, pool timeout | `UNAVAILABLE` | 503 |
//! | anything else from storage | `DATABASE_ERROR` | 500 |
//!
//! Storage messages are logged and replaced; SQL text never reaches a caller.

use serde::Serialize;
use stockroom_core::{CoreError, ValidationError};
use stockroom_db::{DbError, TransactionError};

use crate::config::ConfigError;

/// Error returned from every service method.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for product 3: available 6, requested 7",
///   "errors": []
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Stable code clients branch on.
    pub code: ErrorCode,

    /// Display text.
    pub message: String,

    /// Only set for validation failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// One invalid input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// `SCREAMING_SNAKE_CASE` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,

    /// Bad credentials or a missing/expired token.
    Unauthorized,

    NotFound,

    Conflict,

    /// OUT larger than what is on hand.
    InsufficientStock,

    BusinessLogic,

    DatabaseError,

    /// Worth retrying later.
    Unavailable,

    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 400,
            ErrorCode::Unauthorized => 401,
            ErrorCode::NotFound => 404,
            ErrorCode::Conflict => 409,
            ErrorCode::InsufficientStock | ErrorCode::BusinessLogic => 422,
            ErrorCode::DatabaseError | ErrorCode::Internal => 500,
            ErrorCode::Unavailable => 503,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// `"{resource} {id} not found"`.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} {} not found", resource, id))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn status(&self) -> u16 {
        self.code.status()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let field = FieldError {
            field: err.field().to_string(),
            message: err.to_string(),
        };

        ApiError {
            code: ErrorCode::ValidationError,
            message: "Validation failed".to_string(),
            errors: vec![field],
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", id),
            CoreError::CategoryNotFound(id) => ApiError::not_found("Category", id),
            CoreError::UserNotFound(id) => ApiError::not_found("User", id),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, .. } => {
                ApiError::conflict(format!("{} already exists", field))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Rejected by a foreign key");
                ApiError::conflict("Resource is referenced by other records or references a missing one")
            }
            DbError::CheckViolation { message } => {
                tracing::error!(%message, "Rejected by a CHECK constraint");
                ApiError::new(ErrorCode::BusinessLogic, "Constraint violated")
            }
            DbError::Busy(e) => {
                tracing::warn!(error = %e, "Gave up waiting for the write lock");
                ApiError::new(ErrorCode::Unavailable, "Database is busy, try again")
            }
            DbError::DeadlineExceeded(limit) => ApiError::new(
                ErrorCode::Unavailable,
                format!("Request did not complete within {} ms", limit.as_millis()),
            ),
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::Unavailable, "Database pool exhausted")
            }
            e @ (DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::Internal(_)) => {
                tracing::error!(error = %e, "Storage failure");
                ApiError::new(ErrorCode::DatabaseError, "The request could not be stored")
            }
        }
    }
}

impl From<TransactionError> for ApiError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Validation(e) => e.into(),
            TransactionError::ProductNotFound { product_id } => {
                ApiError::not_found("Product", product_id)
            }
            e @ TransactionError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            e @ TransactionError::StockOverflow { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, e.to_string())
            }
            TransactionError::Persistence(db) => db.into(),
            TransactionError::Commit(db) => {
                tracing::error!(error = %db, "Inventory commit failed");
                if db.is_transient() {
                    ApiError::new(ErrorCode::Unavailable, "Transaction could not be committed, try again")
                } else {
                    ApiError::new(ErrorCode::DatabaseError, "Transaction could not be committed")
                }
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;
