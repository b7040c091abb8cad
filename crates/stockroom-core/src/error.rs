//! Error types for the pure domain layer.
//!
//! - [`ValidationError`]: a request field is malformed. Raised before any I/O.
//! - [`StockError`]: the IN/OUT arithmetic refused a movement.
//! - [`CoreError`]: a referenced user, category or product is missing, or
//!   validation failed further up a call chain.
//!
//! The database and API crates wrap these in their own enums.

use thiserror::Error;

/// Lookups that came back empty, plus wrapped validation failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product with this id.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// No category with this id.
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

/// Refusals from [`crate::stock::apply_movement`].
///
/// These carry no product id: the stock rule only sees numbers. The
/// inventory engine attaches the offending product when it reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StockError {
    /// OUT would drive stock below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// OUT [{P, 4}, {P, 7}] with stock(P) = 10
    ///      │
    ///      ▼
    /// item 1: 10 - 4 = 6   ✓
    /// item 2:  6 - 7       ✗ Insufficient { available: 6, requested: 7 }
    ///      │
    ///      ▼
    /// Whole transaction rolls back, stock(P) stays 10
    /// ```
    #[error("insufficient stock: available {available}, requested {requested}")]
    Insufficient { available: i64, requested: i64 },

    /// IN would overflow the stock counter.
    #[error("stock overflow: current {current}, adding {quantity}")]
    Overflow { current: i64, quantity: i64 },
}

/// A single rejected request field. `field` uses the request's own path,
/// e.g. `items[2].quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Missing, or blank after trimming.
    #[error("{field} is required")]
    Required { field: String },

    /// A list with no entries.
    #[error("{field} must not be empty")]
    Empty { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Bounds are inclusive.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Zero or negative where only `> 0` makes sense (quantities, ids).
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Emails and `YYYY-MM-DD` dates.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// An enum code outside its vocabulary (`IN`/`OUT`, `L`/`P`).
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Name of the offending field, for per-field error lists.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::Empty { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
