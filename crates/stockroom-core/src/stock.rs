//! # Stock Rule
//!
//! The single business rule of the inventory engine, as a pure function.
//!
//! ```text
//!   IN :  new = current + quantity          (checked for overflow)
//!   OUT:  new = current - quantity          (refused if quantity > current)
//! ```
//!
//! The engine calls this once per line item with the stock it just read
//! under lock, so repeated products inside one request see the running
//! total rather than the value at the start of the request.

use crate::error::StockError;
use crate::types::TransactionType;

/// Computes the stock after applying one line item.
///
/// ## Arguments
/// * `kind` - Direction of the movement
/// * `current` - Stock read under lock (never negative)
/// * `quantity` - Line item quantity (already validated > 0)
///
/// ## Example
/// ```rust
/// use stockroom_core::stock::apply_movement;
/// use stockroom_core::{StockError, TransactionType};
///
/// assert_eq!(apply_movement(TransactionType::Out, 10, 4), Ok(6));
/// assert_eq!(
///     apply_movement(TransactionType::Out, 6, 7),
///     Err(StockError::Insufficient { available: 6, requested: 7 })
/// );
/// ```
pub fn apply_movement(kind: TransactionType, current: i64, quantity: i64) -> Result<i64, StockError> {
    match kind {
        TransactionType::In => current
            .checked_add(quantity)
            .ok_or(StockError::Overflow { current, quantity }),
        TransactionType::Out => {
            if quantity > current {
                return Err(StockError::Insufficient {
                    available: current,
                    requested: quantity,
                });
            }
            Ok(current - quantity)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
