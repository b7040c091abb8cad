//! # Request Types
//!
//! Shapes the HTTP layer decodes from JSON bodies and hands to the
//! services. They are structurally typed only; business checks live in
//! [`crate::validation`].
//!
//! ```text
//! JSON body ──serde──► *Request ──validation──► typed input ──► stockroom-db
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Gender, TransactionType};

// =============================================================================
// Inventory Transactions
// =============================================================================

/// One requested stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemRequest {
    pub product_id: i64,
    pub quantity: i64,
}

impl LineItemRequest {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        LineItemRequest {
            product_id,
            quantity,
        }
    }
}

/// Body of `POST /api/transactions`.
///
/// The initiator is never part of the body; it comes from the verified
/// session token and is passed to the engine separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateTransactionRequest {
    pub transaction_type: TransactionType,
    pub items: Vec<LineItemRequest>,
}

impl CreateTransactionRequest {
    /// Inbound movement of the given `(product_id, quantity)` pairs.
    pub fn inbound(items: impl IntoIterator<Item = (i64, i64)>) -> Self {
        Self::of(TransactionType::In, items)
    }

    /// Outbound movement of the given `(product_id, quantity)` pairs.
    pub fn outbound(items: impl IntoIterator<Item = (i64, i64)>) -> Self {
        Self::of(TransactionType::Out, items)
    }

    fn of(transaction_type: TransactionType, items: impl IntoIterator<Item = (i64, i64)>) -> Self {
        CreateTransactionRequest {
            transaction_type,
            items: items
                .into_iter()
                .map(|(product_id, quantity)| LineItemRequest::new(product_id, quantity))
                .collect(),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Body of category create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryRequest {
    pub name: String,
    pub description: String,
}

/// Body of product create/update.
///
/// There is no stock field: new products start at zero and stock only
/// moves through inventory transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub category_id: i64,
}

// =============================================================================
// Users & Auth
// =============================================================================

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    /// `"L"` or `"P"`
    pub gender: String,
}

/// Body of `PUT /api/users`. Same fields as registration.
pub type UpdateProfileRequest = RegisterRequest;

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile fields after validation: trimmed, email lower-cased, date and
/// gender parsed. The password is still plain text; hashing happens in
/// the auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
}
