//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │◄──│     Product     │◄──│ TransactionItem │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  name           │   │  category_id    │   │  header_id (FK) │       │
//! │  └─────────────────┘   │  stock (≥ 0)    │   │  product_id(FK) │       │
//! │                        └─────────────────┘   │  quantity (> 0) │       │
//! │                                              └────────┬────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐            │ N              │
//! │  │      User       │◄──│TransactionHeader│◄───────────┘ 1              │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  id, email      │   │  id             │                             │
//! │  │  gender (L | P) │   │  type (IN | OUT)│                             │
//! │  └─────────────────┘   │  initiator_id   │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every id is an `i64` assigned by the store on insert and never reused.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Transaction Type
// =============================================================================

/// Direction of a stock movement.
///
/// Serialized (JSON and SQL) exactly as `"IN"` / `"OUT"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Goods received: stock goes up.
    In,
    /// Goods issued: stock goes down, never below zero.
    Out,
}

impl TransactionType {
    /// Wire/database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "IN",
            TransactionType::Out => "OUT",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(TransactionType::In),
            "OUT" => Ok(TransactionType::Out),
            _ => Err(ValidationError::NotAllowed {
                field: "transaction_type".to_string(),
                allowed: vec!["IN".to_string(), "OUT".to_string()],
            }),
        }
    }
}

// =============================================================================
// Gender
// =============================================================================

/// Gender as recorded on a user profile: `"L"` (laki-laki) or `"P"` (perempuan).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum Gender {
    #[serde(rename = "L")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "L"))]
    Male,
    #[serde(rename = "P")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "P"))]
    Female,
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(Gender::Male),
            "P" => Ok(Gender::Female),
            _ => Err(ValidationError::NotAllowed {
                field: "gender".to_string(),
                allowed: vec!["L".to_string(), "P".to_string()],
            }),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A stocked product.
///
/// `stock` is read-only from every code path except the inventory engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub category_id: i64,
    /// Units on hand. Never negative.
    pub stock: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

/// A user profile. The password hash is deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[ts(as = "String")]
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Transaction Header / Item
// =============================================================================

/// Parent record of an inventory transaction. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionHeader {
    pub id: i64,
    pub transaction_type: TransactionType,
    /// User who submitted the transaction.
    pub initiator_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One (product, quantity) adjustment owned by a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionItem {
    pub id: i64,
    pub header_id: i64,
    pub product_id: i64,
    /// Always > 0; direction comes from the header.
    pub quantity: i64,
}

/// A header joined with all of its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionRecord {
    #[serde(flatten)]
    pub header: TransactionHeader,
    /// Empty (never absent) when a header has no items.
    pub items: Vec<TransactionItem>,
}

impl TransactionRecord {
    /// Net signed stock change this transaction applied to `product_id`.
    pub fn net_change_for(&self, product_id: i64) -> i64 {
        let total: i64 = self
            .items
            .iter()
            .filter(|item| item.product_id == product_id)
            .map(|item| item.quantity)
            .sum();

        match self.header.transaction_type {
            TransactionType::In => total,
            TransactionType::Out => -total,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
