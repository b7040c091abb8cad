//! # Transaction Repository
//!
//! Inventory transaction history: headers and their line items.
//!
//! ## Read And Write Sides
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WRITE (engine only, inside its unit of work)                          │
//! │    insert_header(conn, ...)  → header id                               │
//! │    insert_item(conn, ...)    → item id                                 │
//! │                                                                         │
//! │  READ (TransactionRepository, on the pool)                             │
//! │    get_by_initiator(user)    → [TransactionRecord] newest first        │
//! │    get_by_id(header)         → Option<TransactionRecord>               │
//! │                                                                         │
//! │  Readers only ever see committed transactions, each either complete   │
//! │  or absent.                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::{TransactionHeader, TransactionItem, TransactionRecord, TransactionType};

// =============================================================================
// Write Side (connection level)
// =============================================================================

/// Inserts a transaction header and returns its id.
pub async fn insert_header(
    conn: &mut SqliteConnection,
    transaction_type: TransactionType,
    initiator_id: i64,
    created_at: DateTime<Utc>,
) -> DbResult<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO transaction_headers (transaction_type, initiator_id, created_at)
        VALUES (?1, ?2, ?3)
        RETURNING id
        "#,
    )
    .bind(transaction_type)
    .bind(initiator_id)
    .bind(created_at)
    .fetch_one(&mut *conn)
    .await?;

    debug!(header_id = id, %transaction_type, initiator_id, "Header inserted");
    Ok(id)
}

/// Inserts one line item under a header and returns its id.
pub async fn insert_item(
    conn: &mut SqliteConnection,
    header_id: i64,
    product_id: i64,
    quantity: i64,
) -> DbResult<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO transaction_items (header_id, product_id, quantity)
        VALUES (?1, ?2, ?3)
        RETURNING id
        "#,
    )
    .bind(header_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(&mut *conn)
    .await?;

    debug!(header_id, item_id = id, product_id, quantity, "Line item inserted");
    Ok(id)
}

// =============================================================================
// Read Side
// =============================================================================

/// Repository for reading transaction history.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Returns every transaction a user initiated, newest header first,
    /// each with its items in insertion order.
    ///
    /// Two queries (headers, then all their items) rather than one per
    /// header. Both run in one read transaction so they see the same
    /// snapshot.
    pub async fn get_by_initiator(&self, initiator_id: i64) -> DbResult<Vec<TransactionRecord>> {
        let mut tx = self.pool.begin().await?;

        let headers = sqlx::query_as::<_, TransactionHeader>(
            r#"
            SELECT id, transaction_type, initiator_id, created_at
            FROM transaction_headers
            WHERE initiator_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(initiator_id)
        .fetch_all(&mut *tx)
        .await?;

        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT i.id, i.header_id, i.product_id, i.quantity
            FROM transaction_items i
            JOIN transaction_headers h ON h.id = i.header_id
            WHERE h.initiator_id = ?1
            ORDER BY i.id ASC
            "#,
        )
        .bind(initiator_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            initiator_id,
            headers = headers.len(),
            items = items.len(),
            "Loaded transaction history"
        );

        Ok(assemble(headers, items))
    }

    /// Returns one transaction with its items, if it exists.
    pub async fn get_by_id(&self, header_id: i64) -> DbResult<Option<TransactionRecord>> {
        let mut tx = self.pool.begin().await?;

        let header = sqlx::query_as::<_, TransactionHeader>(
            r#"
            SELECT id, transaction_type, initiator_id, created_at
            FROM transaction_headers
            WHERE id = ?1
            "#,
        )
        .bind(header_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(header) = header else {
            tx.commit().await?;
            return Ok(None);
        };

        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT id, header_id, product_id, quantity
            FROM transaction_items
            WHERE header_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(header_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(TransactionRecord { header, items }))
    }

    /// Counts all committed headers.
    pub async fn count_headers(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction_headers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts all committed line items.
    pub async fn count_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Groups items under their headers, keeping header order and item order.
fn assemble(headers: Vec<TransactionHeader>, items: Vec<TransactionItem>) -> Vec<TransactionRecord> {
    let mut by_header: HashMap<i64, Vec<TransactionItem>> = HashMap::new();
    for item in items {
        by_header.entry(item.header_id).or_default().push(item);
    }

    headers
        .into_iter()
        .map(|header| {
            let items = by_header.remove(&header.id).unwrap_or_default();
            TransactionRecord { header, items }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
