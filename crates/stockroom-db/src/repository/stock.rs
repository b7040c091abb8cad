//! # Stock Ledger
//!
//! Locked reads and writes of `products.stock`, on a connection that is
//! already inside a transaction.
//!
//! ## Read-For-Update on SQLite
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SQLite has no SELECT ... FOR UPDATE and no row locks. A no-op write   │
//! │  gives the same guarantee:                                             │
//! │                                                                         │
//! │    UPDATE products SET stock = stock WHERE id = ? RETURNING stock      │
//! │                                                                         │
//! │  • the statement takes the database write lock (or waits for it up    │
//! │    to busy_timeout)                                                    │
//! │  • the lock is held until the surrounding transaction ends            │
//! │  • the returned value is the latest committed stock plus whatever     │
//! │    this transaction has already written                                │
//! │  • no row → the product does not exist                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

/// Connection-level stock access used by the inventory engine.
#[derive(Debug, Clone, Copy)]
pub struct StockLedger;

impl StockLedger {
    /// Reads a product's stock and holds the write lock until the
    /// transaction ends.
    ///
    /// ## Returns
    /// * `Ok(Some(stock))` - Current stock, locked
    /// * `Ok(None)` - No such product
    pub async fn lock_for_update(
        conn: &mut SqliteConnection,
        product_id: i64,
    ) -> DbResult<Option<i64>> {
        let stock: Option<i64> = sqlx::query_scalar(
            "UPDATE products SET stock = stock WHERE id = ?1 RETURNING stock",
        )
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

        debug!(product_id, ?stock, "Stock locked for update");
        Ok(stock)
    }

    /// Writes a product's new stock. The schema's `CHECK (stock >= 0)`
    /// backs up the engine's own check.
    pub async fn set_stock(conn: &mut SqliteConnection, product_id: i64, stock: i64) -> DbResult<()> {
        sqlx::query("UPDATE products SET stock = ?2 WHERE id = ?1")
            .bind(product_id)
            .bind(stock)
            .execute(&mut *conn)
            .await?;

        debug!(product_id, stock, "Stock written");
        Ok(())
    }
}
