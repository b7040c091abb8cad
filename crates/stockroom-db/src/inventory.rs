//! # Inventory Engine
//!
//! Records a stock movement (IN or OUT over N line items) as one atomic
//! unit of work.
//!
//! ## Unit Of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_transaction(request, initiator_id)                             │
//! │                                                                         │
//! │  0. validate_transaction_request ── fail ──► Validation (no I/O)       │
//! │  1. BEGIN                                                              │
//! │  2. INSERT header ─────────────────────────► takes the write lock      │
//! │  3. for item in request.items (caller order):                          │
//! │       a. StockLedger::lock_for_update ── none ──► ProductNotFound      │
//! │       b. apply_movement ── refuse ──► InsufficientStock/StockOverflow  │
//! │       c. StockLedger::set_stock                                        │
//! │       d. INSERT item                                                   │
//! │  4. COMMIT ── fail ──► CommitFailure                                   │
//! │                                                                         │
//! │  Any failure in 2-3 → ROLLBACK. Nothing of the request is visible.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The header insert and every locked read take SQLite's single write lock,
//! which is held until commit or rollback. Two engine calls can therefore
//! never interleave their read-modify-write of the same product; the second
//! waits up to `busy_timeout` and then fails with
//! `PersistenceFailure(Busy)`. There are no internal retries.
//!
//! If the returned future is dropped mid-flight, the sqlx `Transaction`
//! guard rolls back.
//!
//! ## Deadlines
//! A statement waiting on the write lock sits inside SQLite's busy handler,
//! where dropping the Rust future cannot reach it. Under a deadline the
//! engine therefore lowers the connection's `busy_timeout` to the time left
//! before `BEGIN`, and puts the configured value back before the connection
//! returns to the pool. Lock waits that end because of that cap are
//! reported as `DeadlineExceeded`, not `Busy`.

use std::time::{Duration, Instant};

use chrono::Utc;
use sqlx::{Connection, SqliteConnection, SqlitePool};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{DbError, DbResult, TransactionError, TransactionResult};
use crate::repository::stock::StockLedger;
use crate::repository::transaction::{insert_header, insert_item};
use stockroom_core::stock::apply_movement;
use stockroom_core::validation::{validate_id, validate_transaction_request};
use stockroom_core::CreateTransactionRequest;

/// The inventory transaction engine.
///
/// Cheap to clone; holds only the pool. Each call checks out its own
/// connection.
#[derive(Debug, Clone)]
pub struct InventoryService {
    pool: SqlitePool,
}

impl InventoryService {
    /// Creates a new InventoryService.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryService { pool }
    }

    /// Records an inventory transaction atomically.
    ///
    /// ## Returns
    /// * `Ok(header_id)` - Header, all items and all stock changes committed
    /// * `Err(TransactionError)` - Nothing was written
    #[instrument(
        skip(self, request),
        fields(kind = %request.transaction_type, items = request.items.len())
    )]
    pub async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
        initiator_id: i64,
    ) -> TransactionResult<i64> {
        self.execute(request, initiator_id, None).await
    }

    /// Same as [`create_transaction`](Self::create_transaction), but gives up
    /// if the line items are not all applied within `deadline`, counted from
    /// the call. Waiting for a pooled connection and for the write lock both
    /// count against it.
    ///
    /// Expiry rolls back and returns `Persistence(DbError::DeadlineExceeded)`.
    /// The commit itself is not cut short once it has started.
    #[instrument(
        skip(self, request),
        fields(
            kind = %request.transaction_type,
            items = request.items.len(),
            deadline_ms = millis(deadline)
        )
    )]
    pub async fn create_transaction_within(
        &self,
        request: &CreateTransactionRequest,
        initiator_id: i64,
        deadline: Duration,
    ) -> TransactionResult<i64> {
        self.execute(request, initiator_id, Some(deadline)).await
    }

    async fn execute(
        &self,
        request: &CreateTransactionRequest,
        initiator_id: i64,
        deadline: Option<Duration>,
    ) -> TransactionResult<i64> {
        validate_transaction_request(request)?;
        validate_id("initiator_id", initiator_id)?;

        let outcome = match deadline {
            Some(limit) => self.execute_within(request, initiator_id, limit).await,
            None => match self.pool.acquire().await {
                Ok(mut conn) => unit_of_work(&mut conn, request, initiator_id, None).await,
                Err(e) => Err(TransactionError::Persistence(e.into())),
            },
        };

        match &outcome {
            Ok(header_id) => info!(
                header_id,
                initiator_id,
                kind = %request.transaction_type,
                items = request.items.len(),
                "Inventory transaction committed"
            ),
            Err(TransactionError::Persistence(db_err)) => {
                error!(initiator_id, error = %db_err, "Inventory transaction aborted")
            }
            Err(TransactionError::Commit(db_err)) => {
                error!(initiator_id, error = %db_err, "Commit failed")
            }
            Err(err) => warn!(
                initiator_id,
                kind = ?err.kind(),
                product_id = ?err.product_id(),
                "Inventory transaction rejected"
            ),
        }

        outcome
    }

    async fn execute_within(
        &self,
        request: &CreateTransactionRequest,
        initiator_id: i64,
        limit: Duration,
    ) -> TransactionResult<i64> {
        let started = Instant::now();

        let mut conn = match tokio::time::timeout(limit, self.pool.acquire()).await {
            Ok(acquired) => acquired.map_err(|e| TransactionError::Persistence(e.into()))?,
            Err(_) => return Err(deadline_exceeded(limit)),
        };

        let remaining = limit.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(deadline_exceeded(limit));
        }

        let configured = lock_wait(&mut conn)
            .await
            .map_err(TransactionError::Persistence)?;
        let capped = remaining < configured;
        if capped {
            set_lock_wait(&mut conn, remaining)
                .await
                .map_err(TransactionError::Persistence)?;
            debug!(lock_wait_ms = millis(remaining), "Lock wait capped by deadline");
        }

        let budget = Budget {
            limit,
            remaining,
            capped,
        };
        let outcome = unit_of_work(&mut conn, request, initiator_id, Some(budget)).await;

        if capped {
            let restored = set_lock_wait(&mut conn, configured).await;
            if let Err(e) = restored {
                warn!(error = %e, "Could not restore busy_timeout; discarding connection");
                drop(conn.detach());
            }
        }

        outcome
    }
}

/// Time left for steps 2-3 under a deadline.
#[derive(Debug, Clone, Copy)]
struct Budget {
    limit: Duration,
    remaining: Duration,
    /// `busy_timeout` was lowered to `remaining`.
    capped: bool,
}

fn deadline_exceeded(limit: Duration) -> TransactionError {
    TransactionError::Persistence(DbError::DeadlineExceeded(limit))
}

/// BEGIN, steps 2-3, then COMMIT or ROLLBACK.
async fn unit_of_work(
    conn: &mut SqliteConnection,
    request: &CreateTransactionRequest,
    initiator_id: i64,
    budget: Option<Budget>,
) -> TransactionResult<i64> {
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| TransactionError::Persistence(e.into()))?;

    let applied = match budget {
        Some(budget) => {
            match tokio::time::timeout(budget.remaining, apply(&mut *tx, request, initiator_id))
                .await
            {
                Ok(Err(TransactionError::Persistence(DbError::Busy(_)))) if budget.capped => {
                    Err(deadline_exceeded(budget.limit))
                }
                Ok(applied) => applied,
                Err(_) => Err(deadline_exceeded(budget.limit)),
            }
        }
        None => apply(&mut *tx, request, initiator_id).await,
    };

    match applied {
        Ok(header_id) => {
            tx.commit()
                .await
                .map_err(|e| TransactionError::Commit(e.into()))?;
            Ok(header_id)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

async fn lock_wait(conn: &mut SqliteConnection) -> DbResult<Duration> {
    let ms: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
        .fetch_one(&mut *conn)
        .await?;
    Ok(Duration::from_millis(u64::try_from(ms).unwrap_or(0)))
}

async fn set_lock_wait(conn: &mut SqliteConnection, wait: Duration) -> DbResult<()> {
    // PRAGMA values cannot be bound.
    let ms = wait.as_millis().clamp(1, i32::MAX as u128);
    sqlx::query(&format!("PRAGMA busy_timeout = {ms}"))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Steps 2-3 of the unit of work: header, then each line item in order.
async fn apply(
    conn: &mut SqliteConnection,
    request: &CreateTransactionRequest,
    initiator_id: i64,
) -> TransactionResult<i64> {
    let kind = request.transaction_type;

    let header_id = insert_header(conn, kind, initiator_id, Utc::now())
        .await
        .map_err(TransactionError::Persistence)?;

    for item in &request.items {
        let current = StockLedger::lock_for_update(conn, item.product_id)
            .await
            .map_err(TransactionError::Persistence)?
            .ok_or(TransactionError::ProductNotFound {
                product_id: item.product_id,
            })?;

        let next = apply_movement(kind, current, item.quantity)
            .map_err(|e| TransactionError::from_stock(item.product_id, e))?;

        StockLedger::set_stock(conn, item.product_id, next)
            .await
            .map_err(TransactionError::Persistence)?;

        insert_item(conn, header_id, item.product_id, item.quantity)
            .await
            .map_err(TransactionError::Persistence)?;
    }

    Ok(header_id)
}

// =============================================================================
// Unit Tests
// =============================================================================
