//! Concurrent engine calls against a file-backed database with a real
//! multi-connection pool.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use stockroom_core::{CategoryRequest, CreateTransactionRequest, Gender, ProductRequest, ProfileInput};
use sqlx::pool::PoolConnection;
use sqlx::Sqlite;
use stockroom_db::{Database, DbConfig, DbError, TransactionError, TransactionErrorKind};

struct ScratchDb {
    path: PathBuf,
}

impl ScratchDb {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("stockroom-{}.db", uuid::Uuid::new_v4()));
        ScratchDb { path }
    }

    fn config(&self) -> DbConfig {
        DbConfig::new(&self.path)
            .max_connections(8)
            .busy_timeout(Duration::from_secs(30))
    }

    /// Two connections: one for a lock holder, one for the engine.
    fn two_connections(&self, busy_timeout: Duration) -> DbConfig {
        DbConfig::new(&self.path)
            .max_connections(2)
            .busy_timeout(busy_timeout)
    }
}

impl Drop for ScratchDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// Returns (user_id, product_id) with the product stocked to `stock`.
async fn seed(db: &Database, stock: i64) -> (i64, i64) {
    let user = db
        .users()
        .insert(
            &ProfileInput {
                first_name: "Dewi".to_string(),
                last_name: "Kusuma".to_string(),
                email: "dewi@example.com".to_string(),
                password: "unused".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1988, 11, 21).unwrap(),
                gender: Gender::Female,
            },
            "hash",
        )
        .await
        .unwrap();

    let category = db
        .categories()
        .insert(&CategoryRequest {
            name: "Hardware".to_string(),
            description: "Tools".to_string(),
        })
        .await
        .unwrap();

    let product = db
        .products()
        .insert(&ProductRequest {
            name: "Hammer".to_string(),
            description: "500g claw hammer".to_string(),
            image_url: "https://img.example.com/hammer.png".to_string(),
            category_id: category.id,
        })
        .await
        .unwrap();

    db.inventory()
        .create_transaction(&CreateTransactionRequest::inbound([(product.id, stock)]), user.id)
        .await
        .unwrap();

    (user.id, product.id)
}

/// Checks out a connection and takes the write lock on it.
async fn hold_write_lock(db: &Database) -> PoolConnection<Sqlite> {
    let mut conn = db.pool().acquire().await.unwrap();
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await.unwrap();
    conn
}

async fn release_write_lock(mut conn: PoolConnection<Sqlite>) {
    sqlx::query("ROLLBACK").execute(&mut *conn).await.unwrap();
}

async fn counts(db: &Database) -> (i64, i64) {
    let transactions = db.transactions();
    (
        transactions.count_headers().await.unwrap(),
        transactions.count_items().await.unwrap(),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_single_unit_outbound_never_oversells() {
    let scratch = ScratchDb::new();
    let db = Database::new(scratch.config()).await.unwrap();

    const STOCK: i64 = 10;
    const REQUESTS: usize = 25;

    let (user_id, product_id) = seed(&db, STOCK).await;

    let mut handles = Vec::with_capacity(REQUESTS);
    for _ in 0..REQUESTS {
        let service = db.inventory();
        handles.push(tokio::spawn(async move {
            service
                .create_transaction(&CreateTransactionRequest::outbound([(product_id, 1)]), user_id)
                .await
        }));
    }

    let mut succeeded = 0;
    let mut insufficient = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(TransactionError::InsufficientStock { available, requested, .. }) => {
                assert_eq!(available, 0);
                assert_eq!(requested, 1);
                insufficient += 1;
            }
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }

    assert_eq!(succeeded, STOCK as usize);
    assert_eq!(insufficient, REQUESTS - STOCK as usize);

    let product = db.products().get_by_id(product_id).await.unwrap().unwrap();
    assert_eq!(product.stock, 0);

    // One IN header from seeding plus one per successful OUT.
    let history = db.transactions().get_by_initiator(user_id).await.unwrap();
    assert_eq!(history.len(), 1 + STOCK as usize);
    let net: i64 = history.iter().map(|r| r.net_change_for(product_id)).sum();
    assert_eq!(net, 0);

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mixed_requests_conserve_stock() {
    let scratch = ScratchDb::new();
    let db = Database::new(scratch.config()).await.unwrap();

    let (user_id, product_id) = seed(&db, 20).await;

    let mut handles = Vec::new();
    for i in 0..30i64 {
        let service = db.inventory();
        let request = if i % 3 == 0 {
            CreateTransactionRequest::inbound([(product_id, 2)])
        } else {
            CreateTransactionRequest::outbound([(product_id, 1), (product_id, 1)])
        };
        handles.push(tokio::spawn(async move {
            let outcome = service.create_transaction(&request, user_id).await;
            (request, outcome)
        }));
    }

    let mut expected = 20i64;
    for handle in handles {
        let (request, outcome) = handle.await.unwrap();
        match outcome {
            Ok(_) => {
                let qty: i64 = request.items.iter().map(|i| i.quantity).sum();
                expected += match request.transaction_type {
                    stockroom_core::TransactionType::In => qty,
                    stockroom_core::TransactionType::Out => -qty,
                };
            }
            Err(err) => assert_eq!(err.kind(), TransactionErrorKind::InsufficientStock),
        }
    }

    let product = db.products().get_by_id(product_id).await.unwrap().unwrap();
    assert!(product.stock >= 0);
    assert_eq!(product.stock, expected);

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deadline_cuts_lock_wait_short_and_rolls_back() {
    let scratch = ScratchDb::new();
    let db = Database::new(scratch.two_connections(Duration::from_secs(30)))
        .await
        .unwrap();

    let (user_id, product_id) = seed(&db, 10).await;
    let before = counts(&db).await;

    let holder = hold_write_lock(&db).await;

    let started = Instant::now();
    let err = db
        .inventory()
        .create_transaction_within(
            &CreateTransactionRequest::outbound([(product_id, 3)]),
            user_id,
            Duration::from_millis(300),
        )
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err.kind(), TransactionErrorKind::PersistenceFailure);
    assert!(
        matches!(err, TransactionError::Persistence(DbError::DeadlineExceeded(limit)) if limit == Duration::from_millis(300)),
        "{err}"
    );
    assert!(elapsed < Duration::from_secs(5), "returned after {elapsed:?}");

    release_write_lock(holder).await;

    assert_eq!(counts(&db).await, before);
    assert_eq!(db.products().get_by_id(product_id).await.unwrap().unwrap().stock, 10);

    // Both pooled connections are back on the configured lock wait.
    let mut a = db.pool().acquire().await.unwrap();
    let mut b = db.pool().acquire().await.unwrap();
    for conn in [&mut a, &mut b] {
        let busy_ms: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(busy_ms, 30_000);
    }
    drop((a, b));

    db.inventory()
        .create_transaction(&CreateTransactionRequest::outbound([(product_id, 3)]), user_id)
        .await
        .unwrap();
    assert_eq!(db.products().get_by_id(product_id).await.unwrap().unwrap().stock, 7);

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lock_held_past_busy_timeout_is_busy() {
    let scratch = ScratchDb::new();
    let db = Database::new(scratch.two_connections(Duration::from_millis(200)))
        .await
        .unwrap();

    let (user_id, product_id) = seed(&db, 10).await;
    let before = counts(&db).await;

    let holder = hold_write_lock(&db).await;

    let started = Instant::now();
    let err = db
        .inventory()
        .create_transaction(&CreateTransactionRequest::outbound([(product_id, 3)]), user_id)
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    release_write_lock(holder).await;

    assert_eq!(err.kind(), TransactionErrorKind::PersistenceFailure);
    assert!(matches!(err, TransactionError::Persistence(DbError::Busy(_))), "{err}");
    assert!(elapsed >= Duration::from_millis(150), "gave up after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "returned after {elapsed:?}");

    assert_eq!(counts(&db).await, before);
    assert_eq!(db.products().get_by_id(product_id).await.unwrap().unwrap().stock, 10);

    db.close().await;
}
