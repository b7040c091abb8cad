//! Schema migrations, embedded from `migrations/sqlite/` at build time.
//!
//! Files are applied in version order (`NNN_description.sql`), each in its
//! own transaction, and recorded in `_sqlx_migrations`. Applied files are
//! checksummed, so a shipped migration is never edited; changes go in a new
//! file with the next number.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies whatever the database has not seen yet. A no-op on an up-to-date schema.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let latest = MIGRATOR.iter().map(|m| m.version).max().unwrap_or_default();
    debug!(embedded = MIGRATOR.migrations.len(), latest, "Applying migrations");

    MIGRATOR.run(pool).await?;

    info!(schema_version = latest, "Migrations applied");
    Ok(())
}

/// `(embedded, applied)` migration counts.
///
/// Fails if the bookkeeping table does not exist, i.e. migrations never ran.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((MIGRATOR.migrations.len(), applied as usize))
}
