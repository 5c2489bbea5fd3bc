//! Persistence for bids and their audit trail.

use serde::Serialize;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// Migration state and row counts of the bid tables.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaStatus {
    /// Highest successfully applied migration version.
    pub latest_migration: Option<i64>,
    /// Migrations shipped with this build that the database has not applied.
    pub pending_migrations: i64,
    pub bids: i64,
    pub audit_events: i64,
}

impl SchemaStatus {
    pub fn is_current(&self) -> bool {
        self.pending_migrations == 0
    }
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply any pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Read migration progress and the size of the bid and audit tables.
///
/// Fails if the migrations table or the bid tables do not exist yet.
pub async fn schema_status(pool: &DbPool) -> Result<SchemaStatus, sqlx::Error> {
    let (applied, latest_migration): (i64, Option<i64>) =
        sqlx::query_as("SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success")
            .fetch_one(pool)
            .await?;

    let (bids, audit_events): (i64, i64) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM bids), (SELECT COUNT(*) FROM audit_events)",
    )
    .fetch_one(pool)
    .await?;

    let shipped = MIGRATOR.iter().count() as i64;

    Ok(SchemaStatus {
        latest_migration,
        pending_migrations: (shipped - applied).max(0),
        bids,
        audit_events,
    })
}
