//! Schema-wide conventions checked against the migrated database.

use sqlx::PgPool;

/// Every `id` column is bigint.
#[sqlx::test(migrations = "../../db/migrations")]
async fn all_ids_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 3);
    for (table, data_type) in &rows {
        assert_eq!(data_type, "bigint", "Table {table}.id should be bigint");
    }
}

/// Timestamps are timestamptz; calendar dates stay plain dates.
#[sqlx::test(migrations = "../../db/migrations")]
async fn timestamp_columns_are_timestamptz(pool: PgPool) {
    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT table_name, column_name, data_type
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND column_name IN ('created_at', 'updated_at')
           AND table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, column, data_type) in &rows {
        assert_eq!(
            data_type, "timestamp with time zone",
            "{table}.{column} should be timestamptz"
        );
    }
}

/// The audit trail is append-only, so its tables carry no `updated_at`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn audit_tables_have_no_updated_at(pool: PgPool) {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND column_name = 'updated_at'
           AND table_name IN ('audit_events', 'audit_changes')",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(rows.is_empty(), "Unexpected updated_at on {rows:?}");
}

/// TEXT is used instead of VARCHAR.
#[sqlx::test(migrations = "../../db/migrations")]
async fn no_varchar_columns(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, column_name
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND data_type = 'character varying'
           AND table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(rows.is_empty(), "Found VARCHAR columns: {rows:?}");
}

/// Every foreign key column has an index.
#[sqlx::test(migrations = "../../db/migrations")]
async fn all_fks_have_indexes(pool: PgPool) {
    let fk_columns: Vec<(String, String)> = sqlx::query_as(
        "SELECT DISTINCT tc.table_name, kcu.column_name
         FROM information_schema.table_constraints tc
         JOIN information_schema.key_column_usage kcu
             ON tc.constraint_name = kcu.constraint_name
             AND tc.table_schema = kcu.table_schema
         WHERE tc.constraint_type = 'FOREIGN KEY'
           AND tc.table_schema = 'public'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(fk_columns.len(), 2);
    for (table, column) in &fk_columns {
        let has_index: (bool,) = sqlx::query_as(&format!(
            "SELECT EXISTS (
                SELECT 1 FROM pg_indexes
                WHERE schemaname = 'public'
                  AND tablename = '{table}'
                  AND indexdef LIKE '%({column})%'
            )"
        ))
        .fetch_one(&pool)
        .await
        .unwrap();

        assert!(has_index.0, "FK column {table}.{column} has no index");
    }
}
