//! Schema checks against `information_schema`.

use sqlx::PgPool;

/// Every table keys on `bigint` and carries `timestamptz` audit columns.
#[sqlx::test(migrations = "./migrations")]
async fn test_tables_use_bigint_ids_and_timestamptz(pool: PgPool) {
    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT table_name, column_name, data_type
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND table_name IN ('users', 'videos')
           AND column_name IN ('id', 'created_at', 'updated_at')
         ORDER BY table_name, column_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 6, "both tables need id, created_at, updated_at: {rows:?}");
    for (table, column, data_type) in &rows {
        let expected = if column == "id" {
            "bigint"
        } else {
            "timestamp with time zone"
        };
        assert_eq!(data_type, expected, "{table}.{column}");
    }
}

/// Videos may outlive their owner, so `owner_id` must not be a foreign key,
/// but it is still indexed for owner lookups.
#[sqlx::test(migrations = "./migrations")]
async fn test_video_owner_is_indexed_but_unconstrained(pool: PgPool) {
    let (fk_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*)
         FROM information_schema.table_constraints
         WHERE table_schema = 'public'
           AND table_name = 'videos'
           AND constraint_type = 'FOREIGN KEY'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(fk_count, 0);

    let (indexed,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (
             SELECT 1 FROM pg_indexes
             WHERE schemaname = 'public'
               AND tablename = 'videos'
               AND indexdef LIKE '%(owner_id)%'
         )",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(indexed, "videos.owner_id should be indexed");
}

/// No `character varying` columns; text columns use `TEXT`.
#[sqlx::test(migrations = "./migrations")]
async fn test_no_varchar_columns(pool: PgPool) {
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
