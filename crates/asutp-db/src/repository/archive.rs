//! Archive repository — `archive.historical_data` and its partitions.

use asutp_common::models::ArchiveSummary;
use sqlx::PgConnection;

/// Record count and time span of the archive.
pub async fn summarize(conn: &mut PgConnection) -> Result<ArchiveSummary, sqlx::Error> {
    sqlx::query_as::<_, ArchiveSummary>(
        r#"
        SELECT
            COUNT(*) AS total_records,
            MIN("timestamp")::text AS oldest,
            MAX("timestamp")::text AS newest
        FROM archive.historical_data
        "#,
    )
    .fetch_one(conn)
    .await
}

/// Partition tables of `historical_data`, by name.
pub async fn list_partitions(conn: &mut PgConnection) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT tablename::text
        FROM pg_tables
        WHERE schemaname = 'archive'
          AND tablename LIKE 'historical_data_%'
        ORDER BY tablename
        "#,
    )
    .fetch_all(conn)
    .await
}
