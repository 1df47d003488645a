//! System catalog queries — schemas and table counts.

use asutp_common::models::SchemaTableCount;
use sqlx::PgConnection;

/// Names of the given schemas that exist, sorted.
pub async fn find_schemas(
    conn: &mut PgConnection,
    candidates: &[&str],
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT schema_name::text
        FROM information_schema.schemata
        WHERE schema_name = ANY($1)
        ORDER BY schema_name
        "#,
    )
    .bind(candidates)
    .fetch_all(conn)
    .await
}

/// Base-table counts grouped by schema, for the given schemas only.
pub async fn count_tables(
    conn: &mut PgConnection,
    schemas: &[&str],
) -> Result<Vec<SchemaTableCount>, sqlx::Error> {
    sqlx::query_as::<_, SchemaTableCount>(
        r#"
        SELECT
            table_schema::text AS table_schema,
            COUNT(*) AS table_count
        FROM information_schema.tables
        WHERE table_schema = ANY($1)
          AND table_type = 'BASE TABLE'
        GROUP BY table_schema
        ORDER BY table_schema
        "#,
    )
    .bind(schemas)
    .fetch_all(conn)
    .await
}
