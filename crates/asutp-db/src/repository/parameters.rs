//! Technical parameter repository — `tech_params.parameters` and
//! `tech_params.current_values`.

use asutp_common::models::{ActiveParameter, ParameterSnapshot, ParameterTypeCount, StoredValue};
use chrono::{DateTime, Utc};
use sqlx::PgConnection;

/// Parameter counts grouped by `parameter_type`.
pub async fn count_by_type(conn: &mut PgConnection) -> Result<Vec<ParameterTypeCount>, sqlx::Error> {
    sqlx::query_as::<_, ParameterTypeCount>(
        r#"
        SELECT
            parameter_type::text AS parameter_type,
            COUNT(*) AS count
        FROM tech_params.parameters
        GROUP BY parameter_type
        ORDER BY parameter_type
        "#,
    )
    .fetch_all(conn)
    .await
}

/// Count current-value records.
pub async fn count_current_values(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tech_params.current_values")
        .fetch_one(conn)
        .await?;
    Ok(row.0)
}

/// Find a parameter by tag, joined with its current value and unit symbol.
pub async fn find_snapshot(
    conn: &mut PgConnection,
    tag: &str,
) -> Result<Option<ParameterSnapshot>, sqlx::Error> {
    sqlx::query_as::<_, ParameterSnapshot>(
        r#"
        SELECT
            p.tag::text AS tag,
            p.name::text AS name,
            cv.value::text AS value,
            cv.quality::text AS quality,
            cv."timestamp"::text AS "timestamp",
            u.symbol::text AS unit
        FROM tech_params.parameters p
        LEFT JOIN tech_params.current_values cv ON p.id = cv.parameter_id
        LEFT JOIN core.units u ON p.unit_id = u.id
        WHERE p.tag = $1
        "#,
    )
    .bind(tag)
    .fetch_optional(conn)
    .await
}

/// Find a parameter's id by tag.
pub async fn find_id_by_tag(conn: &mut PgConnection, tag: &str) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT id::bigint FROM tech_params.parameters WHERE tag = $1")
        .bind(tag)
        .fetch_optional(conn)
        .await
}

/// Insert or replace the current value of a parameter.
///
/// Conflicts on `parameter_id` update value, timestamp and source, and touch
/// `updated_at`; the quality code of an existing row is kept.
pub async fn upsert_current_value(
    conn: &mut PgConnection,
    parameter_id: i64,
    value: f64,
    quality: i32,
    timestamp: DateTime<Utc>,
    source: &str,
) -> Result<StoredValue, sqlx::Error> {
    sqlx::query_as::<_, StoredValue>(
        r#"
        INSERT INTO tech_params.current_values
            (parameter_id, value, quality, "timestamp", source)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (parameter_id)
        DO UPDATE SET
            value = EXCLUDED.value,
            "timestamp" = EXCLUDED."timestamp",
            source = EXCLUDED.source,
            updated_at = CURRENT_TIMESTAMP
        RETURNING value::text AS value, "timestamp"::text AS "timestamp"
        "#,
    )
    .bind(parameter_id)
    .bind(value)
    .bind(quality)
    .bind(timestamp)
    .bind(source)
    .fetch_one(conn)
    .await
}

/// Overwrite the current value of the parameter with `tag`. Returns rows touched.
pub async fn update_value_by_tag(
    conn: &mut PgConnection,
    tag: &str,
    value: f64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE tech_params.current_values
        SET value = $1, "timestamp" = CURRENT_TIMESTAMP
        WHERE parameter_id = (
            SELECT id FROM tech_params.parameters
            WHERE tag = $2 LIMIT 1
        )
        "#,
    )
    .bind(value)
    .bind(tag)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Active parameters with their current values, bounded by `limit`.
pub async fn list_active(
    conn: &mut PgConnection,
    limit: u32,
) -> Result<Vec<ActiveParameter>, sqlx::Error> {
    sqlx::query_as::<_, ActiveParameter>(
        r#"
        SELECT
            p.tag::text AS tag,
            cv.value::text AS value,
            cv."timestamp"::text AS "timestamp"
        FROM tech_params.parameters p
        LEFT JOIN tech_params.current_values cv ON p.id = cv.parameter_id
        WHERE p.is_active = true
        LIMIT $1
        "#,
    )
    .bind(i64::from(limit))
    .fetch_all(conn)
    .await
}
