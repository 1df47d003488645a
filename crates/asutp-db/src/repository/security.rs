//! Security repository — roles and active users.

use asutp_common::models::{ActiveUser, RoleSummary};
use sqlx::PgConnection;

/// List all roles, highest priority first.
pub async fn list_roles(conn: &mut PgConnection) -> Result<Vec<RoleSummary>, sqlx::Error> {
    sqlx::query_as::<_, RoleSummary>(
        "SELECT code::text AS code, name::text AS name FROM security.roles ORDER BY priority DESC",
    )
    .fetch_all(conn)
    .await
}

/// List active users with their role names joined by `", "`.
pub async fn list_active_users(conn: &mut PgConnection) -> Result<Vec<ActiveUser>, sqlx::Error> {
    sqlx::query_as::<_, ActiveUser>(
        r#"
        SELECT
            u.username::text AS username,
            u.full_name::text AS full_name,
            STRING_AGG(r.name::text, ', ') AS roles
        FROM security.users u
        LEFT JOIN security.user_roles ur ON u.id = ur.user_id
        LEFT JOIN security.roles r ON ur.role_id = r.id
        WHERE u.is_active = true
        GROUP BY u.username, u.full_name
        ORDER BY u.username
        "#,
    )
    .fetch_all(conn)
    .await
}
