use crate::db::DbPool;
use crate::errors::AppError;

/// The active role for an identity, if one is assigned.
pub async fn find_by_user_id(pool: &DbPool, user_id: i64) -> Result<Option<String>, AppError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT role FROM roles WHERE user_id = ?1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(role,)| role))
}

/// Assign (or replace) the role for an identity.
pub async fn assign(pool: &DbPool, user_id: i64, role: &str) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO roles (user_id, role) VALUES (?1, ?2) \
         ON CONFLICT(user_id) DO UPDATE SET role = excluded.role, \
             assigned_at = strftime('%Y-%m-%dT%H:%M:%S', 'now')",
    )
    .bind(user_id)
    .bind(role)
    .execute(pool)
    .await?;
    Ok(())
}
