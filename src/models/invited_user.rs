use serde::Deserialize;
use sqlx::FromRow;

use crate::auth::allowlist::normalize_email;
use crate::db::DbPool;
use crate::errors::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct InvitedUser {
    pub id: i64,
    pub email: String,
    pub invited_at: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteForm {
    pub email: String,
    pub csrf_token: String,
}

pub async fn find_all(pool: &DbPool) -> Result<Vec<InvitedUser>, AppError> {
    let invites = sqlx::query_as::<_, InvitedUser>(
        "SELECT id, email, invited_at FROM invited_users ORDER BY email ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(invites)
}

/// Add an email to the allowlist. The email is normalized before storage;
/// the unique index rejects duplicates.
pub async fn add(pool: &DbPool, email: &str) -> Result<i64, AppError> {
    let result = sqlx::query("INSERT INTO invited_users (email) VALUES (?1)")
        .bind(normalize_email(email))
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn remove(pool: &DbPool, id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM invited_users WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
