use serde::Deserialize;
use sqlx::FromRow;

use crate::db::DbPool;
use crate::errors::AppError;

/// Internal user struct for authentication — includes password hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

/// Find a user by normalized email for authentication.
pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password, created_at FROM users WHERE email = ?1 COLLATE NOCASE",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Create a user account, returning its id.
pub async fn create(pool: &DbPool, email: &str, password_hash: &str) -> Result<i64, AppError> {
    let result = sqlx::query("INSERT INTO users (email, password) VALUES (?1, ?2)")
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}
