use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::auth::allowlist;

pub type DbPool = SqlitePool;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub async fn init_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(MIGRATIONS).execute(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Seed the admin identity (invite + user + Admin role) if the users table is
/// empty. Idempotent: an already-populated database is left untouched.
pub async fn seed_admin(
    pool: &DbPool,
    admin_email: &str,
    admin_password_hash: &str,
) -> Result<(), sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        log::info!("Database already seeded ({count} users), skipping admin seed");
        return Ok(());
    }

    let email = allowlist::normalize_email(admin_email);

    sqlx::query("INSERT OR IGNORE INTO invited_users (email) VALUES (?1)")
        .bind(&email)
        .execute(pool)
        .await?;

    let result = sqlx::query("INSERT INTO users (email, password) VALUES (?1, ?2)")
        .bind(&email)
        .bind(admin_password_hash)
        .execute(pool)
        .await?;
    let user_id = result.last_insert_rowid();

    sqlx::query("INSERT INTO roles (user_id, role) VALUES (?1, 'Admin')")
        .bind(user_id)
        .execute(pool)
        .await?;

    log::info!("Seeded admin account for {email}");
    Ok(())
}
