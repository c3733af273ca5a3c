//! Shared test infrastructure for model layer tests.
//!
//! `setup_test_db()` opens an in-memory SQLite pool pinned to a single
//! connection (each connection would otherwise get its own empty database)
//! and runs the schema migrations.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use scoutpost::db::{DbPool, MIGRATIONS};
use scoutpost::models::leader::{self, NewLeader};
use scoutpost::models::meeting::{self, NewMeeting};
use scoutpost::models::scout::{self, NewScout};

#[allow(dead_code)]
pub const ADMIN_EMAIL: &str = "admin@troop.example";
#[allow(dead_code)]
pub const ADMIN_PASS: &str = "admin123";

pub async fn setup_test_db() -> DbPool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Failed to parse test DB options")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory test DB");

    sqlx::raw_sql(MIGRATIONS)
        .execute(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

#[allow(dead_code)]
pub async fn seed_scout(pool: &DbPool, name: &str, email: &str, group: &str) -> i64 {
    scout::create(
        pool,
        &NewScout {
            name: name.to_string(),
            email: email.to_string(),
            scout_group: group.to_string(),
            notes: String::new(),
            parent_contact: String::new(),
        },
    )
    .await
    .expect("Failed to seed scout")
}

#[allow(dead_code)]
pub async fn seed_leader(pool: &DbPool, name: &str, email: &str, groups: &[&str]) -> i64 {
    leader::create(
        pool,
        &NewLeader {
            name: name.to_string(),
            email: email.to_string(),
            scout_groups: groups.iter().map(|g| g.to_string()).collect(),
        },
    )
    .await
    .expect("Failed to seed leader")
}

#[allow(dead_code)]
pub async fn seed_meeting(pool: &DbPool, date: &str, groups: &[&str], leaders: &[i64]) -> i64 {
    meeting::create(
        pool,
        &NewMeeting {
            meeting_date: date.to_string(),
            location: "Scout hall".to_string(),
            scout_groups: groups.iter().map(|g| g.to_string()).collect(),
            notes: String::new(),
            assigned_leaders: leaders.to_vec(),
        },
    )
    .await
    .expect("Failed to seed meeting")
}

#[allow(dead_code)]
pub async fn seed_user(pool: &DbPool, email: &str, password_hash: &str) -> i64 {
    scoutpost::models::user::create(pool, email, password_hash)
        .await
        .expect("Failed to seed user")
}
