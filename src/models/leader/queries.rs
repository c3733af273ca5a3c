use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{groups, role};

use super::types::{Leader, LeaderDisplay, LinkOutcome, NewLeader};

const SELECT_LEADER: &str = "SELECT id, name, email, scout_groups, active, user_id, \
                             created_at, updated_at FROM leaders";

const SELECT_LEADER_DISPLAY: &str = "\
    SELECT l.id, l.name, l.email, l.scout_groups, l.active, l.user_id, \
           COALESCE(r.role, '') AS role \
    FROM leaders l \
    LEFT JOIN roles r ON r.user_id = l.user_id";

pub async fn find_all(pool: &DbPool) -> Result<Vec<LeaderDisplay>, AppError> {
    let leaders =
        sqlx::query_as::<_, LeaderDisplay>(&format!("{SELECT_LEADER_DISPLAY} ORDER BY l.name ASC"))
            .fetch_all(pool)
            .await?;
    Ok(leaders)
}

/// Active leaders only, for meeting assignment dropdowns.
pub async fn find_active(pool: &DbPool) -> Result<Vec<Leader>, AppError> {
    let leaders =
        sqlx::query_as::<_, Leader>(&format!("{SELECT_LEADER} WHERE active = 1 ORDER BY name ASC"))
            .fetch_all(pool)
            .await?;
    Ok(leaders)
}

pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Leader>, AppError> {
    let leader = sqlx::query_as::<_, Leader>(&format!("{SELECT_LEADER} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(leader)
}

pub async fn create(pool: &DbPool, new: &NewLeader) -> Result<i64, AppError> {
    let result = sqlx::query("INSERT INTO leaders (name, email, scout_groups) VALUES (?1, ?2, ?3)")
        .bind(&new.name)
        .bind(&new.email)
        .bind(groups::join_groups(&new.scout_groups))
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update(pool: &DbPool, id: i64, new: &NewLeader) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE leaders SET name = ?1, email = ?2, scout_groups = ?3, \
         updated_at = strftime('%Y-%m-%dT%H:%M:%S', 'now') WHERE id = ?4",
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(groups::join_groups(&new.scout_groups))
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Soft-delete a leader and cascade: the leader stays on historical records
/// but is removed from every meeting's assigned set. Both steps commit
/// together.
pub async fn deactivate(pool: &DbPool, id: i64) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE leaders SET active = 0, \
         updated_at = strftime('%Y-%m-%dT%H:%M:%S', 'now') WHERE id = ?1",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM meeting_leaders WHERE leader_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Link a leader record to an authenticated identity and assign a role.
///
/// Two steps, deliberately not atomic across the role assignment: if the link
/// succeeds but the role write fails, the link is kept and the failure is
/// reported distinctly so the operator can finish the role assignment by hand.
pub async fn link_account(
    pool: &DbPool,
    leader_id: i64,
    user_id: i64,
    role_name: &str,
) -> Result<LinkOutcome, AppError> {
    sqlx::query(
        "UPDATE leaders SET user_id = ?1, \
         updated_at = strftime('%Y-%m-%dT%H:%M:%S', 'now') WHERE id = ?2",
    )
    .bind(user_id)
    .bind(leader_id)
    .execute(pool)
    .await?;

    match role::assign(pool, user_id, role_name).await {
        Ok(()) => Ok(LinkOutcome::Linked),
        Err(e) => {
            log::error!("Leader {leader_id} linked to user {user_id}, but role assignment failed: {e}");
            Ok(LinkOutcome::LinkedRoleFailed(e.to_string()))
        }
    }
}
