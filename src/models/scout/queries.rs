use crate::db::DbPool;
use crate::errors::AppError;

use super::types::{NewScout, Scout};

const SELECT_SCOUT: &str = "SELECT id, name, email, scout_group, points_total, notes, \
                            parent_contact, created_at, updated_at FROM scouts";

pub async fn find_all(pool: &DbPool) -> Result<Vec<Scout>, AppError> {
    let scouts = sqlx::query_as::<_, Scout>(&format!("{SELECT_SCOUT} ORDER BY name ASC"))
        .fetch_all(pool)
        .await?;
    Ok(scouts)
}

pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Scout>, AppError> {
    let scout = sqlx::query_as::<_, Scout>(&format!("{SELECT_SCOUT} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(scout)
}

/// All scouts belonging to any of the given groups, for roster assembly.
pub async fn find_by_groups(pool: &DbPool, groups: &[String]) -> Result<Vec<Scout>, AppError> {
    let scouts = find_all(pool).await?;
    Ok(scouts
        .into_iter()
        .filter(|s| groups.contains(&s.scout_group))
        .collect())
}

pub async fn create(pool: &DbPool, new: &NewScout) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO scouts (name, email, scout_group, notes, parent_contact) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.scout_group)
    .bind(&new.notes)
    .bind(&new.parent_contact)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update(pool: &DbPool, id: i64, new: &NewScout) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE scouts SET name = ?1, email = ?2, scout_group = ?3, notes = ?4, \
         parent_contact = ?5, updated_at = strftime('%Y-%m-%dT%H:%M:%S', 'now') \
         WHERE id = ?6",
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.scout_group)
    .bind(&new.notes)
    .bind(&new.parent_contact)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a scout (attendance rows cascade via FK).
pub async fn delete(pool: &DbPool, id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM scouts WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Adjust the cached points total by a delta, clamped at zero.
pub async fn adjust_points_total(pool: &DbPool, id: i64, delta: i64) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE scouts SET points_total = MAX(0, points_total + ?1), \
         updated_at = strftime('%Y-%m-%dT%H:%M:%S', 'now') WHERE id = ?2",
    )
    .bind(delta)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
