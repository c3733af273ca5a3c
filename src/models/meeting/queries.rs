use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::groups;

use super::types::{Meeting, MeetingListItem, NewMeeting};

const SELECT_MEETING: &str =
    "SELECT id, meeting_date, location, scout_groups, notes, created_at FROM meetings";

/// List query with inline subqueries for attendance count and assigned
/// leader names.
const SELECT_MEETING_LIST: &str = "\
    SELECT m.id, m.meeting_date, m.location, m.scout_groups, m.notes, \
           (SELECT COUNT(*) FROM attendance a WHERE a.meeting_id = m.id) AS attendance_count, \
           COALESCE((SELECT GROUP_CONCAT(l.name, ', ') FROM meeting_leaders ml \
                     JOIN leaders l ON l.id = ml.leader_id \
                     WHERE ml.meeting_id = m.id), '') AS leader_names \
    FROM meetings m";

pub async fn find_all(pool: &DbPool) -> Result<Vec<MeetingListItem>, AppError> {
    let meetings = sqlx::query_as::<_, MeetingListItem>(&format!(
        "{SELECT_MEETING_LIST} ORDER BY m.meeting_date DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(meetings)
}

pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Meeting>, AppError> {
    let meeting = sqlx::query_as::<_, Meeting>(&format!("{SELECT_MEETING} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(meeting)
}

/// Best-effort duplicate-date check. The UNIQUE constraint on meeting_date is
/// the backstop for the race between check and insert.
pub async fn date_taken(pool: &DbPool, date: &str, exclude_id: Option<i64>) -> Result<bool, AppError> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM meetings WHERE meeting_date = ?1 AND id != ?2",
    )
    .bind(date)
    .bind(exclude_id.unwrap_or(0))
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Attendance rows referencing this meeting. Non-zero blocks edits.
pub async fn attendance_count(pool: &DbPool, meeting_id: i64) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attendance WHERE meeting_id = ?1")
        .bind(meeting_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn find_assigned_leader_ids(pool: &DbPool, meeting_id: i64) -> Result<Vec<i64>, AppError> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        "SELECT leader_id FROM meeting_leaders WHERE meeting_id = ?1 ORDER BY leader_id ASC",
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn create(pool: &DbPool, new: &NewMeeting) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        "INSERT INTO meetings (meeting_date, location, scout_groups, notes) \
         VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&new.meeting_date)
    .bind(&new.location)
    .bind(groups::join_groups(&new.scout_groups))
    .bind(&new.notes)
    .execute(&mut *tx)
    .await?;
    let meeting_id = result.last_insert_rowid();

    for leader_id in &new.assigned_leaders {
        sqlx::query("INSERT OR IGNORE INTO meeting_leaders (meeting_id, leader_id) VALUES (?1, ?2)")
            .bind(meeting_id)
            .bind(leader_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(meeting_id)
}

/// Replace a meeting's fields and assigned-leader set. Callers must have
/// already checked that no attendance row references the meeting.
pub async fn update(pool: &DbPool, id: i64, new: &NewMeeting) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE meetings SET meeting_date = ?1, location = ?2, scout_groups = ?3, notes = ?4 \
         WHERE id = ?5",
    )
    .bind(&new.meeting_date)
    .bind(&new.location)
    .bind(groups::join_groups(&new.scout_groups))
    .bind(&new.notes)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM meeting_leaders WHERE meeting_id = ?1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    for leader_id in &new.assigned_leaders {
        sqlx::query("INSERT OR IGNORE INTO meeting_leaders (meeting_id, leader_id) VALUES (?1, ?2)")
            .bind(id)
            .bind(leader_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Delete a meeting (attendance and leader assignments cascade via FK).
pub async fn delete(pool: &DbPool, id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM meetings WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
