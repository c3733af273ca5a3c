use crate::db::DbPool;
use crate::errors::AppError;

use super::types::{AttendanceRecord, AttendanceStatus};

const SELECT_ATTENDANCE: &str = "SELECT id, scout_id, meeting_id, status, points_earned, \
                                 recorded_by, recorded_at FROM attendance";

pub async fn find_by_meeting(
    pool: &DbPool,
    meeting_id: i64,
) -> Result<Vec<AttendanceRecord>, AppError> {
    let records =
        sqlx::query_as::<_, AttendanceRecord>(&format!("{SELECT_ATTENDANCE} WHERE meeting_id = ?1"))
            .bind(meeting_id)
            .fetch_all(pool)
            .await?;
    Ok(records)
}

/// The single record for a (scout, meeting) pair, if marked.
pub async fn find_for_pair(
    pool: &DbPool,
    scout_id: i64,
    meeting_id: i64,
) -> Result<Option<AttendanceRecord>, AppError> {
    let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
        "{SELECT_ATTENDANCE} WHERE scout_id = ?1 AND meeting_id = ?2"
    ))
    .bind(scout_id)
    .bind(meeting_id)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

/// Idempotent write keyed on (scout_id, meeting_id): the new record fully
/// replaces any previous one for the pair, so re-marking never duplicates.
pub async fn upsert(
    pool: &DbPool,
    scout_id: i64,
    meeting_id: i64,
    status: AttendanceStatus,
    points_earned: i64,
    recorded_by: &str,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO attendance (scout_id, meeting_id, status, points_earned, recorded_by) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(scout_id, meeting_id) DO UPDATE SET \
             status = excluded.status, \
             points_earned = excluded.points_earned, \
             recorded_by = excluded.recorded_by, \
             recorded_at = strftime('%Y-%m-%dT%H:%M:%S', 'now')",
    )
    .bind(scout_id)
    .bind(meeting_id)
    .bind(status.as_str())
    .bind(points_earned)
    .bind(recorded_by)
    .execute(pool)
    .await?;
    Ok(())
}

/// Overwrite every scout's cached points_total with the sum of their
/// attendance rows. Returns the number of scouts updated.
pub async fn recalculate_totals(pool: &DbPool) -> Result<u64, AppError> {
    let result = sqlx::query(
        "UPDATE scouts SET points_total = COALESCE( \
             (SELECT SUM(a.points_earned) FROM attendance a WHERE a.scout_id = scouts.id), 0), \
         updated_at = strftime('%Y-%m-%dT%H:%M:%S', 'now')",
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
