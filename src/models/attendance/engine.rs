//! Attendance and points: roster assembly, marking, and the two aggregate
//! paths.
//!
//! The incremental delta applied on each mark is a best-effort cache warmer
//! for `scouts.points_total`; `recalculate_totals` (Admin-only, exposed via
//! the handlers) is the authoritative reconciliation and repairs any drift.
//! The delta path is safe only because writes for a given scout and meeting
//! are serialized through the in-flight guard; concurrent multi-client races
//! are explicitly not defended against.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::attendance::{queries, types::*};
use crate::models::meeting::Meeting;
use crate::models::scout;

/// `points_earned = base(status) + activity`, with activity clamped to ≥ 0.
pub fn compute_points(status: AttendanceStatus, activity_points: i64) -> i64 {
    status.base_points() + activity_points.max(0)
}

/// A meeting's roster: every scout in the meeting's groups, with whatever is
/// already recorded, plus the prior-points map used for delta updates.
#[derive(Debug)]
pub struct Roster {
    pub meeting: Meeting,
    pub entries: Vec<RosterEntry>,
    pub read_only: bool,
    /// points_earned previously recorded per scout, snapshotted when the
    /// roster was opened. Read-only to callers: the mark path
    /// re-reads the stored row at mark time instead of trusting a snapshot
    /// that may be minutes stale.
    pub previous_points: HashMap<i64, i64>,
}

impl Roster {
    pub async fn load(pool: &DbPool, meeting: Meeting, today: NaiveDate) -> Result<Self, AppError> {
        let scouts = scout::find_by_groups(pool, &meeting.groups()).await?;
        let records = queries::find_by_meeting(pool, meeting.id).await?;

        let by_scout: HashMap<i64, &AttendanceRecord> =
            records.iter().map(|r| (r.scout_id, r)).collect();

        let mut previous_points = HashMap::new();
        let entries = scouts
            .into_iter()
            .map(|s| match by_scout.get(&s.id) {
                Some(r) => {
                    previous_points.insert(s.id, r.points_earned);
                    RosterEntry {
                        status: r.status.clone(),
                        points_earned: r.points_earned,
                        scout: s,
                    }
                }
                None => RosterEntry {
                    status: String::new(),
                    points_earned: 0,
                    scout: s,
                },
            })
            .collect();

        let read_only = meeting.is_past(today);
        Ok(Roster {
            meeting,
            entries,
            read_only,
            previous_points,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct MarkOutcome {
    pub points_earned: i64,
    /// Applied to the scout's points_total (may be negative on re-mark).
    pub delta: i64,
}

/// Record (or re-record) attendance for one scout at one meeting.
///
/// Upserts the attendance row, then adjusts the scout's cached points_total
/// by the delta against `previous_points` (the points the stored row carried
/// just before this write), clamped at zero in the scouts table.
pub async fn record(
    pool: &DbPool,
    scout_id: i64,
    meeting_id: i64,
    status: AttendanceStatus,
    activity_points: i64,
    recorded_by: &str,
    previous_points: Option<i64>,
) -> Result<MarkOutcome, AppError> {
    let points_earned = compute_points(status, activity_points);
    queries::upsert(pool, scout_id, meeting_id, status, points_earned, recorded_by).await?;

    let delta = points_earned - previous_points.unwrap_or(0);
    if delta != 0 {
        scout::adjust_points_total(pool, scout_id, delta).await?;
    }
    Ok(MarkOutcome {
        points_earned,
        delta,
    })
}

/// Leader roll call for the current session. Accepted and displayed exactly
/// like scout attendance but never written to the database — a known,
/// permanent limitation of this version, not a bug.
#[derive(Default)]
pub struct LeaderRollCall {
    marks: Mutex<HashMap<(i64, i64), AttendanceStatus>>,
}

impl LeaderRollCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, meeting_id: i64, leader_id: i64, status: AttendanceStatus) {
        if let Ok(mut marks) = self.marks.lock() {
            marks.insert((meeting_id, leader_id), status);
        }
    }

    pub fn get(&self, meeting_id: i64, leader_id: i64) -> Option<AttendanceStatus> {
        self.marks
            .lock()
            .ok()
            .and_then(|marks| marks.get(&(meeting_id, leader_id)).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_earns_base_plus_activity() {
        assert_eq!(compute_points(AttendanceStatus::Present, 0), 1);
        assert_eq!(compute_points(AttendanceStatus::Present, 2), 3);
        assert_eq!(compute_points(AttendanceStatus::Absent, 0), 0);
        assert_eq!(compute_points(AttendanceStatus::Absent, 5), 5);
    }

    #[test]
    fn negative_activity_points_are_clamped() {
        assert_eq!(compute_points(AttendanceStatus::Present, -3), 1);
        assert_eq!(compute_points(AttendanceStatus::Absent, -1), 0);
    }

    #[test]
    fn leader_roll_call_is_memory_only() {
        let roll_call = LeaderRollCall::new();
        assert_eq!(roll_call.get(1, 7), None);
        roll_call.mark(1, 7, AttendanceStatus::Present);
        assert_eq!(roll_call.get(1, 7), Some(AttendanceStatus::Present));
        roll_call.mark(1, 7, AttendanceStatus::Absent);
        assert_eq!(roll_call.get(1, 7), Some(AttendanceStatus::Absent));
    }
}
