use serde::Deserialize;
use sqlx::FromRow;

use crate::models::scout::Scout;

/// Per-(scout, meeting) state machine: unmarked → Present | Absent.
/// Re-marking overwrites until the meeting date has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }

    pub fn parse(s: &str) -> Option<AttendanceStatus> {
        match s {
            "Present" => Some(AttendanceStatus::Present),
            "Absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }

    /// Base points: Present earns 1, Absent earns 0.
    pub fn base_points(&self) -> i64 {
        match self {
            AttendanceStatus::Present => 1,
            AttendanceStatus::Absent => 0,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRecord {
    pub id: i64,
    pub scout_id: i64,
    pub meeting_id: i64,
    pub status: String,
    pub points_earned: i64,
    pub recorded_by: String,
    pub recorded_at: String,
}

/// One roster row: a scout eligible for the meeting plus whatever is already
/// recorded for them.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub scout: Scout,
    /// "Present", "Absent", or "" when unmarked.
    pub status: String,
    pub points_earned: i64,
}

#[derive(Debug, Deserialize)]
pub struct MarkForm {
    pub scout_id: i64,
    pub status: String,
    #[serde(default)]
    pub activity_points: i64,
    pub csrf_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaderMarkForm {
    pub leader_id: i64,
    pub status: String,
    pub csrf_token: String,
}
