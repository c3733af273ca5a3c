use chrono::{Datelike, Duration, NaiveDate};
use sqlx::FromRow;

use crate::models::groups;

#[derive(Debug, Clone, FromRow)]
pub struct Meeting {
    pub id: i64,
    pub meeting_date: String,
    pub location: String,
    pub scout_groups: String,
    pub notes: String,
    pub created_at: String,
}

impl Meeting {
    pub fn groups(&self) -> Vec<String> {
        groups::parse_groups(&self.scout_groups)
    }

    /// A past meeting's roster is read-only.
    pub fn is_past(&self, today: NaiveDate) -> bool {
        match NaiveDate::parse_from_str(&self.meeting_date, "%Y-%m-%d") {
            Ok(date) => date < today,
            Err(_) => false,
        }
    }
}

/// For the meeting list page: meeting plus attendance row count and the
/// assigned leaders' names.
#[derive(Debug, Clone, FromRow)]
pub struct MeetingListItem {
    pub id: i64,
    pub meeting_date: String,
    pub location: String,
    pub scout_groups: String,
    pub notes: String,
    pub attendance_count: i64,
    pub leader_names: String,
}

pub struct NewMeeting {
    pub meeting_date: String,
    pub location: String,
    pub scout_groups: Vec<String>,
    pub notes: String,
    pub assigned_leaders: Vec<i64>,
}

#[derive(Debug, Default)]
pub struct MeetingForm {
    pub meeting_date: String,
    pub location: String,
    pub scout_groups: Vec<String>,
    pub notes: String,
    pub assigned_leaders: Vec<i64>,
    pub csrf_token: String,
}

impl MeetingForm {
    /// Build from decoded urlencoded pairs. Checkbox groups arrive as
    /// repeated keys, which `web::Form` cannot deserialize into a `Vec`.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = MeetingForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                "meeting_date" => form.meeting_date = value,
                "location" => form.location = value,
                "notes" => form.notes = value,
                "csrf_token" => form.csrf_token = value,
                "scout_groups" => form.scout_groups.push(value),
                "assigned_leaders" => {
                    if let Ok(id) = value.parse() {
                        form.assigned_leaders.push(id);
                    }
                }
                _ => {}
            }
        }
        form
    }
}

/// Meetings grouped by the Monday of their ISO week, newest week first.
/// Unparseable dates land in a trailing "Undated" bucket.
pub fn group_by_week(meetings: Vec<MeetingListItem>) -> Vec<(String, Vec<MeetingListItem>)> {
    let mut weeks: Vec<(Option<NaiveDate>, Vec<MeetingListItem>)> = Vec::new();
    for meeting in meetings {
        let monday = NaiveDate::parse_from_str(&meeting.meeting_date, "%Y-%m-%d")
            .ok()
            .map(|d| d - Duration::days(d.weekday().num_days_from_monday() as i64));
        match weeks.iter_mut().find(|(m, _)| *m == monday) {
            Some((_, bucket)) => bucket.push(meeting),
            None => weeks.push((monday, vec![meeting])),
        }
    }
    weeks.sort_by(|(a, _), (b, _)| b.cmp(a));
    weeks
        .into_iter()
        .map(|(monday, mut bucket)| {
            bucket.sort_by(|a, b| a.meeting_date.cmp(&b.meeting_date));
            let label = match monday {
                Some(d) => format!("Week of {}", d.format("%Y-%m-%d")),
                None => "Undated".to_string(),
            };
            (label, bucket)
        })
        .collect()
}
