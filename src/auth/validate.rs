use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::groups;

/// RFC-shape check, not a full RFC 5322 parser: something@something.tld.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Field-level validation errors collected before a form is submitted.
/// A form with a non-empty error set is never sent to the database.
#[derive(Debug, Clone, Default)]
pub struct FormErrors(Vec<(String, String)>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: String) {
        self.0.push((field.to_string(), message));
    }

    /// Record an error for a field if the check produced one.
    pub fn check(&mut self, field: &str, result: Option<String>) {
        if let Some(message) = result {
            self.add(field, message);
        }
    }

    /// First error message for a field, for display next to its input.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an email address shape, max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    if !EMAIL_RE.is_match(trimmed) {
        return Some("Email must be a valid address".to_string());
    }
    None
}

/// Validate email uniqueness against the already-fetched collection.
/// `exclude_id` skips the record being edited.
pub fn validate_email_unique(
    email: &str,
    existing: &[(i64, String)],
    exclude_id: Option<i64>,
) -> Option<String> {
    let normalized = crate::auth::allowlist::normalize_email(email);
    let taken = existing
        .iter()
        .any(|(id, e)| Some(*id) != exclude_id && e.to_lowercase() == normalized);
    if taken {
        Some("That email is already in use".to_string())
    } else {
        None
    }
}

/// Validate a group set: non-empty, every entry from the closed group set.
pub fn validate_groups(selected: &[String]) -> Option<String> {
    if selected.is_empty() {
        return Some("Select at least one group".to_string());
    }
    for group in selected {
        if !groups::VALID_GROUPS.contains(&group.as_str()) {
            return Some(format!("Unknown group: {group}"));
        }
    }
    None
}

/// Validate a meeting date: must parse as YYYY-MM-DD and be today or later.
pub fn validate_meeting_date(date: &str, today: NaiveDate) -> Option<String> {
    let parsed = match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => d,
        Err(_) => return Some("Date must be in YYYY-MM-DD format".to_string()),
    };
    if parsed < today {
        return Some("Date must be today or in the future".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(validate_email("kim@troop.example").is_none());
        assert!(validate_email("kim@troop").is_some());
        assert!(validate_email("not-an-email").is_some());
        assert!(validate_email("").is_some());
    }

    #[test]
    fn email_unique_is_case_insensitive_and_skips_self() {
        let existing = vec![(1, "kim@troop.example".to_string())];
        assert!(validate_email_unique("KIM@troop.example", &existing, None).is_some());
        assert!(validate_email_unique("KIM@troop.example", &existing, Some(1)).is_none());
        assert!(validate_email_unique("other@troop.example", &existing, None).is_none());
    }

    #[test]
    fn meeting_date_yesterday_rejected_today_accepted() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        assert!(validate_meeting_date("2026-08-27", today).is_some());
        assert!(validate_meeting_date("2026-08-28", today).is_none());
        assert!(validate_meeting_date("2026-09-01", today).is_none());
        assert!(validate_meeting_date("28/08/2026", today).is_some());
    }

    #[test]
    fn group_set_must_be_closed_and_non_empty() {
        assert!(validate_groups(&[]).is_some());
        assert!(validate_groups(&["Group 1".to_string()]).is_none());
        assert!(validate_groups(&["Group 3".to_string()]).is_some());
    }
}
