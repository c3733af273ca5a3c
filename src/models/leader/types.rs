use serde::Deserialize;
use sqlx::FromRow;

use crate::models::groups;

#[derive(Debug, Clone, FromRow)]
pub struct Leader {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub scout_groups: String,
    pub active: bool,
    pub user_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl Leader {
    pub fn groups(&self) -> Vec<String> {
        groups::parse_groups(&self.scout_groups)
    }
}

/// Leader joined with their role assignment, for the list screen.
#[derive(Debug, Clone, FromRow)]
pub struct LeaderDisplay {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub scout_groups: String,
    pub active: bool,
    pub user_id: Option<i64>,
    pub role: String,
}

pub struct NewLeader {
    pub name: String,
    pub email: String,
    pub scout_groups: Vec<String>,
}

#[derive(Debug, Default)]
pub struct LeaderForm {
    pub name: String,
    pub email: String,
    pub scout_groups: Vec<String>,
    pub csrf_token: String,
}

impl LeaderForm {
    /// Build from decoded urlencoded pairs. The group checkboxes arrive as
    /// repeated keys, which `web::Form` cannot deserialize into a `Vec`.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = LeaderForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                "name" => form.name = value,
                "email" => form.email = value,
                "csrf_token" => form.csrf_token = value,
                "scout_groups" => form.scout_groups.push(value),
                _ => {}
            }
        }
        form
    }
}

#[derive(Debug, Deserialize)]
pub struct LinkAccountForm {
    pub user_email: String,
    pub role: String,
    pub csrf_token: String,
}

/// Outcome of linking a leader to an identity: role assignment can fail after
/// the link itself succeeded, and the operator needs to know which half needs
/// manual follow-up.
#[derive(Debug)]
pub enum LinkOutcome {
    Linked,
    LinkedRoleFailed(String),
}

/// Case-insensitive substring search on name, plus optional group filter.
pub fn filter_leaders(leaders: Vec<LeaderDisplay>, search: &str, group: &str) -> Vec<LeaderDisplay> {
    let needle = search.trim().to_lowercase();
    leaders
        .into_iter()
        .filter(|l| needle.is_empty() || l.name.to_lowercase().contains(&needle))
        .filter(|l| group.is_empty() || groups::parse_groups(&l.scout_groups).iter().any(|g| g == group))
        .collect()
}
