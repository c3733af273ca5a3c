use serde::Deserialize;
use sqlx::FromRow;

use crate::models::groups;

#[derive(Debug, Clone, FromRow)]
pub struct Scout {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub scout_group: String,
    pub points_total: i64,
    pub notes: String,
    pub parent_contact: String,
    pub created_at: String,
    pub updated_at: String,
}

/// New scout data for creation.
pub struct NewScout {
    pub name: String,
    pub email: String,
    pub scout_group: String,
    pub notes: String,
    pub parent_contact: String,
}

/// Form data from create/edit scout forms.
#[derive(Debug, Deserialize)]
pub struct ScoutForm {
    pub name: String,
    pub email: String,
    pub scout_group: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub parent_contact: String,
    pub csrf_token: String,
}

/// Case-insensitive substring search on name, plus optional group filter.
/// Applied client-side to the full fetched collection.
pub fn filter_scouts(scouts: Vec<Scout>, search: &str, group: &str) -> Vec<Scout> {
    let needle = search.trim().to_lowercase();
    scouts
        .into_iter()
        .filter(|s| needle.is_empty() || s.name.to_lowercase().contains(&needle))
        .filter(|s| group.is_empty() || s.scout_group == group)
        .collect()
}

/// Group scouts by scout group, in the closed set's order.
pub fn group_by_scout_group(scouts: Vec<Scout>) -> Vec<(String, Vec<Scout>)> {
    groups::VALID_GROUPS
        .iter()
        .map(|g| {
            let members: Vec<Scout> = scouts
                .iter()
                .filter(|s| s.scout_group == *g)
                .cloned()
                .collect();
            (g.to_string(), members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect()
}
