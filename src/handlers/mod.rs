pub mod attendance_handlers;
pub mod auth_handlers;
pub mod dashboard;
pub mod invite_handlers;
pub mod leader_handlers;
pub mod meeting_handlers;
pub mod scout_handlers;
pub mod shell_handlers;

use serde::Deserialize;

/// Search/filter query string shared by the list screens.
#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub group: String,
}
