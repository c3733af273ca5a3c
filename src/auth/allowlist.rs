//! Invite allowlist: the set of emails permitted to authenticate.
//!
//! Two interchangeable providers exist. The JSON provider reads the static
//! `invited-users.json` document that the earliest deployments shipped with;
//! the database provider queries the `invited_users` table. Both are
//! fail-closed: any lookup or parse error is treated as "not invited".

use serde::Deserialize;

use crate::db::DbPool;

/// Warn when the JSON list outgrows this; a list that size belongs in the
/// database provider.
pub const MAX_INVITED: usize = 10;

/// Canonical email form used everywhere an email is compared or stored.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Deserialize)]
struct InvitedUsersDoc {
    #[serde(rename = "invitedEmails", default)]
    invited_emails: Vec<String>,
}

/// Allowlist backed by a fixed JSON document (`{ "invitedEmails": [...] }`).
#[derive(Debug, Clone, Default)]
pub struct JsonAllowlist {
    emails: Vec<String>,
}

impl JsonAllowlist {
    /// Parse the JSON document. A malformed document yields an empty list,
    /// which rejects everyone.
    pub fn from_json(json: &str) -> Self {
        let emails = match serde_json::from_str::<InvitedUsersDoc>(json) {
            Ok(doc) => doc
                .invited_emails
                .iter()
                .map(|e| normalize_email(e))
                .collect::<Vec<_>>(),
            Err(e) => {
                log::error!("Could not parse invited-users list: {e}");
                Vec::new()
            }
        };
        if emails.len() > MAX_INVITED {
            log::warn!(
                "Invited list has {} users — exceeds the recommended max of {}. \
                 Consider the database-backed allowlist instead.",
                emails.len(),
                MAX_INVITED
            );
        }
        JsonAllowlist { emails }
    }

    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) => {
                log::error!("Could not load invited-users list from {path}: {e}");
                JsonAllowlist::default()
            }
        }
    }

    pub fn contains(&self, normalized_email: &str) -> bool {
        self.emails.iter().any(|e| e == normalized_email)
    }
}

/// Which allowlist backs the login gate.
#[derive(Debug, Clone)]
pub enum Allowlist {
    Json(JsonAllowlist),
    Db,
}

impl Allowlist {
    pub fn from_env() -> Self {
        match std::env::var("ALLOWLIST_PROVIDER").as_deref() {
            Ok("json") => Allowlist::Json(JsonAllowlist::load("static/invited-users.json")),
            _ => Allowlist::Db,
        }
    }

    /// Check whether an email may log in. The email is normalized before the
    /// lookup. Database errors count as a miss.
    pub async fn is_invited(&self, pool: &DbPool, email: &str) -> bool {
        let email = normalize_email(email);
        match self {
            Allowlist::Json(list) => list.contains(&email),
            Allowlist::Db => {
                let row: Result<(i64,), _> = sqlx::query_as(
                    "SELECT COUNT(*) FROM invited_users WHERE email = ?1 COLLATE NOCASE",
                )
                .bind(&email)
                .fetch_one(pool)
                .await;
                match row {
                    Ok((count,)) => count > 0,
                    Err(e) => {
                        log::error!("Allowlist lookup failed, treating as not invited: {e}");
                        false
                    }
                }
            }
        }
    }
}
