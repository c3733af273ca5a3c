//! Memoized role lookup: one database round trip per identity, shared by
//! concurrent callers.
//!
//! The map is guarded by a `tokio::sync::Mutex` held across the fetch, so a
//! second caller for the same user awaits the first caller's lookup instead of
//! issuing a duplicate query (single-flight). Only successful lookups are
//! memoized; a lookup error behaves as "no role" for this call and the next
//! caller retries.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::db::DbPool;
use crate::models::role;

#[derive(Default)]
pub struct RoleCache {
    resolved: Mutex<HashMap<i64, Option<String>>>,
}

impl RoleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the role for a user, hitting the database at most once per
    /// user for the lifetime of this cache. `None` means no role is assigned
    /// (or the lookup failed), and every elevated capability check fails.
    pub async fn resolve(&self, pool: &DbPool, user_id: i64) -> Option<String> {
        let mut resolved = self.resolved.lock().await;
        if let Some(role) = resolved.get(&user_id) {
            return role.clone();
        }
        match role::find_by_user_id(pool, user_id).await {
            Ok(role) => {
                resolved.insert(user_id, role.clone());
                role
            }
            Err(e) => {
                log::error!("Role lookup failed for user {user_id}, treating as no role: {e}");
                None
            }
        }
    }

    /// Drop the memoized role for a user, e.g. after a role assignment.
    pub async fn invalidate(&self, user_id: i64) {
        self.resolved.lock().await.remove(&user_id);
    }
}
