//! Per-entity in-flight operation guard.
//!
//! A submission locks its entity key for the duration of the call; a second
//! submission for the same key is rejected deterministically instead of
//! racing. Keys are released in a drop guard so an error path cannot leak a
//! locked key.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Default, Clone)]
pub struct OpGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Releases the key when dropped.
pub struct OpToken {
    guard: OpGuard,
    key: String,
}

impl Drop for OpToken {
    fn drop(&mut self) {
        if let Ok(mut set) = self.guard.in_flight.lock() {
            set.remove(&self.key);
        }
    }
}

impl OpGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim a key. `None` means an identical operation is already in
    /// flight and this one should be rejected.
    pub fn begin(&self, key: &str) -> Option<OpToken> {
        let mut set = self.in_flight.lock().ok()?;
        if !set.insert(key.to_string()) {
            return None;
        }
        Some(OpToken {
            guard: self.clone(),
            key: key.to_string(),
        })
    }

    pub fn attendance_key(scout_id: i64, meeting_id: i64) -> String {
        format!("attendance:{scout_id}:{meeting_id}")
    }

    pub const RECALC_KEY: &'static str = "points:recalculate";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_for_same_key_is_rejected() {
        let guard = OpGuard::new();
        let token = guard.begin("attendance:1:2");
        assert!(token.is_some());
        assert!(guard.begin("attendance:1:2").is_none());
        assert!(guard.begin("attendance:1:3").is_some());
    }

    #[test]
    fn key_is_released_on_drop() {
        let guard = OpGuard::new();
        {
            let _token = guard.begin("points:recalculate").unwrap();
            assert!(guard.begin("points:recalculate").is_none());
        }
        assert!(guard.begin("points:recalculate").is_some());
    }
}
