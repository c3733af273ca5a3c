//! Versioned cache stores for the offline shell.
//!
//! Cached responses are a performance optimization, not a correctness-critical
//! store: writers never assume exclusive access and races between two writers
//! of the same key resolve as last write wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn ok(content_type: &str, body: Vec<u8>) -> Self {
        CachedResponse {
            status: 200,
            content_type: content_type.to_string(),
            body,
        }
    }

    /// Empty response returned when a non-navigation request fails with no
    /// cached copy.
    pub fn offline_timeout() -> Self {
        CachedResponse {
            status: 408,
            content_type: "text/plain; charset=utf-8".to_string(),
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// One named cache store: URL → response.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: Mutex<HashMap<String, CachedResponse>>,
}

impl CacheStore {
    pub fn get(&self, url: &str) -> Option<CachedResponse> {
        self.entries.lock().ok()?.get(url).cloned()
    }

    /// Fire-and-forget write; last write wins.
    pub fn put(&self, url: &str, response: CachedResponse) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(url.to_string(), response);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registry of named stores. Bumping the version name (and purging) is the
/// only eviction mechanism; entries have no TTL.
#[derive(Debug, Default)]
pub struct CacheRegistry {
    stores: Mutex<HashMap<String, Arc<CacheStore>>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store by name, creating it if absent.
    pub fn open(&self, name: &str) -> Arc<CacheStore> {
        let mut stores = self.stores.lock().expect("cache registry poisoned");
        stores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(CacheStore::default()))
            .clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.stores
            .lock()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Delete every store whose name differs from `keep`. Returns the names
    /// of the deleted stores.
    pub fn purge_except(&self, keep: &str) -> Vec<String> {
        let mut stores = self.stores.lock().expect("cache registry poisoned");
        let stale: Vec<String> = stores.keys().filter(|k| *k != keep).cloned().collect();
        for name in &stale {
            stores.remove(name);
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let store = CacheStore::default();
        store.put("/a", CachedResponse::ok("text/plain", b"one".to_vec()));
        store.put("/a", CachedResponse::ok("text/plain", b"two".to_vec()));
        assert_eq!(store.get("/a").unwrap().body, b"two");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn purge_keeps_only_current_version() {
        let registry = CacheRegistry::new();
        registry.open("scout-v3");
        registry.open("scout-v4");
        let deleted = registry.purge_except("scout-v4");
        assert_eq!(deleted, vec!["scout-v3".to_string()]);
        assert_eq!(registry.names(), vec!["scout-v4".to_string()]);
    }
}
