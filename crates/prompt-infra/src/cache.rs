//! In-memory `CachePort` implementation (spec.md §4.15 supplement).
//! A single mutex-guarded map, mirroring the teacher's pattern of
//! wrapping shared mutable state behind one lock rather than
//! fine-grained per-entry locking — acceptable here since entries are
//! small JSON values and contention is limited to one process.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use prompt_core::CachePort;

struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
    version: Option<String>,
}

pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Stores `value` under `key` tagged with `version`, so a later
    /// `invalidate_by_version` call can drop it.
    pub fn set_with_version(&self, key: &str, value: serde_json::Value, ttl_seconds: u64, version: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
                version: Some(version.to_string()),
            },
        );
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CachePort for InMemoryCache {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: serde_json::Value, ttl_seconds: u64) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
                version: None,
            },
        );
    }

    fn invalidate_by_version(&self, version: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|_, entry| entry.version.as_deref() != Some(version));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get_returns_the_stored_value() {
        let cache = InMemoryCache::new();
        cache.set("k", json!({"a": 1}), 60);
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));
    }

    #[test]
    fn expired_entries_are_not_returned() {
        let cache = InMemoryCache::new();
        cache.set("k", json!("v"), 0);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn invalidate_by_version_drops_only_matching_entries() {
        let cache = InMemoryCache::new();
        cache.set_with_version("a", json!(1), 60, "v1");
        cache.set_with_version("b", json!(2), 60, "v2");
        cache.invalidate_by_version("v1");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(json!(2)));
    }

    #[test]
    fn missing_key_returns_none() {
        let cache = InMemoryCache::new();
        assert_eq!(cache.get("absent"), None);
    }
}
