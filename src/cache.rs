/**
 * Response Cache
 * A small TTL cache for API responses, one instance per client session
 */
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Keyed cache with a single fixed time-to-live.
///
/// Not a process-wide singleton: construct one per client session and pass
/// it by reference. Expired entries are dropped on the read that finds them.
pub struct ResponseCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V: Clone> ResponseCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The value stored under `key`, if it is still fresh.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: K, value: V) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop a single key, e.g. after a write that makes it stale.
    pub fn invalidate(&self, key: &K) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_fresh_value() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("/config", "cached".to_string());
        assert_eq!(cache.get(&"/config"), Some("cached".to_string()));
    }

    #[test]
    fn test_get_drops_expired_value() {
        // Zero TTL: everything is expired the moment it lands.
        let cache = ResponseCache::new(Duration::ZERO);
        cache.put("/config", "cached".to_string());
        assert_eq!(cache.get(&"/config"), None);
    }

    #[test]
    fn test_put_overwrites() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("/projects", 1);
        cache.put("/projects", 2);
        assert_eq!(cache.get(&"/projects"), Some(2));
    }

    #[test]
    fn test_invalidate_single_key() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("/config", 1);
        cache.put("/projects", 2);
        cache.invalidate(&"/config");
        assert_eq!(cache.get(&"/config"), None);
        assert_eq!(cache.get(&"/projects"), Some(2));
    }

    #[test]
    fn test_clear_empties_everything() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("a", 1);
        cache.put("b", 2);
        cache.clear();
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), None);
    }

    #[test]
    fn test_instances_are_independent() {
        let one = ResponseCache::new(Duration::from_secs(60));
        let two: ResponseCache<&str, i32> = ResponseCache::new(Duration::from_secs(60));
        one.put("key", 1);
        assert_eq!(two.get(&"key"), None);
    }
}
