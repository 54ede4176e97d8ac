//! Small in-memory TTL cache, constructed explicitly and shared through `Arc`.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub ttl_secs: u64,
}

pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a clone of the value if present and not expired.
    /// Expired entries are evicted on access.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                tracing::trace!("Cache entry '{}' expired", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` and sweeps every expired entry, so keys that are never
    /// read again do not accumulate.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        if entries.len() < before {
            tracing::trace!("Swept {} expired cache entries", before - entries.len());
        }
        entries.insert(key.into(), (Instant::now(), value));
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let removed = entries.len();
        entries.clear();
        tracing::info!("Cleared {} cache entries", removed);
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let valid = entries
            .values()
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .count();
        CacheStats {
            total_entries: entries.len(),
            valid_entries: valid,
            expired_entries: entries.len() - valid,
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_fresh_values() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("google", vec![1, 2, 3]);
        assert_eq!(cache.get("google"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get("microsoft"), None);
    }

    #[test]
    fn expired_values_are_dropped() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.set("google", 1);
        assert_eq!(cache.get("google"), None);
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn set_sweeps_entries_that_are_never_read_again() {
        let cache = TtlCache::new(Duration::ZERO);
        for key in ["a", "b", "c"] {
            cache.set(key, 1);
        }
        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.expired_entries, 1);
    }

    #[test]
    fn clear_and_stats() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("a", "x".to_string());
        cache.set("b", "y".to_string());
        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 2);
        assert_eq!(stats.ttl_secs, 60);

        cache.clear();
        assert_eq!(cache.stats().total_entries, 0);
    }
}
