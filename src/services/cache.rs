//! In-process result cache for the search pipeline.
//!
//! Process-local by design: each instance keeps its own map, entries are
//! lost on restart and are not shared across horizontally scaled instances.
//! TTL is checked on read; capacity is enforced on write by evicting the
//! oldest-inserted entry (insertion order, not LRU).

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::services::search::JobSearchResponse;

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: crate::constants::cache::MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_entries: usize,
    pub keys: Vec<String>,
}

struct CacheEntry {
    payload: JobSearchResponse,
    stored_at: Instant,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    // Insertion order; may hold keys already expired out of `entries`.
    order: VecDeque<String>,
}

pub struct SearchCache {
    inner: Mutex<CacheInner>,
    max_entries: usize,
}

impl SearchCache {
    #[must_use]
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            max_entries: settings.max_entries.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached payload when present and younger than `ttl`.
    /// An expired entry is dropped on the way out; a miss is not an error.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<JobSearchResponse> {
        let mut inner = self.lock();

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.stored_at.elapsed() >= ttl,
            None => return None,
        };

        if expired {
            inner.entries.remove(key);
            // Drop the order slot too, otherwise a later re-insert of the
            // same key would leave a duplicate at the front of the queue.
            inner.order.retain(|queued| queued != key);
            debug!(key, "Evicted expired search cache entry");
            return None;
        }

        inner.entries.get(key).map(|entry| entry.payload.clone())
    }

    /// Inserts or overwrites an entry, evicting the oldest-inserted entry
    /// first when the cache is full. Overwriting refreshes the timestamp
    /// but keeps the key's original insertion position.
    pub fn set(&self, key: &str, payload: JobSearchResponse) {
        let mut inner = self.lock();

        if !inner.entries.contains_key(key) {
            while inner.entries.len() >= self.max_entries {
                let Some(oldest) = inner.order.pop_front() else {
                    break;
                };
                // Skip keys that already expired out of the map.
                if inner.entries.remove(&oldest).is_some() {
                    debug!(key = %oldest, "Evicted oldest search cache entry");
                }
            }
            inner.order.push_back(key.to_string());
        }

        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            size: inner.entries.len(),
            max_entries: self.max_entries,
            keys: inner.entries.keys().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::search::JobSearchResponse;

    fn payload(marker: u64) -> JobSearchResponse {
        JobSearchResponse {
            search_time_ms: marker,
            ..JobSearchResponse::empty()
        }
    }

    #[test]
    fn round_trip_within_ttl() {
        let cache = SearchCache::new(CacheSettings::default());
        cache.set("k", payload(7));

        let hit = cache.get("k", Duration::from_secs(60)).expect("cache hit");
        assert_eq!(hit.search_time_ms, 7);
    }

    #[test]
    fn expired_entry_is_a_miss_and_gets_dropped() {
        let cache = SearchCache::new(CacheSettings::default());
        cache.set("k", payload(1));

        assert!(cache.get("k", Duration::ZERO).is_none());
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn eviction_removes_exactly_the_oldest_inserted_entry() {
        let cache = SearchCache::new(CacheSettings { max_entries: 3 });
        cache.set("a", payload(1));
        cache.set("b", payload(2));
        cache.set("c", payload(3));
        cache.set("d", payload(4));

        let ttl = Duration::from_secs(60);
        assert!(cache.get("a", ttl).is_none());
        assert!(cache.get("b", ttl).is_some());
        assert!(cache.get("c", ttl).is_some());
        assert!(cache.get("d", ttl).is_some());
        assert_eq!(cache.stats().size, 3);
    }

    #[test]
    fn overwrite_keeps_insertion_position() {
        let cache = SearchCache::new(CacheSettings { max_entries: 2 });
        cache.set("a", payload(1));
        cache.set("b", payload(2));
        cache.set("a", payload(3));
        cache.set("c", payload(4));

        let ttl = Duration::from_secs(60);
        // "a" was oldest despite the overwrite, so it goes first.
        assert!(cache.get("a", ttl).is_none());
        assert_eq!(cache.get("b", ttl).map(|p| p.search_time_ms), Some(2));
        assert_eq!(cache.get("c", ttl).map(|p| p.search_time_ms), Some(4));
    }

    #[test]
    fn reinsert_after_expiry_keeps_eviction_order_consistent() {
        let cache = SearchCache::new(CacheSettings { max_entries: 2 });
        cache.set("a", payload(1));
        assert!(cache.get("a", Duration::ZERO).is_none());

        cache.set("b", payload(2));
        cache.set("a", payload(3));
        cache.set("c", payload(4));

        // "b" is the oldest live entry after the re-insert of "a".
        let ttl = Duration::from_secs(60);
        assert!(cache.get("b", ttl).is_none());
        assert_eq!(cache.get("a", ttl).map(|p| p.search_time_ms), Some(3));
        assert_eq!(cache.get("c", ttl).map(|p| p.search_time_ms), Some(4));
    }

    #[test]
    fn clear_empties_everything() {
        let cache = SearchCache::new(CacheSettings::default());
        cache.set("a", payload(1));
        cache.set("b", payload(2));
        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert!(stats.keys.is_empty());
    }
}
