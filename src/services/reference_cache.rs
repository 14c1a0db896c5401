// Extraction Result Cache
//
// The editor re-submits the same SQL on every debounce tick, so extraction
// results are kept in an LRU cache with TTL keyed by the SQL text.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::models::ParsedTableReference;

/// Cached extraction with metadata
#[derive(Debug, Clone)]
struct CachedReferences {
    /// SQL text the entry was computed from; guards against hash collisions
    sql: String,
    references: Arc<Vec<ParsedTableReference>>,
    cached_at: Instant,
    last_accessed: Instant,
    hit_count: u64,
}

impl CachedReferences {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub size: usize,
}

impl CacheStats {
    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<u64, CachedReferences>,
    stats: CacheStats,
}

/// LRU + TTL cache of table-reference extractions.
///
/// A `max_size` of 0 disables caching entirely.
#[derive(Debug)]
pub struct ReferenceCache {
    inner: Mutex<CacheInner>,
    max_size: usize,
    ttl: Duration,
}

impl ReferenceCache {
    pub fn new(max_size: usize, ttl_secs: u64) -> Self {
        Self::with_ttl(max_size, Duration::from_secs(ttl_secs))
    }

    pub fn with_ttl(max_size: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            max_size,
            ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_size > 0
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        // Entries are plain data; a panic mid-update cannot leave them torn
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn key(sql: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        sql.hash(&mut hasher);
        hasher.finish()
    }

    /// Cached references for `sql`, if present and fresh
    pub fn get(&self, sql: &str) -> Option<Arc<Vec<ParsedTableReference>>> {
        if !self.is_enabled() {
            return None;
        }

        let key = Self::key(sql);
        let ttl = self.ttl;
        let mut inner = self.lock();
        let inner = &mut *inner;

        match inner.entries.get_mut(&key) {
            Some(cached) if cached.sql == sql => {
                if cached.is_expired(ttl) {
                    inner.entries.remove(&key);
                    inner.stats.misses += 1;
                    inner.stats.expirations += 1;
                    tracing::debug!("Reference cache entry expired: {:x}", key);
                    return None;
                }

                cached.hit_count += 1;
                cached.last_accessed = Instant::now();
                inner.stats.hits += 1;
                tracing::trace!("Reference cache hit: {:x} (hit_count: {})", key, cached.hit_count);
                Some(Arc::clone(&cached.references))
            }
            _ => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Store an extraction result, evicting the least recently used entry
    /// when full
    pub fn put(&self, sql: &str, references: Arc<Vec<ParsedTableReference>>) {
        if !self.is_enabled() {
            return;
        }

        let key = Self::key(sql);
        let mut inner = self.lock();

        if inner.entries.len() >= self.max_size && !inner.entries.contains_key(&key) {
            Self::evict_lru(&mut inner);
        }

        let now = Instant::now();
        inner.entries.insert(
            key,
            CachedReferences {
                sql: sql.to_string(),
                references,
                cached_at: now,
                last_accessed: now,
                hit_count: 0,
            },
        );
    }

    fn evict_lru(inner: &mut CacheInner) {
        let oldest = inner
            .entries
            .iter()
            .min_by_key(|(_, cached)| cached.last_accessed)
            .map(|(key, _)| *key);

        if let Some(key) = oldest {
            inner.entries.remove(&key);
            inner.stats.evictions += 1;
            tracing::debug!("Evicted reference cache entry: {:x}", key);
        }
    }

    /// Return the cached extraction or compute and store it
    pub fn get_or_insert_with(
        &self,
        sql: &str,
        extract: impl FnOnce(&str) -> Vec<ParsedTableReference>,
    ) -> Arc<Vec<ParsedTableReference>> {
        if let Some(references) = self.get(sql) {
            return references;
        }
        let references = Arc::new(extract(sql));
        self.put(sql, Arc::clone(&references));
        references
    }

    /// Remove expired entries
    pub fn cleanup_expired(&self) {
        let ttl = self.ttl;
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, cached| !cached.is_expired(ttl));
        let removed = before - inner.entries.len();
        inner.stats.expirations += removed as u64;

        if removed > 0 {
            tracing::info!("Cleaned up {} expired reference cache entries", removed);
        }
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        let count = inner.entries.len();
        inner.entries.clear();
        tracing::info!("Cleared {} reference cache entries", count);
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            size: inner.entries.len(),
            ..inner.stats.clone()
        }
    }

    pub fn size(&self) -> usize {
        self.lock().entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::extract_table_references;

    fn refs(sql: &str) -> Arc<Vec<ParsedTableReference>> {
        Arc::new(extract_table_references(sql))
    }

    #[test]
    fn test_put_and_get() {
        let cache = ReferenceCache::new(10, 60);
        let sql = "SELECT * FROM db.users";
        cache.put(sql, refs(sql));

        let cached = cache.get(sql).expect("cached entry");
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].full_name, "db.users");
    }

    #[test]
    fn test_miss() {
        let cache = ReferenceCache::new(10, 60);
        assert!(cache.get("SELECT 1").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_expiration() {
        let cache = ReferenceCache::with_ttl(10, Duration::from_millis(50));
        let sql = "SELECT * FROM t";
        cache.put(sql, refs(sql));
        assert!(cache.get(sql).is_some());

        std::thread::sleep(Duration::from_millis(80));

        assert!(cache.get(sql).is_none());
        assert_eq!(cache.stats().expirations, 1);
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = ReferenceCache::new(2, 60);
        cache.put("SELECT * FROM a", refs("SELECT * FROM a"));
        std::thread::sleep(Duration::from_millis(5));
        cache.put("SELECT * FROM b", refs("SELECT * FROM b"));
        std::thread::sleep(Duration::from_millis(5));

        // Touch `a` so `b` becomes least recently used
        assert!(cache.get("SELECT * FROM a").is_some());
        std::thread::sleep(Duration::from_millis(5));
        cache.put("SELECT * FROM c", refs("SELECT * FROM c"));

        assert_eq!(cache.size(), 2);
        assert!(cache.get("SELECT * FROM b").is_none());
        assert!(cache.get("SELECT * FROM a").is_some());
        assert!(cache.get("SELECT * FROM c").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_get_or_insert_with_counts_hits() {
        let cache = ReferenceCache::new(10, 60);
        let sql = "SELECT * FROM x.y";

        let first = cache.get_or_insert_with(sql, extract_table_references);
        let second = cache.get_or_insert_with(sql, |_| panic!("should be cached"));

        assert_eq!(first, second);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_disabled_cache() {
        let cache = ReferenceCache::new(0, 60);
        let sql = "SELECT * FROM t";
        cache.put(sql, refs(sql));
        assert!(!cache.is_enabled());
        assert!(cache.get(sql).is_none());
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_clear_and_cleanup() {
        let cache = ReferenceCache::with_ttl(10, Duration::from_millis(20));
        cache.put("SELECT * FROM a", refs("SELECT * FROM a"));
        cache.put("SELECT * FROM b", refs("SELECT * FROM b"));
        assert_eq!(cache.size(), 2);

        std::thread::sleep(Duration::from_millis(40));
        cache.cleanup_expired();
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.stats().expirations, 2);

        cache.put("SELECT * FROM a", refs("SELECT * FROM a"));
        cache.clear();
        assert_eq!(cache.size(), 0);
    }
}
