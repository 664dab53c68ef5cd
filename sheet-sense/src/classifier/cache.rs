//! Memoization of classifications keyed by table content.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::{Classification, RoleClassifier};
use crate::table::{Fingerprint, Table};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    table: Fingerprint,
    config: Fingerprint,
}

/// Cache entry with timestamp.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Arc<Classification>,
    timestamp: Instant,
}

/// Caches classifications so an unchanged table is not re-classified.
///
/// Entries are keyed by the table's content fingerprint together with the
/// classifier's configuration fingerprint, so editing the table or switching
/// configuration misses the cache.
///
/// ```rust
/// use sheet_sense::classifier::{ClassificationCache, RoleClassifier};
/// use sheet_sense::table::{Column, Table};
///
/// let classifier = RoleClassifier::new();
/// let mut cache = ClassificationCache::new();
/// let table = Table::try_new(vec![Column::text("Region", [Some("East")])]).unwrap();
///
/// let first = cache.get_or_classify(&classifier, &table);
/// let second = cache.get_or_classify(&classifier, &table);
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Debug)]
pub struct ClassificationCache {
    /// The cache storage
    cache: HashMap<CacheKey, CacheEntry>,
    /// Time-to-live for cache entries
    ttl: Duration,
    /// Maximum number of entries
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl ClassificationCache {
    /// Creates a cache with a 5 minute TTL and room for 64 tables.
    pub fn new() -> Self {
        Self::with_config(Duration::from_secs(300), 64)
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(ttl: Duration, max_entries: usize) -> Self {
        Self {
            cache: HashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cached classification of `table`, classifying it on a miss.
    pub fn get_or_classify(
        &mut self,
        classifier: &RoleClassifier,
        table: &Table,
    ) -> Arc<Classification> {
        let key = CacheKey {
            table: table.fingerprint(),
            config: classifier.config_fingerprint().clone(),
        };

        if let Some(entry) = self.cache.get(&key) {
            if entry.timestamp.elapsed() < self.ttl {
                self.hits += 1;
                debug!(fingerprint = %key.table, "Classification cache hit");
                return Arc::clone(&entry.value);
            }
        }

        self.misses += 1;
        debug!(fingerprint = %key.table, "Classification cache miss");

        let value = Arc::new(classifier.classify(table));
        self.set(key, Arc::clone(&value));
        value
    }

    fn set(&mut self, key: CacheKey, value: Arc<Classification>) {
        // Evict oldest entries if at capacity
        if !self.cache.contains_key(&key) && self.cache.len() >= self.max_entries {
            self.evict_oldest();
        }

        self.cache.insert(
            key,
            CacheEntry {
                value,
                timestamp: Instant::now(),
            },
        );
    }

    /// Drops every cached classification of `table`, whatever the config.
    pub fn invalidate(&mut self, table: &Table) -> usize {
        let fingerprint = table.fingerprint();
        let before = self.cache.len();
        self.cache.retain(|key, _| key.table != fingerprint);
        before - self.cache.len()
    }

    /// Clears the entire cache.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Removes expired entries.
    pub fn remove_expired(&mut self) {
        let now = Instant::now();
        self.cache
            .retain(|_, entry| now.duration_since(entry.timestamp) < self.ttl);
    }

    /// Gets the current size of the cache.
    pub fn size(&self) -> usize {
        self.cache.len()
    }

    /// Evicts the oldest entry.
    fn evict_oldest(&mut self) {
        if let Some(oldest_key) = self
            .cache
            .iter()
            .min_by_key(|(_, entry)| entry.timestamp)
            .map(|(k, _)| k.clone())
        {
            self.cache.remove(&oldest_key);
        }
    }

    /// Gets cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total_entries = self.cache.len();
        let expired_entries = self
            .cache
            .values()
            .filter(|entry| entry.timestamp.elapsed() >= self.ttl)
            .count();

        CacheStats {
            total_entries,
            expired_entries,
            active_entries: total_entries - expired_entries,
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Statistics about the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Number of expired entries
    pub expired_entries: usize,
    /// Number of active (non-expired) entries
    pub active_entries: usize,
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that had to classify
    pub misses: u64,
}

impl Default for ClassificationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn table(region: &str) -> Table {
        Table::try_new(vec![Column::text("Region", [Some(region)])]).unwrap()
    }

    #[test]
    fn test_hit_for_unchanged_table() {
        let classifier = RoleClassifier::new();
        let mut cache = ClassificationCache::new();

        let first = cache.get_or_classify(&classifier, &table("East"));
        let second = cache.get_or_classify(&classifier, &table("East"));

        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_changed_table_misses() {
        let classifier = RoleClassifier::new();
        let mut cache = ClassificationCache::new();

        cache.get_or_classify(&classifier, &table("East"));
        cache.get_or_classify(&classifier, &table("West"));

        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.size(), 2);
    }

    #[test]
    fn test_changed_config_misses() {
        let mut cache = ClassificationCache::new();
        let strict = RoleClassifier::new();
        let lenient = RoleClassifier::builder()
            .numeric_threshold(0.5)
            .build()
            .unwrap();

        cache.get_or_classify(&strict, &table("East"));
        cache.get_or_classify(&lenient, &table("East"));

        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.invalidate(&table("East")), 2);
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_cache_expiration() {
        let classifier = RoleClassifier::new();
        let mut cache = ClassificationCache::with_config(Duration::from_millis(50), 10);

        cache.get_or_classify(&classifier, &table("East"));
        std::thread::sleep(Duration::from_millis(80));

        assert_eq!(cache.stats().expired_entries, 1);
        cache.get_or_classify(&classifier, &table("East"));
        assert_eq!(cache.stats().misses, 2);

        cache.remove_expired();
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_cache_eviction() {
        let classifier = RoleClassifier::new();
        let mut cache = ClassificationCache::with_config(Duration::from_secs(60), 2);

        cache.get_or_classify(&classifier, &table("North"));
        cache.get_or_classify(&classifier, &table("South"));
        cache.get_or_classify(&classifier, &table("East"));

        assert_eq!(cache.size(), 2);
    }
}
