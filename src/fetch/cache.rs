//! LRU cache of completed asset bodies

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

/// Completed response bodies keyed by URL
pub struct AssetCache {
    cache: LruCache<String, Arc<Vec<u8>>>,
}

impl AssetCache {
    /// Create a new cache with the given capacity (at least one entry)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Get a cached body, promoting it in the LRU order
    #[must_use]
    pub fn get(&mut self, url: &str) -> Option<Arc<Vec<u8>>> {
        self.cache.get(url).cloned()
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.cache.contains(url)
    }

    pub fn insert(&mut self, url: String, body: Arc<Vec<u8>>) {
        self.cache.put(url, body);
    }

    /// Drop the entry for `url`, so the next request goes back to the fetcher
    pub fn evict(&mut self, url: &str) {
        self.cache.pop(url);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str) -> Arc<Vec<u8>> {
        Arc::new(text.as_bytes().to_vec())
    }

    #[test]
    fn zero_capacity_still_holds_one_entry() {
        let mut cache = AssetCache::new(0);
        cache.insert("a".into(), body("a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn least_recently_used_is_dropped_first() {
        let mut cache = AssetCache::new(2);
        cache.insert("a".into(), body("a"));
        cache.insert("b".into(), body("b"));
        let _ = cache.get("a");
        cache.insert("c".into(), body("c"));

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn evict_removes_entry() {
        let mut cache = AssetCache::new(4);
        cache.insert("a".into(), body("a"));
        cache.evict("a");
        assert!(cache.is_empty());
    }
}
