//! In-process LRU cache for parsed taxonomies.
//!
//! Filings from the same filer reuse identical taxonomy documents; parsing
//! them once per process is enough. Entries are keyed by schema URL plus a
//! content hash, so a re-published schema under the same URL misses cleanly.

use crate::taxonomy::Taxonomy;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

/// Cache key: schema URL + content hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaxonomyKey {
    /// Schema URL.
    pub url: String,
    /// Hash of the schema bytes.
    pub content_hash: u64,
}

impl TaxonomyKey {
    /// Builds a key from a URL and the schema document bytes.
    #[must_use]
    pub fn new(url: impl Into<String>, bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Self {
            url: url.into(),
            content_hash: hasher.finish(),
        }
    }
}

/// Bounded LRU cache of parsed taxonomies, safe to share across threads.
#[derive(Debug)]
pub struct TaxonomyCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<TaxonomyKey, Arc<Taxonomy>>,
    // Least-recently-used first.
    order: Vec<TaxonomyKey>,
}

impl TaxonomyCache {
    /// Creates a cache holding at most `capacity` taxonomies.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Fetches a cached taxonomy, refreshing its recency.
    #[must_use]
    pub fn get(&self, key: &TaxonomyKey) -> Option<Arc<Taxonomy>> {
        let mut inner = self.inner.lock().expect("cache lock");
        let hit = inner.entries.get(key).cloned();
        if hit.is_some() {
            inner.order.retain(|k| k != key);
            inner.order.push(key.clone());
        }
        hit
    }

    /// Inserts a taxonomy, evicting the least recently used entry when full.
    pub fn put(&self, key: TaxonomyKey, taxonomy: Arc<Taxonomy>) {
        let mut inner = self.inner.lock().expect("cache lock");
        if inner.entries.contains_key(&key) {
            inner.order.retain(|k| k != &key);
        } else if inner.entries.len() >= self.capacity {
            let evicted = inner.order.remove(0);
            inner.entries.remove(&evicted);
        }
        inner.order.push(key.clone());
        inner.entries.insert(key, taxonomy);
    }

    /// Fetches or computes a taxonomy.
    pub fn get_or_insert_with(
        &self,
        key: TaxonomyKey,
        build: impl FnOnce() -> Taxonomy,
    ) -> Arc<Taxonomy> {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        let built = Arc::new(build());
        self.put(key, Arc::clone(&built));
        built
    }

    /// Number of cached taxonomies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock").entries.len()
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TaxonomyCache {
    /// A small default sized for one filer's taxonomy churn.
    fn default() -> Self {
        Self::new(16)
    }
}
