//! Bounded embedding cache
//!
//! Maps a caller-supplied content key (image URL, content hash) to the
//! embedding vector computed for it. Entries are populated lazily through
//! [`EmbeddingCache::get_or_compute`] and live until evicted by capacity
//! pressure, [`EmbeddingCache::evict`], or [`EmbeddingCache::clear`].
//!
//! # Thread Safety
//!
//! A single mutex guards the entry map. It is never held while the compute
//! future runs, so two tasks missing on the same key may both compute; the
//! last insert wins. Embeddings are a pure function of their key, so either
//! value is correct.

use crate::vector::Vector;
use crate::{Error, Result};
use linked_hash_map::LinkedHashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Default number of cached embeddings
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Which entry leaves first when the cache is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Least recently used: lookups refresh an entry's position
    #[default]
    Lru,
    /// First in, first out: lookups do not affect order
    Fifo,
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub eviction: EvictionPolicy,
}

fn default_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            eviction: EvictionPolicy::Lru,
        }
    }
}

/// Point-in-time cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Bounded, evictable key → embedding store
pub struct EmbeddingCache {
    entries: Mutex<LinkedHashMap<String, Arc<Vector>>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl EmbeddingCache {
    /// Create a cache; a capacity of zero is rejected
    pub fn new(config: CacheConfig) -> Result<Self> {
        if config.capacity == 0 {
            return Err(Error::validation("cache capacity cannot be 0"));
        }

        Ok(Self {
            entries: Mutex::new(LinkedHashMap::new()),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        })
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::new(CacheConfig {
            capacity,
            ..CacheConfig::default()
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a cached embedding, recording a hit or miss
    pub fn get(&self, key: &str) -> Option<Arc<Vector>> {
        let mut entries = self.entries.lock();
        let found = match self.config.eviction {
            EvictionPolicy::Lru => entries.get_refresh(key).map(|v| Arc::clone(v)),
            EvictionPolicy::Fifo => entries.get(key).cloned(),
        };

        match found {
            Some(vector) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(vector)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or replace an embedding, evicting to stay within capacity
    pub fn insert(&self, key: impl Into<String>, vector: Vector) -> Arc<Vector> {
        let key = key.into();
        let vector = Arc::new(vector);
        let mut entries = self.entries.lock();

        if entries.remove(&key).is_none() {
            while entries.len() >= self.config.capacity {
                match entries.pop_front() {
                    Some((evicted, _)) => {
                        self.evictions.fetch_add(1, Ordering::Relaxed);
                        debug!(key = %evicted, policy = ?self.config.eviction, "evicted embedding");
                    }
                    None => break,
                }
            }
        }

        entries.insert(key, Arc::clone(&vector));
        vector
    }

    /// Return the cached embedding for `key`, computing and caching it on a miss
    ///
    /// Errors from `compute` are passed through untouched and nothing is
    /// cached. No timeout or retry is applied here.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        compute: F,
    ) -> std::result::Result<Arc<Vector>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vector, E>>,
    {
        if let Some(vector) = self.get(key) {
            return Ok(vector);
        }

        let vector = compute().await?;
        Ok(self.insert(key, vector))
    }

    /// Remove a single entry; returns whether it was present
    pub fn evict(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// Drop every entry; counters are kept
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len: self.len(),
            capacity: self.config.capacity,
        }
    }
}

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("config", &self.config)
            .field("len", &self.len())
            .finish()
    }
}
