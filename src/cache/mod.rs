//! In-memory plan cache.
//!
//! Maps a request [`Fingerprint`] to its compiled output. Entries are
//! immutable `Arc`s, so concurrent readers share them without copying and a
//! racing `put` for the same fingerprint is harmless (last write wins).
//!
//! # Design
//!
//! - Lock-sharded map (`DashMap`); no global lock on the compile path
//! - No eviction: at `max_entries` new plans are simply not stored
//! - Hit/miss counters for observability by the embedding service

mod hash;
pub use hash::{compute_hash, Fingerprint};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;

use crate::compile::CompiledQuery;
use crate::config::CacheSettings;

/// Cache counters at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct PlanCache {
    entries: DashMap<Fingerprint, Arc<CompiledQuery>>,
    max_entries: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PlanCache {
    /// An unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
            ..Self::default()
        }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self {
            max_entries: settings.max_entries,
            ..Self::default()
        }
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<CompiledQuery>> {
        match self.entries.get(fingerprint) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(entry.value()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a compiled query. Returns `false` if the cache is full.
    pub fn put(&self, fingerprint: Fingerprint, entry: Arc<CompiledQuery>) -> bool {
        if let Some(max) = self.max_entries {
            if self.entries.len() >= max && !self.entries.contains_key(&fingerprint) {
                warn!(max_entries = max, "plan cache full, not storing");
                return false;
            }
        }
        self.entries.insert(fingerprint, entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries. Counters are kept.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
