//! Per-store metadata cache
//!
//! One slot per feature store name, so fetching metadata for store B never
//! invalidates a cached snapshot of store A. Snapshots are immutable and
//! shared via `Arc`; a refresh replaces the slot, it never merges.
//!
//! The cache has no TTL. Staleness is handled by the caller's two-attempt
//! protocol: try the cached snapshot, and on a stale-metadata error force
//! one refresh and retry once.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use featherquery_core::FeatureStoreMetadata;

/// Process-wide metadata cache keyed by feature store name
#[derive(Clone, Default)]
pub struct MetadataCache {
    inner: Arc<RwLock<HashMap<String, Arc<FeatureStoreMetadata>>>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot for a store, if any
    pub fn get(&self, store: &str) -> Option<Arc<FeatureStoreMetadata>> {
        let guard = match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.get(store).cloned()
    }

    /// Stores a snapshot under its own store name, replacing any previous
    /// snapshot for that store, and returns the shared handle
    pub fn insert(&self, snapshot: FeatureStoreMetadata) -> Arc<FeatureStoreMetadata> {
        let snapshot = Arc::new(snapshot);
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.insert(snapshot.store_name.clone(), Arc::clone(&snapshot));
        snapshot
    }

    /// Drops the cached snapshot for a store
    pub fn invalidate(&self, store: &str) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.remove(store);
    }
}
