//! In-memory memo of validated analysis payloads, keyed by arXiv id.
//!
//! Entries are the raw validated JSON, shared as `Arc<Value>` so a hit never
//! copies the document. Writes replace whole entries; the last writer for an
//! id wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use serde_json::Value;

/// Capacity policy for [`AnalysisCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Grow without bound; entries leave only through [`AnalysisCache::clear`].
    #[default]
    Unbounded,
    /// Keep at most `capacity` entries, evicting the least recently used.
    Lru { capacity: usize },
}

struct Slot {
    payload: Arc<Value>,
    last_used: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Slot>,
    clock: u64,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

#[derive(Default)]
pub struct AnalysisCache {
    policy: CachePolicy,
    inner: Mutex<Inner>,
}

impl AnalysisCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            inner: Mutex::new(Inner::default()),
        }
    }

    // A panic while holding the lock cannot leave a half-written entry, so a
    // poisoned mutex is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, id: &str) -> Option<Arc<Value>> {
        let mut inner = self.lock();
        let now = inner.tick();
        inner.entries.get_mut(id).map(|slot| {
            slot.last_used = now;
            Arc::clone(&slot.payload)
        })
    }

    pub fn put(&self, id: impl Into<String>, payload: Value) {
        let id = id.into();
        let mut inner = self.lock();
        let now = inner.tick();

        if let CachePolicy::Lru { capacity } = self.policy {
            if !inner.entries.contains_key(&id) && inner.entries.len() >= capacity.max(1) {
                let oldest = inner
                    .entries
                    .iter()
                    .min_by_key(|(_, slot)| slot.last_used)
                    .map(|(key, _)| key.clone());
                if let Some(key) = oldest {
                    tracing::debug!(evicted = %key, "analysis cache full, evicting entry");
                    inner.entries.remove(&key);
                }
            }
        }

        inner.entries.insert(
            id,
            Slot {
                payload: Arc::new(payload),
                last_used: now,
            },
        );
    }

    /// Empties the cache, returning how many entries were removed.
    pub fn clear(&self) -> usize {
        let mut inner = self.lock();
        let cleared = inner.entries.len();
        inner.entries.clear();
        cleared
    }

    pub fn size(&self) -> usize {
        self.lock().entries.len()
    }
}
