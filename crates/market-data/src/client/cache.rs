//! In-memory response cache with a single, adjustable time to live.
//!
//! Entries are never evicted in the background. An expired entry is simply
//! ignored on lookup and overwritten by the next successful response for the
//! same key.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::warn;
use serde_json::Value;
use tokio::time::Instant;

/// Default time to live for cached responses (5 minutes).
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_millis(300_000);

#[derive(Clone, Debug)]
struct CacheEntry {
    payload: Value,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

#[derive(Debug)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

/// Response payloads keyed by serialized request parameters.
#[derive(Debug)]
pub struct ResponseCache {
    state: Mutex<CacheState>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                ttl,
            }),
        }
    }

    /// Lock the cache state, recovering from poison if necessary.
    ///
    /// A poisoned cache holds at worst a stale payload, which the TTL check
    /// still guards.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Response cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Payload stored under `key`, if it is younger than the current TTL.
    pub fn get(&self, key: &str) -> Option<Value> {
        let state = self.lock();
        state
            .entries
            .get(key)
            .filter(|entry| entry.is_fresh(state.ttl))
            .map(|entry| entry.payload.clone())
    }

    /// Store a payload, replacing whatever was under `key`.
    pub fn insert(&self, key: String, payload: Value) {
        self.lock().entries.insert(
            key,
            CacheEntry {
                payload,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn ttl(&self) -> Duration {
        self.lock().ttl
    }

    /// Replace the TTL. Existing entries are judged against it on their next lookup.
    pub fn set_ttl(&self, ttl: Duration) {
        self.lock().ttl = ttl;
    }

    /// Number of stored entries, expired ones included.
    pub fn entry_count(&self) -> usize {
        self.lock().entries.len()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DURATION)
    }
}
