//! TTL response cache with prefix invalidation
//!
//! Explicit-invalidation cache for read endpoints: callers decide the keys,
//! call `set` after a fetch, and call `clear_by_prefix` after any mutation
//! that could have staled cached reads (e.g. `assignment:` after an
//! assignment edit). The cache never inspects payload structure and never
//! learns of writes on its own. Expired entries are evicted lazily at read
//! time.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

/// Default TTL applied when `set` is called without an explicit one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

struct CacheEntry {
    payload: Value,
    inserted_at: Instant,
    expires_at: Instant,
}

/// Bounded-lifetime response cache keyed by opaque strings.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Return the payload if present and unexpired; evict and report
    /// absent otherwise.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.payload.clone()),
            Some(_) => {
                let entry = entries.remove(key);
                if let Some(entry) = entry {
                    debug!(
                        key,
                        age_ms = entry.inserted_at.elapsed().as_millis() as u64,
                        "evicted expired cache entry"
                    );
                }
                None
            }
            None => None,
        }
    }

    /// Store a payload under `key`, overwriting any existing entry.
    ///
    /// Expiry is `now + ttl`, falling back to the configured default TTL.
    pub fn set(&self, key: &str, payload: Value, ttl: Option<Duration>) {
        let now = Instant::now();
        let entry = CacheEntry {
            payload,
            inserted_at: now,
            expires_at: now + ttl.unwrap_or(self.default_ttl),
        };
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_owned(), entry);
    }

    /// Evict every key with the given string prefix. Returns the number
    /// of entries removed.
    pub fn clear_by_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(prefix, removed, "cleared cache entries by prefix");
        }
        removed
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    /// Number of stored entries, including any not yet lazily evicted.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
