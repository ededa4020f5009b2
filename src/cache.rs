//! Optional memoization of advisory fetch results.
//!
//! The result cache is a narrow layer keyed by the inventory fingerprint:
//! when enabled, a successful fetch is stored for a configurable TTL and
//! subsequent runs with an unchanged dependency set skip the network round
//! trip entirely. The backing store is pluggable so the check never depends
//! on a specific cache implementation; with no store supplied, caching is
//! simply disabled.
//!
//! # Example
//!
//! ```
//! use advisory_check::cache::{CacheStore, MemoryStore};
//! use std::time::Duration;
//!
//! let store = MemoryStore::new();
//! store.set("key", "\"value\"".to_string(), Duration::from_secs(60)).unwrap();
//! assert!(store.contains("key"));
//! ```

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Key-value collaborator backing the result cache.
///
/// Values are JSON strings. `get` is expiry-aware: an entry past its TTL is
/// treated as absent. Implementations must tolerate concurrent calls;
/// per-entry read consistency is required, at-least-once-compute across
/// concurrent misses is acceptable.
pub trait CacheStore: Send + Sync {
    /// Returns the stored value, or `None` when absent or expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, expiring after `ttl`.
    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process [`CacheStore`] with per-entry expiry.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;

        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("cache store lock poisoned"))?;

        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}

/// Memoizes a computation under a fingerprint-derived key.
///
/// A zero TTL or an absent store disables caching: every call computes. Only
/// successful computations are stored. A failing or corrupt store degrades to
/// computing directly — a cache problem never masks a successful fetch.
pub struct ResultCache {
    store: Option<Arc<dyn CacheStore>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(store: Option<Arc<dyn CacheStore>>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Disabled cache: every `get_or_compute` call computes.
    pub fn disabled() -> Self {
        Self {
            store: None,
            ttl: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some() && !self.ttl.is_zero()
    }

    /// Returns the cached value for `key`, or runs `compute` and stores its
    /// result.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &str, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(store) = self.store.as_ref().filter(|_| !self.ttl.is_zero()) else {
            return compute().await;
        };

        if let Some(raw) = store.get(key) {
            match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(key, "cache hit");
                    return Ok(value);
                }
                Err(err) => {
                    warn!(key, error = %err, "discarding undecodable cache entry");
                }
            }
        }

        let value = compute().await?;

        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(err) = store.set(key, raw, self.ttl) {
                    warn!(key, error = %err, "failed to store cache entry");
                }
            }
            Err(err) => warn!(key, error = %err, "failed to serialize cache entry"),
        }

        Ok(value)
    }
}
