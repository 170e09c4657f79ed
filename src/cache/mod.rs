//! In-memory TTL cache for upstream lookups.
//!
//! Maps a namespaced key to an opaque JSON value with an expiration
//! timestamp. Expiry is lazy: an expired entry is removed on the read that
//! observes it, or by an explicit [`CacheStore::cleanup_expired`] sweep.
//! There is no background timer and no size-based eviction; key cardinality
//! is bounded by registered players times recent matches.
//!
//! The store is constructed once at startup and shared behind an `Arc`;
//! the interior mutex serializes concurrent readers and writers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Key namespaces, one per upstream lookup kind.
///
/// Each namespace carries an independently configured TTL (see
/// `config::CacheConfig`); the composed key is `namespace:identifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheNamespace {
    PlayerIdentity,
    MatchHistory,
    MatchDetail,
    LifetimeStats,
}

impl CacheNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheNamespace::PlayerIdentity => "player-identity",
            CacheNamespace::MatchHistory => "match-history",
            CacheNamespace::MatchDetail => "match-detail",
            CacheNamespace::LifetimeStats => "player-lifetime-stats",
        }
    }
}

/// Entry counts reported by [`CacheStore::stats`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    #[allow(dead_code)]
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry is visible strictly before its expiry instant.
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Process-shared keyed store with per-entry expiration.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn compose_key(namespace: CacheNamespace, identifier: &str) -> String {
        format!("{}:{}", namespace.as_str(), identifier)
    }

    /// Look up a value; absent when never set or already expired.
    ///
    /// Reading an expired entry removes it as a side effect.
    pub fn get(&self, namespace: CacheNamespace, identifier: &str) -> Option<Value> {
        self.get_at(namespace, identifier, Utc::now())
    }

    fn get_at(
        &self,
        namespace: CacheNamespace,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Option<Value> {
        let key = Self::compose_key(namespace, identifier);
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        match entries.get(&key) {
            Some(entry) if entry.is_expired(now) => {}
            Some(entry) => return Some(entry.value.clone()),
            None => return None,
        }

        entries.remove(&key);
        debug!("Cache expired for {}", key);
        None
    }

    /// Store a value with `expires_at = now + ttl`, overwriting any
    /// existing entry for the composed key.
    pub fn set(&self, namespace: CacheNamespace, identifier: &str, value: Value, ttl: Duration) {
        self.set_at(namespace, identifier, value, ttl, Utc::now());
    }

    fn set_at(
        &self,
        namespace: CacheNamespace,
        identifier: &str,
        value: Value,
        ttl: Duration,
        now: DateTime<Utc>,
    ) {
        let key = Self::compose_key(namespace, identifier);
        let expires_at = now + chrono::Duration::seconds(ttl.as_secs() as i64);

        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key,
            CacheEntry {
                value,
                cached_at: now,
                expires_at,
            },
        );
    }

    /// Remove one entry if present; no error when absent.
    pub fn invalidate(&self, namespace: CacheNamespace, identifier: &str) {
        let key = Self::compose_key(namespace, identifier);
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.remove(&key);
    }

    /// Remove every entry under a namespace, leaving other namespaces
    /// untouched. Used after upstream state changes to force a re-fetch
    /// of derivative data.
    pub fn invalidate_namespace(&self, namespace: CacheNamespace) {
        let prefix = format!("{}:", namespace.as_str());
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.retain(|key, _| !key.starts_with(&prefix));
    }

    /// Sweep out all expired entries; returns the count removed.
    ///
    /// Not required for correctness (lazy expiry never serves stale data)
    /// but bounds memory growth.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Utc::now())
    }

    fn cleanup_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Swept {} expired cache entries", removed);
        }
        removed
    }

    /// Drop everything.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.clear();
    }

    /// Entry counts as of now.
    pub fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let entries = self.entries.lock().expect("cache lock poisoned");

        let total_entries = entries.len();
        let expired_entries = entries.values().filter(|e| e.is_expired(now)).count();

        CacheStats {
            total_entries,
            valid_entries: total_entries - expired_entries,
            expired_entries,
        }
    }
}
