//! In-memory [`CacheStore`] backed by moka.
//!
//! moka bounds the entry count, coalesces concurrent misses for the same
//! key (`try_get_with`) and never stores a failed computation. The caller
//! whose computation failed gets its error back unchanged; callers that
//! waited on it get [`RatatoskrError::Coalesced`]. Expiry is
//! *not* moka's: each entry records an absolute deadline taken from the
//! injected [`Clock`], and a lookup at or past the deadline discards the
//! entry and computes a new one. This keeps expiry deterministic under a
//! [`MockClock`](crate::clock::MockClock).
//!
//! Tag invalidation uses moka invalidation closures: entries stored before
//! the call and carrying a matching tag are never returned again.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use super::{CacheEntry, CacheItem, CacheStore, Compute};
use crate::clock::{Clock, SystemClock};
use crate::telemetry;
use crate::{RatatoskrError, Result};

const STORE_LABEL: &str = "memory";

/// Configuration for [`MemoryStore`].
///
/// ```rust
/// # use ratatoskr_cache::cache::StoreConfig;
/// let config = StoreConfig::new()
///     .max_entries(1_000)
///     .default_ttl(3600);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Maximum number of entries. Default: 10,000.
    pub max_entries: u64,
    /// Time-to-live in seconds for entries that do not declare one.
    /// Default: `None` (no expiry).
    pub default_ttl: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            default_ttl: None,
        }
    }
}

impl StoreConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the default time-to-live, in seconds.
    pub fn default_ttl(mut self, secs: u64) -> Self {
        self.default_ttl = Some(secs);
        self
    }
}

#[derive(Debug, Clone)]
struct StoredEntry {
    entry: CacheEntry,
    tags: Vec<String>,
    expires_at: Option<i64>,
}

impl StoredEntry {
    fn is_live(&self, now: i64) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// In-memory cache store.
pub struct MemoryStore {
    entries: Cache<String, StoredEntry>,
    clock: Arc<dyn Clock>,
    default_ttl: Option<u64>,
}

impl MemoryStore {
    /// Create a store on the system clock.
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a store whose expiry follows `clock`.
    pub fn with_clock(config: &StoreConfig, clock: Arc<dyn Clock>) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .support_invalidation_closures()
            .build();
        Self {
            entries,
            clock,
            default_ttl: config.default_ttl,
        }
    }

    /// Live entry for `key`, without computing anything.
    pub async fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.entries
            .get(key)
            .await
            .filter(|stored| stored.is_live(self.clock.now()))
            .map(|stored| stored.entry)
    }

    /// Number of entries held, expired ones included until next touched.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get_or_compute<'a>(&self, key: &str, compute: Compute<'a>) -> Result<CacheEntry> {
        if let Some(stored) = self.entries.get(key).await {
            if stored.is_live(self.clock.now()) {
                debug!(key, "cache hit");
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "store" => STORE_LABEL)
                    .increment(1);
                return Ok(stored.entry);
            }
            debug!(key, "discarding expired entry");
            self.entries.invalidate(key).await;
        }

        let clock = Arc::clone(&self.clock);
        let default_ttl = self.default_ttl;
        // Only runs for the caller that wins the computation. Its error is
        // kept here; waiters get the message through moka.
        let mut failure: Option<RatatoskrError> = None;
        let slot = &mut failure;
        let init = async move {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "store" => STORE_LABEL)
                .increment(1);
            let mut item = CacheItem::new(key);
            let entry = match compute(&mut item).await {
                Ok(entry) => entry,
                Err(e) => {
                    let message = e.to_string();
                    *slot = Some(e);
                    return Err(message);
                }
            };
            let expires_at = item
                .ttl()
                .or(default_ttl)
                .map(|ttl| clock.now().saturating_add_unsigned(ttl));
            Ok(StoredEntry {
                entry,
                tags: item.into_tags(),
                expires_at,
            })
        };

        let result = self.entries.try_get_with(key.to_string(), init).await;
        match result {
            Ok(stored) => Ok(stored.entry),
            Err(message) => Err(failure
                .take()
                .unwrap_or_else(|| RatatoskrError::Coalesced(message.to_string()))),
        }
    }

    async fn invalidate_tags(&self, tags: &[&str]) -> Result<()> {
        if tags.is_empty() {
            return Ok(());
        }
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        debug!(?tags, "invalidating tags");
        self.entries
            .invalidate_entries_if(move |_, stored| stored.tags.iter().any(|t| tags.contains(t)))
            .map_err(|e| RatatoskrError::Cache(e.to_string()))?;
        metrics::counter!(telemetry::CACHE_INVALIDATIONS_TOTAL, "store" => STORE_LABEL)
            .increment(1);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.invalidate_all();
        Ok(())
    }
}
