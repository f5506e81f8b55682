//! Caching subsystem.
//!
//! - [`CacheStore`]: the storage seam. A store answers one question
//!   atomically: "give me the entry for this key, computing it if needed".
//!   The computation receives a [`CacheItem`] on which it declares tags and
//!   a time-to-live for the entry it is about to produce.
//!
//! - [`MemoryStore`]: moka-backed in-memory store with clock-driven
//!   expiry and tag invalidation.
//!
//! - [`key::CacheKeyBuilder`]: derives the key, tag and ttl for a call, or
//!   decides that the call is not cached at all.

pub mod key;
mod memory;

pub use key::{CacheKeyBuilder, CacheKeyDecision, CacheRequest};
pub use memory::{MemoryStore, StoreConfig};

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::codec::EncodedResult;

/// A stored invocation result.
///
/// Written once on a miss and never patched; a new entry replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The encoded output.
    pub result: EncodedResult,
    /// Raw backend response captured on the miss.
    pub raw_data: Value,
    /// Result metadata captured on the miss.
    pub metadata: serde_json::Map<String, Value>,
    /// Unix timestamp (seconds) the entry was built at.
    pub cached_at: i64,
    /// Key the entry was stored under.
    pub cache_key: String,
}

/// Storage directives declared by a computation for the entry it returns.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheItem {
    key: String,
    tags: Vec<String>,
    expires_after: Option<u64>,
}

impl CacheItem {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            tags: Vec::new(),
            expires_after: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Attach a tag for bulk invalidation.
    pub fn tag(&mut self, tag: impl Into<String>) -> &mut Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Expire the entry `secs` seconds after it is stored.
    pub fn expires_after(&mut self, secs: u64) -> &mut Self {
        self.expires_after = Some(secs);
        self
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Declared time-to-live, `None` for the store default.
    pub fn ttl(&self) -> Option<u64> {
        self.expires_after
    }

    pub(crate) fn into_tags(self) -> Vec<String> {
        self.tags
    }
}

/// Future producing a fresh entry on a miss.
pub type ComputeFuture<'a> = Pin<Box<dyn Future<Output = Result<CacheEntry>> + Send + 'a>>;

/// Computation run by a store on a miss.
///
/// Called synchronously with the item descriptor, then the returned future
/// is awaited. The future must not hold on to the descriptor.
pub type Compute<'a> = Box<dyn FnOnce(&mut CacheItem) -> ComputeFuture<'a> + Send + 'a>;

/// Key-value store for [`CacheEntry`] values.
///
/// Implementations must not store the result of a failed computation.
/// Coalescing concurrent computations of the same key is optional; callers
/// stay correct if a key is computed more than once.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Return the live entry for `key`, or run `compute`, store its entry
    /// under the declared tags and ttl, and return it.
    async fn get_or_compute<'a>(&self, key: &str, compute: Compute<'a>) -> Result<CacheEntry>;

    /// Drop every entry carrying any of `tags`.
    async fn invalidate_tags(&self, tags: &[&str]) -> Result<()>;

    /// Drop every entry.
    async fn clear(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_tags_are_deduplicated() {
        let mut item = CacheItem::new("k");
        item.tag("gpt4o").tag("gpt4o").tag("other");
        assert_eq!(item.tags(), ["gpt4o", "other"]);
    }

    #[test]
    fn item_ttl_defaults_to_none() {
        let mut item = CacheItem::new("k");
        assert_eq!(item.ttl(), None);
        item.expires_after(30);
        assert_eq!(item.ttl(), Some(30));
        assert_eq!(item.key(), "k");
    }

    #[test]
    fn entry_serializes_with_documented_field_names() {
        let entry = CacheEntry {
            result: EncodedResult {
                kind: "text".into(),
                payload: Value::String("hi".into()),
            },
            raw_data: Value::Null,
            metadata: serde_json::Map::new(),
            cached_at: 7,
            cache_key: "k".into(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        for field in ["result", "raw_data", "metadata", "cached_at", "cache_key"] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
        let back: CacheEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}
