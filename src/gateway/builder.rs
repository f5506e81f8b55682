//! Builder for configuring caching gateways

use std::sync::Arc;

use super::CachingGateway;
use crate::cache::{CacheKeyBuilder, CacheStore};
use crate::clock::{Clock, SystemClock};
use crate::codec::ResultCodec;
use crate::config::CacheSettings;
use crate::{ModelGateway, RatatoskrError, Result};

impl<G: ModelGateway> CachingGateway<G> {
    /// Create a new builder wrapping `inner`.
    pub fn builder(inner: G) -> CachingGatewayBuilder<G> {
        CachingGatewayBuilder::new(inner)
    }
}

/// Builder for [`CachingGateway`].
///
/// ```rust,ignore
/// let gateway = CachingGateway::builder(backend)
///     .store(Arc::new(MemoryStore::new(&StoreConfig::default())))
///     .default_ttl(3600)
///     .build()?;
/// ```
pub struct CachingGatewayBuilder<G> {
    inner: G,
    store: Option<Arc<dyn CacheStore>>,
    clock: Option<Arc<dyn Clock>>,
    codec: Option<ResultCodec>,
    default_key: Option<String>,
    default_ttl: Option<u64>,
    enabled: bool,
}

impl<G: ModelGateway> CachingGatewayBuilder<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            store: None,
            clock: None,
            codec: None,
            default_key: None,
            default_ttl: None,
            enabled: true,
        }
    }

    /// Cache results in `store`. Without a store every call is delegated.
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Time source for `cached_at` (default: system clock).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Codec for stored results (default: [`ResultCodec::default()`]).
    pub fn codec(mut self, codec: ResultCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Key used when a call passes `prompt_cache_key: null`.
    pub fn default_key(mut self, key: impl Into<String>) -> Self {
        self.default_key = Some(key.into());
        self
    }

    /// Time-to-live, in seconds, when a call sets no `prompt_cache_ttl`.
    pub fn default_ttl(mut self, secs: u64) -> Self {
        self.default_ttl = Some(secs);
        self
    }

    /// Apply loaded [`CacheSettings`].
    ///
    /// `enabled = false` drops any configured store at build time.
    pub fn settings(mut self, settings: &CacheSettings) -> Self {
        self.enabled = settings.enabled;
        if let Some(key) = &settings.default_key {
            self.default_key = Some(key.clone());
        }
        if let Some(ttl) = settings.default_ttl_secs {
            self.default_ttl = Some(ttl);
        }
        self
    }

    /// Build the gateway.
    ///
    /// Fails if the default key is empty: an empty key disables caching, so
    /// a default one could never take effect.
    pub fn build(self) -> Result<CachingGateway<G>> {
        if self.default_key.as_deref() == Some("") {
            return Err(RatatoskrError::Configuration(
                "default cache key must not be empty".to_string(),
            ));
        }

        let store = if self.enabled { self.store } else { None };

        Ok(CachingGateway::new(
            self.inner,
            store,
            self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>),
            self.codec.unwrap_or_default(),
            CacheKeyBuilder::new(self.default_key, self.default_ttl),
        ))
    }
}
