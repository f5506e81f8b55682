//! CachingGateway - cache-aside decorator over any [`ModelGateway`]

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::cache::{
    CacheEntry, CacheItem, CacheKeyBuilder, CacheKeyDecision, CacheRequest, CacheStore, Compute,
    ComputeFuture, key::camel_case,
};
use crate::clock::Clock;
use crate::codec::ResultCodec;
use crate::telemetry;
use crate::types::metadata::{CACHE_KEY, CACHED, CACHED_AT};
use crate::types::{Input, Invocation, Metadata, ModelCatalog, ModelResult, Options, RawResult};
use crate::{ModelGateway, Result};

/// Gateway that memoizes another gateway's results.
///
/// A call is cached only when a store is configured and the call carries a
/// non-empty `prompt_cache_key` (see [`CacheKeyBuilder`]). Everything else
/// goes straight to the wrapped gateway and comes back untouched.
///
/// Results served through the cache, fresh or not, are rebuilt from the
/// stored entry and carry `cached`, `cache_key` and `cached_at` metadata.
/// `cached_at` is the time the entry was built, so repeated hits report the
/// same value.
///
/// Store failures are propagated; the call is not retried against the
/// wrapped gateway.
pub struct CachingGateway<G> {
    inner: G,
    store: Option<Arc<dyn CacheStore>>,
    clock: Arc<dyn Clock>,
    codec: ResultCodec,
    keys: CacheKeyBuilder,
}

impl<G: ModelGateway> CachingGateway<G> {
    pub(crate) fn new(
        inner: G,
        store: Option<Arc<dyn CacheStore>>,
        clock: Arc<dyn Clock>,
        codec: ResultCodec,
        keys: CacheKeyBuilder,
    ) -> Self {
        Self {
            inner,
            store,
            clock,
            codec,
            keys,
        }
    }

    /// The wrapped gateway.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Whether a store is configured.
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Drop every cached result of `model`.
    ///
    /// No-op without a store.
    pub async fn invalidate_model(&self, model: &str) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let tag = camel_case(model);
        debug!(%tag, "invalidating cached results");
        store.invalidate_tags(&[tag.as_str()]).await
    }

    fn bypass(&self, reason: &'static str) {
        debug!(reason, "bypassing cache");
        metrics::counter!(telemetry::CACHE_BYPASS_TOTAL, "reason" => reason).increment(1);
    }

    /// Build the entry for a miss: call the wrapped gateway and encode.
    async fn compute_entry(
        &self,
        model: &str,
        input: &Input,
        options: Options,
        cache_key: String,
    ) -> Result<CacheEntry> {
        debug!(%cache_key, "cache miss, invoking wrapped gateway");
        let invocation = self.inner.invoke(model, input, options).await?;
        let raw_data = invocation.raw().data().clone();
        let result = invocation.into_result();
        let encoded = self.codec.encode(&result.output)?;

        metrics::counter!(telemetry::CACHE_WRITES_TOTAL, "kind" => encoded.kind.clone())
            .increment(1);

        Ok(CacheEntry {
            result: encoded,
            raw_data,
            metadata: result.metadata.all(),
            cached_at: self.clock.now(),
            cache_key,
        })
    }

    /// Rebuild the caller-facing invocation from a stored entry.
    fn restore(&self, entry: CacheEntry, options: Options) -> Result<Invocation> {
        let output = self.codec.decode(&entry.result).inspect_err(|e| {
            warn!(cache_key = %entry.cache_key, error = %e, "failed to decode cached result");
        })?;

        let mut metadata = Metadata::from(entry.metadata);
        metadata.set(CACHED, true);
        metadata.set(CACHE_KEY, entry.cache_key);
        metadata.set(CACHED_AT, entry.cached_at);

        let result = ModelResult::new(output).with_metadata(metadata.clone());
        let mut invocation = Invocation::new(result, RawResult(entry.raw_data), options);
        invocation.metadata_mut().merge(&metadata);
        Ok(invocation)
    }
}

#[async_trait]
impl<G: ModelGateway> ModelGateway for CachingGateway<G> {
    #[instrument(skip(self, input, options), fields(operation = "invoke"))]
    async fn invoke(&self, model: &str, input: &Input, options: Options) -> Result<Invocation> {
        let Some(store) = &self.store else {
            self.bypass("no_store");
            return self.inner.invoke(model, input, options).await;
        };

        let CacheRequest {
            key,
            tag,
            ttl,
            options,
        } = match self.keys.build(model, input, options)? {
            CacheKeyDecision::Disabled(options) => {
                self.bypass("no_key");
                return self.inner.invoke(model, input, options).await;
            }
            CacheKeyDecision::Enabled(request) => request,
        };

        let forwarded = options.clone();
        let entry_key = key.clone();
        let compute: Compute<'_> = Box::new(move |item: &mut CacheItem| {
            item.tag(tag);
            if let Some(ttl) = ttl {
                item.expires_after(ttl);
            }
            Box::pin(self.compute_entry(model, input, forwarded, entry_key)) as ComputeFuture<'_>
        });

        let entry = store.get_or_compute(&key, compute).await?;
        self.restore(entry, options)
    }

    fn model_catalog(&self) -> &ModelCatalog {
        self.inner.model_catalog()
    }
}
