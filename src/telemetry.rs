//! Telemetry metric name constants.
//!
//! Centralised metric names for cache operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `ratatoskr_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `store`: cache store implementation (e.g. "memory")
//! - `reason`: why a call bypassed the cache: "no_store" or "no_key"
//! - `kind`: encoded result kind (e.g. "text", "vector")

/// Total lookups answered from the store.
///
/// Labels: `store`.
pub const CACHE_HITS_TOTAL: &str = "ratatoskr_cache_hits_total";

/// Total lookups that had to compute a fresh entry.
///
/// Labels: `store`.
pub const CACHE_MISSES_TOTAL: &str = "ratatoskr_cache_misses_total";

/// Total invocations delegated straight to the wrapped gateway.
///
/// Labels: `reason` ("no_store" | "no_key").
pub const CACHE_BYPASS_TOTAL: &str = "ratatoskr_cache_bypass_total";

/// Total entries built on a miss and handed to the store.
///
/// Labels: `kind`.
pub const CACHE_WRITES_TOTAL: &str = "ratatoskr_cache_writes_total";

/// Total tag invalidation requests.
///
/// Labels: `store`.
pub const CACHE_INVALIDATIONS_TOTAL: &str = "ratatoskr_cache_invalidations_total";
