//! Ratatoskr cache - cache-aside decorator for model gateways
//!
//! [`CachingGateway`] wraps any [`ModelGateway`] and memoizes its results in
//! a [`CacheStore`](cache::CacheStore). Results are keyed on the caller's
//! `prompt_cache_key`, the model id and a digest of the input, expire after
//! a per-call or default time-to-live, and can be dropped per model.
//!
//! Results cross the store boundary through [`ResultCodec`], which encodes
//! the closed set of [`Output`] variants to plain JSON and back. Streams are
//! never cached.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ratatoskr_cache::cache::{MemoryStore, StoreConfig};
//! use ratatoskr_cache::{CachingGateway, Input, ModelGateway, Options};
//! use serde_json::json;
//!
//! # async fn run(backend: impl ModelGateway) -> ratatoskr_cache::Result<()> {
//! let gateway = CachingGateway::builder(backend)
//!     .store(Arc::new(MemoryStore::new(&StoreConfig::default())))
//!     .build()?;
//!
//! let mut options = Options::new();
//! options.insert("prompt_cache_key".into(), json!("tenant-a"));
//! options.insert("prompt_cache_ttl".into(), json!(3600));
//!
//! let invocation = gateway
//!     .invoke("gpt-4o-mini", &Input::from("What is the capital of France?"), options)
//!     .await?;
//!
//! println!("cached at {:?}", invocation.metadata().get("cached_at"));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod gateway;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use codec::{EncodedResult, ResultCodec};
pub use error::{RatatoskrError, Result};
pub use gateway::{CachingGateway, CachingGatewayBuilder};
pub use traits::ModelGateway;

// Re-export all types
pub use types::{
    BinaryOutput, Input, Invocation, Metadata, ModelCatalog, ModelInfo, ModelResult, ObjectOutput,
    Options, Output, OutputStream, PROMPT_CACHE_KEY, PROMPT_CACHE_TTL, RawResult, ResultKind,
    ToolCall, TypedObject, Vector,
};
