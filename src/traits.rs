//! Core ModelGateway trait

use async_trait::async_trait;

use crate::Result;
use crate::types::{Input, Invocation, ModelCatalog, Options};

/// The gateway trait that model backends and their decorators implement.
///
/// [`CachingGateway`](crate::CachingGateway) both consumes and implements
/// it, so decorators stack.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Invoke `model` with `input`.
    async fn invoke(&self, model: &str, input: &Input, options: Options) -> Result<Invocation>;

    /// Models this gateway can serve.
    fn model_catalog(&self) -> &ModelCatalog;
}
