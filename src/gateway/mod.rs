//! Gateway implementations

mod builder;
mod caching;

pub use builder::CachingGatewayBuilder;
pub use caching::CachingGateway;
