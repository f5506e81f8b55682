//! Public types for the Ratatoskr cache API.

mod input;
mod invocation;
pub mod metadata;
mod model;
mod output;
mod tool;

pub use input::{Input, Options, PROMPT_CACHE_KEY, PROMPT_CACHE_TTL};
pub use invocation::{Invocation, ModelResult, RawResult};
pub use metadata::Metadata;
pub use model::{ModelCatalog, ModelInfo};
pub use output::{BinaryOutput, ObjectOutput, Output, OutputStream, ResultKind, TypedObject, Vector};
pub use tool::ToolCall;
