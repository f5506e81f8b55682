//! Invocation result wrappers

use serde_json::Value;

use super::input::Options;
use super::metadata::Metadata;
use super::output::Output;

/// An [`Output`] together with the metadata the producer attached to it.
#[derive(Debug, PartialEq)]
pub struct ModelResult {
    pub output: Output,
    pub metadata: Metadata,
}

impl ModelResult {
    pub fn new(output: Output) -> Self {
        Self {
            output,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl From<Output> for ModelResult {
    fn from(output: Output) -> Self {
        Self::new(output)
    }
}

/// Snapshot of the backend's raw response, kept opaque.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResult(pub Value);

impl RawResult {
    pub fn data(&self) -> &Value {
        &self.0
    }

    pub fn into_data(self) -> Value {
        self.0
    }
}

/// What a gateway hands back to the caller.
///
/// Carries the result, the raw backend response, the options the call was
/// made with and a metadata bag of its own.
#[derive(Debug)]
pub struct Invocation {
    result: ModelResult,
    raw: RawResult,
    options: Options,
    metadata: Metadata,
}

impl Invocation {
    pub fn new(result: impl Into<ModelResult>, raw: RawResult, options: Options) -> Self {
        Self {
            result: result.into(),
            raw,
            options,
            metadata: Metadata::new(),
        }
    }

    pub fn result(&self) -> &ModelResult {
        &self.result
    }

    pub fn output(&self) -> &Output {
        &self.result.output
    }

    pub fn into_result(self) -> ModelResult {
        self.result
    }

    pub fn raw(&self) -> &RawResult {
        &self.raw
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
