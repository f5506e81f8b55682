//! Result variants returned by a model gateway.
//!
//! [`Output`] is a closed set: every consumer matches on it exhaustively,
//! so adding a variant is a breaking change by design of the type, not by
//! convention.

use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::Stream;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::tool::ToolCall;
use crate::{RatatoskrError, Result};

/// The outcome of a model invocation.
#[derive(Debug, PartialEq)]
pub enum Output {
    /// Raw bytes (audio, images, ...).
    Binary(BinaryOutput),
    /// Several alternative results, in provider order.
    Choice(Vec<Output>),
    /// Structured output.
    Object(ObjectOutput),
    /// Plain text.
    Text(String),
    /// Function calls requested by the model.
    ToolCall(Vec<ToolCall>),
    /// Embeddings.
    Vector(Vec<Vector>),
    /// Incremental output. Consumed once; cannot be cached.
    Stream(OutputStream),
}

impl Output {
    pub fn text(text: impl Into<String>) -> Self {
        Output::Text(text.into())
    }

    /// The kind tag of this variant.
    pub fn kind(&self) -> ResultKind {
        match self {
            Output::Binary(_) => ResultKind::Binary,
            Output::Choice(_) => ResultKind::Choice,
            Output::Object(_) => ResultKind::Object,
            Output::Text(_) => ResultKind::Text,
            Output::ToolCall(_) => ResultKind::ToolCall,
            Output::Vector(_) => ResultKind::Vector,
            Output::Stream(_) => ResultKind::Stream,
        }
    }
}

/// Kind tag of an [`Output`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Binary,
    Choice,
    Object,
    Text,
    ToolCall,
    Vector,
    Stream,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Binary => "binary",
            ResultKind::Choice => "choice",
            ResultKind::Object => "object",
            ResultKind::Text => "text",
            ResultKind::ToolCall => "tool_call",
            ResultKind::Vector => "vector",
            ResultKind::Stream => "stream",
        }
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultKind {
    type Err = RatatoskrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "binary" => Ok(ResultKind::Binary),
            "choice" => Ok(ResultKind::Choice),
            "object" => Ok(ResultKind::Object),
            "text" => Ok(ResultKind::Text),
            "tool_call" => Ok(ResultKind::ToolCall),
            "vector" => Ok(ResultKind::Vector),
            "stream" => Ok(ResultKind::Stream),
            other => Err(RatatoskrError::Decode(format!(
                "unknown result kind '{other}'"
            ))),
        }
    }
}

// ============================================================================
// Binary
// ============================================================================

/// Binary output with an optional MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOutput {
    pub data: Vec<u8>,
    pub mime_type: Option<String>,
}

impl BinaryOutput {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Standard (padded) base64 of the data.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    pub fn from_base64(encoded: &str, mime_type: Option<String>) -> Result<Self> {
        let data = STANDARD
            .decode(encoded)
            .map_err(|e| RatatoskrError::Decode(format!("invalid base64: {e}")))?;
        Ok(Self { data, mime_type })
    }
}

// ============================================================================
// Object
// ============================================================================

/// Structured output: a plain JSON map or a named, typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectOutput {
    /// A map with no type attached.
    Generic(serde_json::Map<String, Value>),
    /// A value of a named type, held in its serialized form.
    Typed(TypedObject),
}

/// A serialized value of a named type.
///
/// The content is what `serde` produces for the type; turning it back into
/// the concrete type is done with [`deserialize`](Self::deserialize) or by an
/// [`ObjectMapper`](crate::codec::ObjectMapper) that knows the type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedObject {
    pub type_name: String,
    pub content: Value,
}

impl TypedObject {
    pub fn new(type_name: impl Into<String>, content: Value) -> Self {
        Self {
            type_name: type_name.into(),
            content,
        }
    }

    /// Serialize `value` and tag it with `type_name`.
    pub fn from_typed<T: Serialize>(type_name: impl Into<String>, value: &T) -> Result<Self> {
        Ok(Self::new(type_name, serde_json::to_value(value)?))
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.content)?)
    }
}

// ============================================================================
// Vector
// ============================================================================

/// An embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub data: Vec<f64>,
    pub dimensions: usize,
}

impl Vector {
    /// Create a vector whose dimension count is its length.
    pub fn new(data: Vec<f64>) -> Self {
        let dimensions = data.len();
        Self { data, dimensions }
    }

    pub fn with_dimensions(data: Vec<f64>, dimensions: usize) -> Self {
        Self { data, dimensions }
    }
}

// ============================================================================
// Stream
// ============================================================================

/// One-shot stream of partial outputs.
///
/// Never equal to anything, itself included: two streams cannot be
/// compared without consuming them.
pub struct OutputStream {
    inner: Pin<Box<dyn Stream<Item = Result<Output>> + Send>>,
}

impl OutputStream {
    pub fn new(stream: impl Stream<Item = Result<Output>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for OutputStream {
    type Item = Result<Output>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OutputStream(..)")
    }
}

impl PartialEq for OutputStream {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}
