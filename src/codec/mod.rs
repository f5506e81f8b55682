//! Encoding of [`Output`] values for storage.
//!
//! [`ResultCodec`] turns an [`Output`] into an [`EncodedResult`] (a kind tag
//! plus a plain JSON payload) and back. Payload shapes per kind:
//!
//! | kind        | payload |
//! |-------------|---------|
//! | `binary`    | `{"base64": "...", "mime_type": "..." \| null}` |
//! | `choice`    | `[{"kind": ..., "payload": ...}, ...]` |
//! | `object`    | `{"type": "generic" \| <type name>, "content": ...}` |
//! | `text`      | the string itself |
//! | `tool_call` | `[{"id": ..., "function": {"name": ..., "arguments": "<json text>"}}, ...]` |
//! | `vector`    | `[{"data": [...], "dimensions": n}, ...]` |
//!
//! Streams are never encoded. For every other output `x`,
//! `decode(encode(x)) == x` and re-encoding a decoded value yields the same
//! payload.

mod object;

pub use object::{ObjectMapper, PlainObjectMapper, TypeRegistry};

use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::types::{BinaryOutput, ObjectOutput, Output, ResultKind, ToolCall, Vector};
use crate::{RatatoskrError, Result};

/// Type name stored for objects without a type.
pub const GENERIC_OBJECT_TYPE: &str = "generic";

/// An encoded [`Output`]: kind tag and plain payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedResult {
    pub kind: String,
    pub payload: Value,
}

impl EncodedResult {
    pub fn new(kind: ResultKind, payload: Value) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            payload,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct BinaryPayload {
    base64: String,
    mime_type: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ObjectPayload {
    #[serde(rename = "type")]
    type_name: String,
    content: Value,
}

#[derive(Serialize, Deserialize)]
struct ToolCallPayload {
    id: String,
    function: FunctionPayload,
}

#[derive(Serialize, Deserialize)]
struct FunctionPayload {
    name: String,
    arguments: String,
}

/// Encoder/decoder for [`Output`] values.
#[derive(Clone)]
pub struct ResultCodec {
    mapper: Arc<dyn ObjectMapper>,
}

impl Default for ResultCodec {
    fn default() -> Self {
        Self::new(Arc::new(PlainObjectMapper))
    }
}

impl ResultCodec {
    /// Create a codec that maps typed objects with `mapper`.
    pub fn new(mapper: Arc<dyn ObjectMapper>) -> Self {
        Self { mapper }
    }

    /// Encode an output.
    ///
    /// Fails with [`RatatoskrError::UnsupportedVariant`] for streams, also
    /// when nested inside a choice, and with [`RatatoskrError::InvalidInput`]
    /// for vectors holding NaN or infinite components.
    pub fn encode(&self, output: &Output) -> Result<EncodedResult> {
        let payload = match output {
            Output::Binary(binary) => to_payload(BinaryPayload {
                base64: binary.to_base64(),
                mime_type: binary.mime_type.clone(),
            })?,
            Output::Choice(choices) => {
                let encoded = choices
                    .iter()
                    .map(|choice| self.encode(choice))
                    .collect::<Result<Vec<_>>>()?;
                to_payload(encoded)?
            }
            Output::Object(ObjectOutput::Generic(map)) => to_payload(ObjectPayload {
                type_name: GENERIC_OBJECT_TYPE.to_string(),
                content: Value::Object(map.clone()),
            })?,
            Output::Object(ObjectOutput::Typed(object)) => {
                if object.type_name == GENERIC_OBJECT_TYPE {
                    return Err(RatatoskrError::InvalidInput(format!(
                        "type name '{GENERIC_OBJECT_TYPE}' is reserved for untyped objects"
                    )));
                }
                to_payload(ObjectPayload {
                    type_name: object.type_name.clone(),
                    content: self.mapper.normalize(object)?,
                })?
            }
            Output::Text(text) => Value::String(text.clone()),
            Output::ToolCall(calls) => {
                let encoded = calls
                    .iter()
                    .map(|call| {
                        Ok(ToolCallPayload {
                            id: call.id.clone(),
                            function: FunctionPayload {
                                name: call.name.clone(),
                                arguments: call.arguments_json()?,
                            },
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                to_payload(encoded)?
            }
            Output::Vector(vectors) => {
                if let Some(value) = vectors
                    .iter()
                    .flat_map(|vector| &vector.data)
                    .find(|value| !value.is_finite())
                {
                    return Err(RatatoskrError::InvalidInput(format!(
                        "vector component {value} has no JSON representation"
                    )));
                }
                to_payload(vectors)?
            }
            Output::Stream(_) => {
                return Err(RatatoskrError::UnsupportedVariant(
                    ResultKind::Stream.as_str(),
                ));
            }
        };

        Ok(EncodedResult::new(output.kind(), payload))
    }

    /// Decode an encoded output.
    ///
    /// Unknown kinds and malformed payloads fail with
    /// [`RatatoskrError::Decode`]. Nothing is returned on failure, not even
    /// the successfully decoded parts of a choice.
    pub fn decode(&self, encoded: &EncodedResult) -> Result<Output> {
        let kind: ResultKind = encoded.kind.parse()?;
        let payload = &encoded.payload;

        match kind {
            ResultKind::Binary => {
                let binary: BinaryPayload = from_payload(kind, payload)?;
                Ok(Output::Binary(BinaryOutput::from_base64(
                    &binary.base64,
                    binary.mime_type,
                )?))
            }
            ResultKind::Choice => {
                let choices: Vec<EncodedResult> = from_payload(kind, payload)?;
                let decoded = choices
                    .iter()
                    .map(|choice| self.decode(choice))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Output::Choice(decoded))
            }
            ResultKind::Object => {
                let object: ObjectPayload = from_payload(kind, payload)?;
                if object.type_name == GENERIC_OBJECT_TYPE {
                    match object.content {
                        Value::Object(map) => Ok(Output::Object(ObjectOutput::Generic(map))),
                        other => Err(RatatoskrError::Decode(format!(
                            "generic object content must be a map, got {other}"
                        ))),
                    }
                } else {
                    let typed = self
                        .mapper
                        .denormalize(&object.type_name, object.content)?;
                    Ok(Output::Object(ObjectOutput::Typed(typed)))
                }
            }
            ResultKind::Text => match payload {
                Value::String(text) => Ok(Output::Text(text.clone())),
                other => Err(RatatoskrError::Decode(format!(
                    "text payload must be a string, got {other}"
                ))),
            },
            ResultKind::ToolCall => {
                let calls: Vec<ToolCallPayload> = from_payload(kind, payload)?;
                let decoded = calls
                    .into_iter()
                    .map(|call| {
                        let arguments = serde_json::from_str(&call.function.arguments).map_err(
                            |e| {
                                RatatoskrError::Decode(format!(
                                    "invalid arguments for tool call '{}': {e}",
                                    call.id
                                ))
                            },
                        )?;
                        Ok(ToolCall::new(call.id, call.function.name, arguments))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Output::ToolCall(decoded))
            }
            ResultKind::Vector => {
                let vectors: Vec<Vector> = from_payload(kind, payload)?;
                Ok(Output::Vector(vectors))
            }
            ResultKind::Stream => Err(RatatoskrError::Decode(
                "stream results are never stored".to_string(),
            )),
        }
    }
}

fn to_payload<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn from_payload<T: DeserializeOwned>(kind: ResultKind, payload: &Value) -> Result<T> {
    T::deserialize(payload)
        .map_err(|e| RatatoskrError::Decode(format!("malformed {kind} payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_payload_is_bare_string() {
        let encoded = ResultCodec::default().encode(&Output::text("foo")).unwrap();
        assert_eq!(encoded.kind, "text");
        assert_eq!(encoded.payload, json!("foo"));
    }

    #[test]
    fn encoded_result_serializes_as_kind_and_payload() {
        let encoded = EncodedResult::new(ResultKind::Text, json!("foo"));
        assert_eq!(
            serde_json::to_value(&encoded).unwrap(),
            json!({"kind": "text", "payload": "foo"})
        );
    }

    #[test]
    fn reserved_generic_type_name_is_rejected() {
        let output = Output::Object(ObjectOutput::Typed(crate::types::TypedObject::new(
            GENERIC_OBJECT_TYPE,
            json!({}),
        )));
        let err = ResultCodec::default().encode(&output).unwrap_err();
        assert!(matches!(err, RatatoskrError::InvalidInput(_)));
    }

    #[test]
    fn malformed_binary_payload() {
        let encoded = EncodedResult::new(ResultKind::Binary, json!({"mime_type": null}));
        let err = ResultCodec::default().decode(&encoded).unwrap_err();
        assert!(matches!(err, RatatoskrError::Decode(_)));
    }

    #[test]
    fn text_payload_must_be_string() {
        let encoded = EncodedResult::new(ResultKind::Text, json!(42));
        let err = ResultCodec::default().decode(&encoded).unwrap_err();
        assert!(matches!(err, RatatoskrError::Decode(_)));
    }

    #[test]
    fn stream_kind_never_decodes() {
        let encoded = EncodedResult::new(ResultKind::Stream, json!([]));
        let err = ResultCodec::default().decode(&encoded).unwrap_err();
        assert!(matches!(err, RatatoskrError::Decode(_)));
    }
}
