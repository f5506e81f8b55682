//! Tool call types for function calling

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool call made by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Parsed function arguments.
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Deserialize the arguments into a concrete type
    pub fn parse_arguments<T: serde::de::DeserializeOwned>(
        &self,
    ) -> std::result::Result<T, serde_json::Error> {
        T::deserialize(&self.arguments)
    }

    /// Arguments rendered as compact JSON text.
    pub fn arguments_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(&self.arguments)
    }
}
