//! Invocation input and option types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Option key carrying the caller's cache key.
pub const PROMPT_CACHE_KEY: &str = "prompt_cache_key";

/// Option key carrying the per-call time-to-live, in seconds.
pub const PROMPT_CACHE_TTL: &str = "prompt_cache_ttl";

/// Call options forwarded to the gateway.
///
/// A string-keyed JSON map. The caching layer reads and strips
/// [`PROMPT_CACHE_KEY`] and [`PROMPT_CACHE_TTL`]; everything else is
/// forwarded to the wrapped gateway untouched.
pub type Options = serde_json::Map<String, Value>;

/// Model input: either plain text or a structured value (e.g. a message list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Input {
    Text(String),
    Structured(Value),
}

impl Input {
    /// Bytes the content digest is computed over.
    ///
    /// Text is hashed as-is. Structured values go through `serde_json`,
    /// whose maps are key-ordered, so equal values yield equal bytes.
    pub fn canonical_bytes(&self) -> crate::Result<Vec<u8>> {
        match self {
            Input::Text(text) => Ok(text.as_bytes().to_vec()),
            Input::Structured(value) => Ok(serde_json::to_vec(value)?),
        }
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::Text(text.to_string())
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::Text(text)
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Input::Structured(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_bytes_are_raw_utf8() {
        let input = Input::from("bär");
        assert_eq!(input.canonical_bytes().unwrap(), "bär".as_bytes());
    }

    #[test]
    fn structured_bytes_ignore_insertion_order() {
        let mut a = serde_json::Map::new();
        a.insert("b".into(), json!(1));
        a.insert("a".into(), json!(2));
        let mut b = serde_json::Map::new();
        b.insert("a".into(), json!(2));
        b.insert("b".into(), json!(1));

        let a = Input::Structured(Value::Object(a));
        let b = Input::Structured(Value::Object(b));
        assert_eq!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
    }

    #[test]
    fn text_and_structured_string_differ() {
        let text = Input::from("hello");
        let structured = Input::from(json!("hello"));
        assert_ne!(
            text.canonical_bytes().unwrap(),
            structured.canonical_bytes().unwrap()
        );
    }
}
