//! Cache key derivation.
//!
//! A key is the concatenation of the caller's key, the camel-cased model id
//! and a SHA-256 digest of the input. SHA-256 rather than `DefaultHasher`
//! so keys stay stable across processes and for out-of-process stores.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::types::{Input, Options, PROMPT_CACHE_KEY, PROMPT_CACHE_TTL};
use crate::{RatatoskrError, Result};

/// Outcome of key derivation for one call.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheKeyDecision {
    /// The call is not cached. Carries the options unchanged.
    Disabled(Options),
    /// The call is cached.
    Enabled(CacheRequest),
}

/// Everything needed to look up or store one call.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRequest {
    pub key: String,
    /// Tag for bulk invalidation: the camel-cased model id.
    pub tag: String,
    /// Time-to-live in seconds; `None` defers to the store default.
    pub ttl: Option<u64>,
    /// Options with the caching keys removed.
    pub options: Options,
}

/// Derives cache keys from `(model, input, options)`.
///
/// Per-call options win over the configured defaults. An empty
/// `prompt_cache_key` disables caching even when a default key is
/// configured; a `null` one falls back to the default.
#[derive(Debug, Clone, Default)]
pub struct CacheKeyBuilder {
    default_key: Option<String>,
    default_ttl: Option<u64>,
}

impl CacheKeyBuilder {
    pub fn new(default_key: Option<String>, default_ttl: Option<u64>) -> Self {
        Self {
            default_key,
            default_ttl,
        }
    }

    pub fn build(&self, model: &str, input: &Input, mut options: Options) -> Result<CacheKeyDecision> {
        let key_override = match options.get(PROMPT_CACHE_KEY).cloned() {
            None => return Ok(CacheKeyDecision::Disabled(options)),
            Some(Value::Null) => match self.default_key.as_deref() {
                Some(key) if !key.is_empty() => key.to_string(),
                _ => return Ok(CacheKeyDecision::Disabled(options)),
            },
            Some(Value::String(key)) if key.is_empty() => {
                return Ok(CacheKeyDecision::Disabled(options));
            }
            Some(Value::String(key)) => key,
            Some(scalar @ (Value::Number(_) | Value::Bool(_))) => scalar.to_string(),
            Some(other) => {
                return Err(RatatoskrError::InvalidInput(format!(
                    "{PROMPT_CACHE_KEY} must be a string, got {other}"
                )));
            }
        };

        let ttl = match options.get(PROMPT_CACHE_TTL) {
            None | Some(Value::Null) => self.default_ttl,
            Some(value) => Some(value.as_u64().ok_or_else(|| {
                RatatoskrError::InvalidInput(format!(
                    "{PROMPT_CACHE_TTL} must be a non-negative integer, got {value}"
                ))
            })?),
        };

        options.remove(PROMPT_CACHE_KEY);
        options.remove(PROMPT_CACHE_TTL);

        let tag = camel_case(model);
        let key = format!("{key_override}{tag}{}", content_digest(input)?);

        Ok(CacheKeyDecision::Enabled(CacheRequest {
            key,
            tag,
            ttl,
            options,
        }))
    }
}

/// Lower camel case of a model id: `"gpt-4o-mini"` → `"gpt4oMini"`.
///
/// Runs of non-alphanumeric characters separate words. A word's first
/// character is upper-cased unless the character after it already is.
pub fn camel_case(model: &str) -> String {
    let mut joined = String::with_capacity(model.len());
    for word in model
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        if chars.clone().next().is_some_and(char::is_uppercase) {
            joined.push(first);
        } else {
            joined.extend(first.to_uppercase());
        }
        joined.push_str(chars.as_str());
    }

    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase hex SHA-256 of the input's canonical bytes.
pub fn content_digest(input: &Input) -> Result<String> {
    let digest = Sha256::digest(input.canonical_bytes()?);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(pairs: &[(&str, Value)]) -> Options {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn enabled(decision: CacheKeyDecision) -> CacheRequest {
        match decision {
            CacheKeyDecision::Enabled(request) => request,
            CacheKeyDecision::Disabled(_) => panic!("expected caching to be enabled"),
        }
    }

    #[test]
    fn camel_case_models() {
        assert_eq!(camel_case("foo"), "foo");
        assert_eq!(camel_case("gpt-4o-mini"), "gpt4oMini");
        assert_eq!(camel_case("claude-3-5-sonnet"), "claude35Sonnet");
        assert_eq!(camel_case("anthropic/claude_sonnet"), "anthropicClaudeSonnet");
        assert_eq!(camel_case("Mistral Large"), "mistralLarge");
        assert_eq!(camel_case("--"), "");
    }

    #[test]
    fn camel_case_keeps_upper_run() {
        assert_eq!(camel_case("text-eMBED"), "texteMBED");
    }

    #[test]
    fn digest_is_sha256_hex() {
        assert_eq!(
            content_digest(&Input::from("bar")).unwrap(),
            "fcde2b2edba56bf408601fb721fe9b5c338d10ee429ea04fae5511b68fbf8fb9"
        );
    }

    #[test]
    fn key_is_override_model_and_digest() {
        let builder = CacheKeyBuilder::default();
        let request = enabled(
            builder
                .build(
                    "foo",
                    &Input::from("bar"),
                    options(&[(PROMPT_CACHE_KEY, json!("symfony"))]),
                )
                .unwrap(),
        );
        assert_eq!(
            request.key,
            "symfonyfoofcde2b2edba56bf408601fb721fe9b5c338d10ee429ea04fae5511b68fbf8fb9"
        );
        assert_eq!(request.tag, "foo");
        assert_eq!(request.ttl, None);
    }

    #[test]
    fn key_is_deterministic() {
        let builder = CacheKeyBuilder::default();
        let opts = options(&[(PROMPT_CACHE_KEY, json!("k"))]);
        let a = enabled(builder.build("m", &Input::from("x"), opts.clone()).unwrap());
        let b = enabled(builder.build("m", &Input::from("x"), opts).unwrap());
        assert_eq!(a.key, b.key);
    }

    #[test]
    fn key_differs_on_input_model_and_override() {
        let builder = CacheKeyBuilder::default();
        let key = |model: &str, input: &str, k: &str| {
            enabled(
                builder
                    .build(model, &Input::from(input), options(&[(PROMPT_CACHE_KEY, json!(k))]))
                    .unwrap(),
            )
            .key
        };
        let base = key("m", "x", "k");
        assert_ne!(base, key("m", "y", "k"));
        assert_ne!(base, key("n", "x", "k"));
        assert_ne!(base, key("m", "x", "j"));
    }

    #[test]
    fn structured_input_is_hashed_canonically() {
        let builder = CacheKeyBuilder::default();
        let opts = options(&[(PROMPT_CACHE_KEY, json!("k"))]);
        let messages = json!([{"role": "user", "content": "hi"}]);
        let a = enabled(builder.build("m", &Input::from(messages.clone()), opts.clone()).unwrap());
        let b = enabled(builder.build("m", &Input::from(messages), opts.clone()).unwrap());
        let c = enabled(
            builder
                .build("m", &Input::from(json!([{"role": "user", "content": "bye"}])), opts)
                .unwrap(),
        );
        assert_eq!(a.key, b.key);
        assert_ne!(a.key, c.key);
    }

    #[test]
    fn missing_key_disables() {
        let builder = CacheKeyBuilder::new(Some("default".into()), Some(10));
        let opts = options(&[("temperature", json!(0.2))]);
        let decision = builder.build("m", &Input::from("x"), opts.clone()).unwrap();
        assert_eq!(decision, CacheKeyDecision::Disabled(opts));
    }

    #[test]
    fn empty_key_disables_even_with_default() {
        let builder = CacheKeyBuilder::new(Some("default".into()), None);
        let opts = options(&[(PROMPT_CACHE_KEY, json!("")), (PROMPT_CACHE_TTL, json!(5))]);
        let decision = builder.build("m", &Input::from("x"), opts.clone()).unwrap();
        assert_eq!(decision, CacheKeyDecision::Disabled(opts));
    }

    #[test]
    fn null_key_uses_default() {
        let builder = CacheKeyBuilder::new(Some("tenant".into()), None);
        let request = enabled(
            builder
                .build("m", &Input::from("x"), options(&[(PROMPT_CACHE_KEY, Value::Null)]))
                .unwrap(),
        );
        assert!(request.key.starts_with("tenantm"));
    }

    #[test]
    fn null_key_without_default_disables() {
        let builder = CacheKeyBuilder::default();
        let opts = options(&[(PROMPT_CACHE_KEY, Value::Null)]);
        let decision = builder.build("m", &Input::from("x"), opts).unwrap();
        assert!(matches!(decision, CacheKeyDecision::Disabled(_)));
    }

    #[test]
    fn numeric_key_is_rendered() {
        let builder = CacheKeyBuilder::default();
        let request = enabled(
            builder
                .build("m", &Input::from("x"), options(&[(PROMPT_CACHE_KEY, json!(42))]))
                .unwrap(),
        );
        assert!(request.key.starts_with("42m"));
    }

    #[test]
    fn structured_key_is_rejected() {
        let builder = CacheKeyBuilder::default();
        let err = builder
            .build("m", &Input::from("x"), options(&[(PROMPT_CACHE_KEY, json!(["a"]))]))
            .unwrap_err();
        assert!(matches!(err, RatatoskrError::InvalidInput(_)));
    }

    #[test]
    fn ttl_precedence() {
        let builder = CacheKeyBuilder::new(None, Some(60));
        let with_ttl = options(&[(PROMPT_CACHE_KEY, json!("k")), (PROMPT_CACHE_TTL, json!(5))]);
        let without_ttl = options(&[(PROMPT_CACHE_KEY, json!("k"))]);
        let null_ttl = options(&[(PROMPT_CACHE_KEY, json!("k")), (PROMPT_CACHE_TTL, Value::Null)]);

        assert_eq!(enabled(builder.build("m", &Input::from("x"), with_ttl).unwrap()).ttl, Some(5));
        assert_eq!(enabled(builder.build("m", &Input::from("x"), without_ttl).unwrap()).ttl, Some(60));
        assert_eq!(enabled(builder.build("m", &Input::from("x"), null_ttl).unwrap()).ttl, Some(60));
    }

    #[test]
    fn invalid_ttl_is_rejected() {
        let builder = CacheKeyBuilder::default();
        for bad in [json!(-1), json!(1.5), json!("10")] {
            let err = builder
                .build(
                    "m",
                    &Input::from("x"),
                    options(&[(PROMPT_CACHE_KEY, json!("k")), (PROMPT_CACHE_TTL, bad)]),
                )
                .unwrap_err();
            assert!(matches!(err, RatatoskrError::InvalidInput(_)));
        }
    }

    #[test]
    fn caching_options_are_stripped() {
        let builder = CacheKeyBuilder::default();
        let request = enabled(
            builder
                .build(
                    "m",
                    &Input::from("x"),
                    options(&[
                        (PROMPT_CACHE_KEY, json!("k")),
                        (PROMPT_CACHE_TTL, json!(5)),
                        ("temperature", json!(0.2)),
                    ]),
                )
                .unwrap(),
        );
        assert_eq!(request.options, options(&[("temperature", json!(0.2))]));
    }
}
