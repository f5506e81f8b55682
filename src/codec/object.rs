//! Structural mapping of typed objects.
//!
//! The codec hands typed [`ObjectOutput`](crate::types::ObjectOutput)
//! content to an [`ObjectMapper`] on the way in and out of the cache. Two
//! mappers ship with the crate:
//!
//! - [`PlainObjectMapper`] keeps the serialized content as-is.
//! - [`TypeRegistry`] only accepts type names registered with a serde type
//!   and content that deserializes into that type. Content is stored as
//!   given, so a round trip returns it unchanged.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::TypedObject;
use crate::{RatatoskrError, Result};

/// Converts typed objects to plain data and back.
pub trait ObjectMapper: Send + Sync {
    /// Plain-data form of `object`, stored under its type name.
    fn normalize(&self, object: &TypedObject) -> Result<Value>;

    /// Rebuild a typed object from plain data stored under `type_name`.
    fn denormalize(&self, type_name: &str, content: Value) -> Result<TypedObject>;
}

/// Mapper that trusts the serialized content.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainObjectMapper;

impl ObjectMapper for PlainObjectMapper {
    fn normalize(&self, object: &TypedObject) -> Result<Value> {
        Ok(object.content.clone())
    }

    fn denormalize(&self, type_name: &str, content: Value) -> Result<TypedObject> {
        Ok(TypedObject::new(type_name, content))
    }
}

type Validate = Box<dyn Fn(&Value) -> serde_json::Result<()> + Send + Sync>;

/// Mapper backed by registered serde types.
///
/// ```rust
/// # use ratatoskr_cache::codec::TypeRegistry;
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Forecast { city: String, celsius: f64 }
///
/// let registry = TypeRegistry::new().register::<Forecast>("Forecast");
/// assert!(registry.is_registered("Forecast"));
/// ```
#[derive(Default)]
pub struct TypeRegistry {
    types: HashMap<String, Validate>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `type_name`.
    pub fn register<T>(mut self, type_name: impl Into<String>) -> Self
    where
        T: DeserializeOwned + 'static,
    {
        self.types.insert(
            type_name.into(),
            Box::new(|content: &Value| T::deserialize(content).map(drop)),
        );
        self
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    fn validate(&self, type_name: &str, content: &Value) -> Option<serde_json::Result<()>> {
        self.types.get(type_name).map(|f| f(content))
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ObjectMapper for TypeRegistry {
    fn normalize(&self, object: &TypedObject) -> Result<Value> {
        match self.validate(&object.type_name, &object.content) {
            Some(Ok(())) => Ok(object.content.clone()),
            Some(Err(e)) => Err(RatatoskrError::InvalidInput(format!(
                "'{}' content does not match its type: {e}",
                object.type_name
            ))),
            None => Err(RatatoskrError::InvalidInput(format!(
                "type '{}' is not registered",
                object.type_name
            ))),
        }
    }

    fn denormalize(&self, type_name: &str, content: Value) -> Result<TypedObject> {
        match self.validate(type_name, &content) {
            Some(Ok(())) => Ok(TypedObject::new(type_name, content)),
            Some(Err(e)) => Err(RatatoskrError::Decode(format!(
                "cannot map content to '{type_name}': {e}"
            ))),
            None => Err(RatatoskrError::Decode(format!(
                "type '{type_name}' is not registered"
            ))),
        }
    }
}
