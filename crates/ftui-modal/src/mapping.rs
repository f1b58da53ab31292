#![forbid(unsafe_code)]

//! Open-ended key/value mappings used for variant settings and content props.
//!
//! # Invariants
//!
//! 1. A [`Mapping`] is never "absent": consumers always see at least an
//!    empty mapping.
//! 2. [`Mapping::merged`] is shallow. Keys from the override side replace
//!    keys from the base side wholesale; nested objects are not merged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ModalError, Result};

/// Ordered string-keyed mapping of JSON values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping(Map<String, Value>);

impl Mapping {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a value, returning the previous one for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a string value by key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Shallow-merge `overrides` on top of `self`, returning a new mapping.
    #[must_use]
    pub fn merged(&self, overrides: &Mapping) -> Mapping {
        let mut out = self.clone();
        out.extend_from(overrides);
        out
    }

    /// Shallow-merge `overrides` into `self` in place.
    pub fn extend_from(&mut self, overrides: &Mapping) {
        for (key, value) in &overrides.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Convert into a plain JSON object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Mapping {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Mapping {
    type Error = ModalError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ModalError::NotAnObject),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
