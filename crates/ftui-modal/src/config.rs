#![forbid(unsafe_code)]

//! Manager configuration: registered variants, the default variant, and
//! per-variant default settings.
//!
//! Variants are component handles and can only be registered in code.
//! Default variant and default settings may additionally be loaded as data
//! through [`ModalPolicy`] (JSON always; TOML with the `policy-config`
//! feature).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use crate::mapping::Mapping;

/// Immutable-once-built configuration for a `ModalManager`.
#[derive(Debug, Clone)]
pub struct ModalManagerConfig<V> {
    pub(crate) variants: IndexMap<String, V>,
    pub(crate) default_variant: Option<String>,
    pub(crate) default_settings: HashMap<String, Mapping>,
}

impl<V> Default for ModalManagerConfig<V> {
    fn default() -> Self {
        Self {
            variants: IndexMap::new(),
            default_variant: None,
            default_settings: HashMap::new(),
        }
    }
}

impl<V> ModalManagerConfig<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named variant. Re-registering a name replaces it.
    #[must_use]
    pub fn variant(mut self, name: impl Into<String>, component: V) -> Self {
        self.variants.insert(name.into(), component);
        self
    }

    /// Name of the variant used when a request does not pick one.
    #[must_use]
    pub fn default_variant(mut self, name: impl Into<String>) -> Self {
        self.default_variant = Some(name.into());
        self
    }

    /// Default settings for one variant.
    #[must_use]
    pub fn default_settings(mut self, variant: impl Into<String>, settings: Mapping) -> Self {
        self.default_settings.insert(variant.into(), settings);
        self
    }

    /// Overlay a data-driven policy.
    ///
    /// A policy default variant replaces the configured one; policy settings
    /// are shallow-merged over existing defaults per variant.
    #[must_use]
    pub fn with_policy(mut self, policy: ModalPolicy) -> Self {
        if policy.default_variant.is_some() {
            self.default_variant = policy.default_variant;
        }
        for (variant, settings) in policy.default_settings {
            self.default_settings
                .entry(variant)
                .or_default()
                .extend_from(&settings);
        }
        self
    }

    /// Registered variant names, in registration order.
    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }
}

/// Serializable subset of the manager configuration.
///
/// ```toml
/// default_variant = "sheet"
///
/// [default_settings.sheet]
/// placement = "bottom"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalPolicy {
    pub default_variant: Option<String>,
    pub default_settings: BTreeMap<String, Mapping>,
}

impl ModalPolicy {
    /// Parse a policy from JSON.
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parse a policy from TOML.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }
}
