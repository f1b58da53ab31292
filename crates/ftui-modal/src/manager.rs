#![forbid(unsafe_code)]

//! Modal manager: binds named variants and their default settings to a
//! [`ModalStore`] and exposes the two request APIs.
//!
//! - [`ModalManager::modal`]: fire-and-forget, returns a [`Closer`].
//! - [`ModalManager::prompt`]: returns a [`Prompt`] future that settles when
//!   the entry is dismissed.
//!
//! # Variant Resolution
//!
//! Requested name, else the configured default variant, else
//! [`FALLBACK_VARIANT`]. The resolved name must be registered; there is no
//! silent fallback to another variant.
//!
//! # Example
//!
//! ```
//! use ftui_modal::{Mapping, ModalManager, ModalManagerConfig, ModalOptions};
//!
//! let manager = ModalManager::<&str, &str>::new(
//!     ModalManagerConfig::new()
//!         .variant("default", "dialog")
//!         .variant("alternate", "sheet")
//!         .default_settings("alternate", Mapping::new().with("placement", "bottom")),
//! )
//! .unwrap();
//!
//! let closer = manager
//!     .modal("payment", ModalOptions::new().variant("alternate"))
//!     .unwrap();
//! assert_eq!(manager.store().len(), 1);
//!
//! closer.close();
//! assert!(manager.store().is_empty());
//! ```

use std::fmt;
use std::rc::Rc;

use crate::config::ModalManagerConfig;
use crate::error::{ModalError, Result};
use crate::handle::Closer;
use crate::mapping::Mapping;
use crate::prompt::{self, Prompt};
use crate::store::{ModalStore, OpenOptions};

/// Variant name used when neither the request nor the configuration names
/// one.
pub const FALLBACK_VARIANT: &str = "default";

/// Per-request options for [`ModalManager::modal`] and
/// [`ModalManager::prompt`].
#[derive(Debug, Clone, Default)]
pub struct ModalOptions {
    variant: Option<String>,
    settings: Mapping,
    props: Mapping,
}

impl ModalOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn variant(mut self, name: impl Into<String>) -> Self {
        self.variant = Some(name.into());
        self
    }

    /// Settings overriding the variant's defaults (shallow, per key).
    #[must_use]
    pub fn settings(mut self, settings: Mapping) -> Self {
        self.settings = settings;
        self
    }

    /// Props forwarded to the content component.
    #[must_use]
    pub fn props(mut self, props: Mapping) -> Self {
        self.props = props;
        self
    }
}

/// Facade that validates variants, merges settings, and opens entries.
pub struct ModalManager<V, C> {
    store: ModalStore<V, C>,
    config: Rc<ModalManagerConfig<V>>,
}

impl<V, C> Clone for ModalManager<V, C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: Rc::clone(&self.config),
        }
    }
}

/// Build a manager with its own store.
pub fn create_modal_manager<V, C>(config: ModalManagerConfig<V>) -> Result<ModalManager<V, C>>
where
    V: Clone + 'static,
    C: 'static,
{
    ModalManager::new(config)
}

impl<V, C> ModalManager<V, C>
where
    V: Clone + 'static,
    C: 'static,
{
    /// Build a manager with a fresh store.
    ///
    /// # Errors
    ///
    /// [`ModalError::NoVariants`] if no variant is registered.
    pub fn new(config: ModalManagerConfig<V>) -> Result<Self> {
        Self::with_store(config, ModalStore::new())
    }

    /// Build a manager on top of an existing store.
    pub fn with_store(config: ModalManagerConfig<V>, store: ModalStore<V, C>) -> Result<Self> {
        if config.variants.is_empty() {
            return Err(ModalError::NoVariants);
        }
        let default = config
            .default_variant
            .as_deref()
            .unwrap_or(FALLBACK_VARIANT);
        if !config.variants.contains_key(default) {
            // Only an error once a request actually falls back to it.
            tracing::warn!(
                default_variant = default,
                available = %config.variant_names().collect::<Vec<_>>().join(", "),
                "default modal variant is not registered"
            );
        }
        Ok(Self {
            store,
            config: Rc::new(config),
        })
    }

    /// The underlying registry.
    #[must_use]
    pub fn store(&self) -> &ModalStore<V, C> {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &ModalManagerConfig<V> {
        &self.config
    }

    /// Resolve a requested variant name to a registered variant.
    ///
    /// # Errors
    ///
    /// [`ModalError::UnknownVariant`] listing every registered name.
    pub fn resolve_variant<'a>(&'a self, requested: Option<&'a str>) -> Result<(&'a str, &'a V)> {
        let name = requested
            .or(self.config.default_variant.as_deref())
            .unwrap_or(FALLBACK_VARIANT);
        match self.config.variants.get_key_value(name) {
            Some((name, variant)) => Ok((name.as_str(), variant)),
            None => {
                tracing::debug!(requested = name, "unknown modal variant requested");
                Err(ModalError::UnknownVariant {
                    requested: name.to_owned(),
                    available: self.config.variant_names().map(str::to_owned).collect(),
                })
            }
        }
    }

    /// Defaults for `variant` shallow-merged with `overrides`.
    #[must_use]
    pub fn settings_for(&self, variant: &str, overrides: &Mapping) -> Mapping {
        match self.config.default_settings.get(variant) {
            Some(defaults) => defaults.merged(overrides),
            None => overrides.clone(),
        }
    }

    fn open_options(&self, options: ModalOptions) -> Result<OpenOptions<V>> {
        let (name, variant) = self.resolve_variant(options.variant.as_deref())?;
        let settings = self.settings_for(name, &options.settings);
        Ok(OpenOptions::new(variant.clone())
            .settings(settings)
            .props(options.props))
    }

    /// Open a fire-and-forget modal.
    ///
    /// # Errors
    ///
    /// [`ModalError::UnknownVariant`]; the registry is left untouched.
    pub fn modal(&self, content: C, options: ModalOptions) -> Result<Closer> {
        let open = self.open_options(options)?;
        let key = self.store.open(content, open);
        Ok(self.store.closer(&key))
    }

    /// Open a modal and return a future of its resolution.
    ///
    /// The future settles exactly once, when the entry is dismissed. A
    /// prompt that is never closed stays pending.
    ///
    /// # Errors
    ///
    /// [`ModalError::UnknownVariant`]; the registry is left untouched.
    pub fn prompt(&self, content: C, options: ModalOptions) -> Result<Prompt> {
        let open = self.open_options(options)?;
        let (resolver, rx) = prompt::channel();
        let key = self.store.open(content, open.resolver(resolver));
        Ok(Prompt::new(key, rx))
    }
}

impl<V, C> fmt::Debug for ModalManager<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalManager")
            .field("variants", &self.config.variants.keys().collect::<Vec<_>>())
            .field("default_variant", &self.config.default_variant)
            .field("store", &self.store)
            .finish()
    }
}
