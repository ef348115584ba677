//! Named provider lookup with an optional default.
//!
//! The registry is built once at startup (usually via
//! [`ProviderRegistry::from_config`]) and then only read, so it can be shared
//! by reference across rendering threads.

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use super::{
    CloudinaryProvider, FastlyProvider, LiipImagineProvider, ModifierMapper, PlaceholderProvider,
};
use crate::config::{Config, ConfigError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("No provider specified and no default provider configured")]
    NoDefault,
    #[error("No providers configured")]
    Empty,
    #[error("Provider \"{name}\" not found. Available providers: {available}")]
    NotFound { name: String, available: String },
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: IndexMap<String, Arc<dyn ModifierMapper>>,
    default_name: Option<String>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("default_name", &self.default_name)
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose default is named up front. The name is not checked:
    /// providers are typically registered afterwards.
    pub fn with_default(name: impl Into<String>) -> Self {
        Self {
            providers: IndexMap::new(),
            default_name: Some(name.into()),
        }
    }

    /// Build the registry described by a configuration.
    ///
    /// `placeholder` is always available; the other providers are registered
    /// when their `[providers.<name>]` table is present.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        let providers = &config.providers;

        registry.register(PlaceholderProvider::new(
            providers.placeholder.clone().unwrap_or_default(),
        ));
        if let Some(cloudinary) = &providers.cloudinary {
            registry.register(CloudinaryProvider::new(cloudinary.clone()));
        }
        if let Some(fastly) = &providers.fastly {
            registry.register(FastlyProvider::new(fastly.clone()));
        }
        if let Some(liip) = &providers.liip_imagine {
            registry.register(LiipImagineProvider::new(liip.clone()));
        }

        registry
            .set_default(&config.provider)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(registry)
    }

    /// Add a provider, replacing any registered under the same name.
    pub fn register<M: ModifierMapper + 'static>(&mut self, mapper: M) {
        self.register_shared(Arc::new(mapper));
    }

    pub fn register_shared(&mut self, mapper: Arc<dyn ModifierMapper>) {
        let name = mapper.name().to_string();
        debug!(provider = %name, "registered provider");
        self.providers.insert(name, mapper);
    }

    /// Look up `name`, or the default provider when `name` is `None`.
    pub fn resolve(&self, name: Option<&str>) -> Result<&dyn ModifierMapper, ProviderError> {
        let name = name
            .or(self.default_name.as_deref())
            .ok_or(ProviderError::NoDefault)?;
        if self.providers.is_empty() {
            return Err(ProviderError::Empty);
        }
        self.providers
            .get(name)
            .map(|mapper| mapper.as_ref())
            .ok_or_else(|| self.not_found(name))
    }

    /// Make a registered provider the default.
    pub fn set_default(&mut self, name: &str) -> Result<(), ProviderError> {
        if !self.providers.contains_key(name) {
            return Err(self.not_found(name));
        }
        debug!(provider = name, "default provider");
        self.default_name = Some(name.to_string());
        Ok(())
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// Registered providers in registration order.
    pub fn providers(&self) -> impl Iterator<Item = (&str, &dyn ModifierMapper)> {
        self.providers
            .iter()
            .map(|(name, mapper)| (name.as_str(), mapper.as_ref()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn not_found(&self, name: &str) -> ProviderError {
        ProviderError::NotFound {
            name: name.to_string(),
            available: self.names().join(", "),
        }
    }
}
