// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Name-keyed soma model factory.
//!
//! A soma description block names its model (`model=leaky_integrate_fire`);
//! the registry turns that name into a fresh boxed instance. External models
//! are added through `register`, which is the extension point replacing the
//! original's shared-module loading.

use ahash::AHashMap;
use tracing::debug;

use super::lif::LeakyIntegrateFire;
use super::traits::SomaModel;
use super::truenorth::TrueNorthLif;
use crate::types::{ConfigError, ConfigResult};

/// Factory closure producing a fresh soma model instance.
pub type SomaFactory = Box<dyn Fn() -> Box<dyn SomaModel> + Send + Sync>;

/// Registry of soma model factories, keyed by model name.
pub struct SomaModelRegistry {
    factories: AHashMap<String, SomaFactory>,
}

impl SomaModelRegistry {
    /// Empty registry with no models.
    pub fn new() -> Self {
        Self {
            factories: AHashMap::new(),
        }
    }

    /// Registry holding the built-in models.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(LeakyIntegrateFire::NAME, || {
            Box::new(LeakyIntegrateFire::new())
        });
        registry.register(TrueNorthLif::NAME, || Box::new(TrueNorthLif::new()));
        registry
    }

    /// Register a model factory. A later registration under the same name
    /// replaces the earlier one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn SomaModel> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(model = %name, "soma model registered");
        self.factories.insert(name, Box::new(factory));
    }

    /// Create a model by name.
    pub fn create(&self, name: &str) -> ConfigResult<Box<dyn SomaModel>> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(ConfigError::UnknownModel(name.to_string())),
        }
    }

    /// Registered model names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for SomaModelRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_resolve() {
        let registry = SomaModelRegistry::with_builtins();
        assert_eq!(
            registry.create("leaky_integrate_fire").unwrap().model_name(),
            "leaky_integrate_fire"
        );
        assert_eq!(
            registry.create("truenorth").unwrap().model_name(),
            "truenorth"
        );
    }

    #[test]
    fn test_unknown_model_is_config_error() {
        let registry = SomaModelRegistry::with_builtins();
        match registry.create("hodgkin_huxley") {
            Err(err) => {
                assert!(matches!(err, ConfigError::UnknownModel(name) if name == "hodgkin_huxley"));
            }
            Ok(_) => panic!("expected ConfigError::UnknownModel"),
        }
    }

    #[test]
    fn test_user_registration_extends_lookup() {
        let mut registry = SomaModelRegistry::with_builtins();
        registry.register("custom_lif", || Box::new(LeakyIntegrateFire::new()));
        assert!(registry.create("custom_lif").is_ok());
    }
}
