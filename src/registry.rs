//! Name to factory registries backing run-time selection of operators and formatters.

use std::{collections::HashMap, fmt::Display, hash::Hash};

use thiserror::Error;

/// Failure to resolve an implementation from a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No operator is registered for a benchmark mode.
    #[error("no operator registered for mode: {0}")]
    UnknownMode(String),
    /// No formatter is registered for a format.
    #[error("unknown formatter type: {0}")]
    UnknownFormat(String),
}

type Factory<T: ?Sized> = Box<dyn Fn() -> Box<T> + Send + Sync>;

/// Map from a key to a factory of boxed implementations.
///
/// Registering an existing key replaces its factory.
pub(crate) struct Registry<K, T: ?Sized> {
    factories: HashMap<K, Factory<T>>,
    missing: fn(String) -> RegistryError,
}

impl<K: Eq + Hash + Display, T: ?Sized> Registry<K, T> {
    pub(crate) fn new(missing: fn(String) -> RegistryError) -> Self {
        Self {
            factories: HashMap::new(),
            missing,
        }
    }

    pub(crate) fn register(&mut self, key: K, factory: impl Fn() -> Box<T> + Send + Sync + 'static) {
        if self.factories.insert(key, Box::new(factory)).is_some() {
            log::debug!("replaced previously registered factory");
        }
    }

    pub(crate) fn resolve(&self, key: &K) -> Result<Box<T>, RegistryError> {
        self.factories
            .get(key)
            .map(|factory| factory())
            .ok_or_else(|| (self.missing)(key.to_string()))
    }
}
