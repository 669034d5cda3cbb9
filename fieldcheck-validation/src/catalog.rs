// Provider catalog

use crate::errors::{RuleError, RuleResult};
use crate::providers::{BaseRule, NumberRule, StringRule};
use crate::traits::RuleProvider;
use indexmap::IndexMap;
use std::sync::Arc;

type ProviderFactory = Arc<dyn Fn() -> Arc<dyn RuleProvider> + Send + Sync>;

/// Maps provider identifiers, as written in configuration, to factories.
#[derive(Clone, Default)]
pub struct ProviderCatalog {
    factories: IndexMap<String, ProviderFactory>,
}

impl ProviderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in providers as `base`, `string` and `number`.
    pub fn with_builtins() -> Self {
        Self::new()
            .with("base", || BaseRule)
            .with("string", || StringRule)
            .with("number", || NumberRule)
    }

    /// Add (or replace) a factory under `id`.
    pub fn with<P, F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        P: RuleProvider + 'static,
        F: Fn() -> P + Send + Sync + 'static,
    {
        self.factories.insert(
            id.into(),
            Arc::new(move || Arc::new(factory()) as Arc<dyn RuleProvider>),
        );
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build a fresh provider instance for `id`.
    pub fn instantiate(&self, id: &str) -> RuleResult<Arc<dyn RuleProvider>> {
        self.factories
            .get(id)
            .map(|factory| factory())
            .ok_or_else(|| RuleError::UnknownProvider(id.to_string()))
    }
}
