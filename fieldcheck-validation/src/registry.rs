// Rule registry

use crate::catalog::ProviderCatalog;
use crate::discovery::discover;
use crate::errors::{RuleError, RuleResult};
use crate::traits::{RuleFn, RuleProvider};
use fieldcheck_config::RulesConfig;
use fieldcheck_log::{debug, info, warn};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A registered provider and the rules it publishes.
pub struct ProviderDescriptor {
    provider: Arc<dyn RuleProvider>,
    type_tag: String,
    /// Operation identifier -> published rule name
    operations: IndexMap<String, String>,
}

impl ProviderDescriptor {
    pub fn provider(&self) -> &Arc<dyn RuleProvider> {
        &self.provider
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn operations(&self) -> &IndexMap<String, String> {
        &self.operations
    }

    /// Published rule names, in declaration order
    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.operations.values().map(String::as_str)
    }

    pub fn publishes(&self, rule: &str) -> bool {
        self.operations.values().any(|published| published == rule)
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("provider", &self.provider.identity())
            .field("type_tag", &self.type_tag)
            .field("operations", &self.operations)
            .finish()
    }
}

/// Index entry for one published rule.
#[derive(Clone)]
pub struct RuleEntry {
    /// Position of the owning descriptor
    pub descriptor: usize,
    pub handler: RuleFn,
}

/// The namespace of all published rules.
///
/// Built once, then shared read-only (typically as `Arc<RuleRegistry>`)
/// by any number of validators.
#[derive(Default)]
pub struct RuleRegistry {
    descriptors: Vec<ProviderDescriptor>,
    index: IndexMap<String, RuleEntry>,
}

impl RuleRegistry {
    /// An empty registry. Every dispatch against it fails with
    /// [`RuleError::RegistryNotLoaded`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Register providers in order.
    pub fn from_providers<I>(providers: I) -> RuleResult<Self>
    where
        I: IntoIterator<Item = Arc<dyn RuleProvider>>,
    {
        let mut registry = Self::new();
        for provider in providers {
            registry.register(provider)?;
        }
        registry.log_summary();
        Ok(registry)
    }

    /// Instantiate the configured providers from `catalog`, in order.
    ///
    /// An empty provider list yields an empty registry rather than an error.
    pub fn from_config(config: &RulesConfig, catalog: &ProviderCatalog) -> RuleResult<Self> {
        let providers = config
            .providers
            .iter()
            .map(|id| catalog.instantiate(id))
            .collect::<RuleResult<Vec<_>>>()?;

        Self::from_providers(providers)
    }

    /// Run discovery on `provider` and add its rules.
    ///
    /// Fails without modifying the registry when the provider's type tag is
    /// already taken, or when one of its rule names is already published.
    pub fn register(&mut self, provider: Arc<dyn RuleProvider>) -> RuleResult<()> {
        let discovery = discover(provider.as_ref());

        if let Some(existing) = self
            .descriptors
            .iter()
            .find(|d| d.type_tag == discovery.type_tag)
        {
            return Err(RuleError::DuplicateRuleType {
                type_tag: discovery.type_tag,
                provider: provider.identity().to_string(),
                existing: existing.provider.identity().to_string(),
            });
        }

        let descriptor = self.descriptors.len();
        let mut operations = IndexMap::new();
        let mut entries: IndexMap<String, RuleEntry> = IndexMap::new();

        for operation in discovery.operations {
            let taken_by = self
                .index
                .get(&operation.rule)
                .map(|entry| self.descriptors[entry.descriptor].provider.identity())
                .or_else(|| {
                    entries
                        .contains_key(&operation.rule)
                        .then(|| provider.identity())
                });

            if let Some(existing) = taken_by {
                return Err(RuleError::DuplicateRuleName {
                    rule: operation.rule,
                    provider: provider.identity().to_string(),
                    existing: existing.to_string(),
                });
            }

            operations.insert(operation.identifier, operation.rule.clone());
            entries.insert(
                operation.rule,
                RuleEntry {
                    descriptor,
                    handler: operation.handler,
                },
            );
        }

        debug!(
            "Registered {} as '{}' with {} rules",
            provider.identity(),
            discovery.type_tag,
            operations.len()
        );

        self.index.extend(entries);
        self.descriptors.push(ProviderDescriptor {
            provider,
            type_tag: discovery.type_tag,
            operations,
        });

        Ok(())
    }

    /// At least one provider is registered
    pub fn is_loaded(&self) -> bool {
        !self.descriptors.is_empty()
    }

    pub fn descriptors(&self) -> &[ProviderDescriptor] {
        &self.descriptors
    }

    /// Whether any descriptor publishes `rule`.
    pub fn contains(&self, rule: &str) -> bool {
        self.descriptors.iter().any(|d| d.publishes(rule))
    }

    /// Index lookup used for dispatch
    pub fn resolve(&self, rule: &str) -> Option<&RuleEntry> {
        self.index.get(rule)
    }

    /// Number of published rules
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Type tag -> published rule names, in registration order.
    pub fn list_rules(&self) -> IndexMap<String, Vec<String>> {
        self.descriptors
            .iter()
            .map(|d| (d.type_tag.clone(), d.rules().map(str::to_string).collect()))
            .collect()
    }

    fn log_summary(&self) {
        if self.is_loaded() {
            info!(
                "Rule registry built: {} providers, {} rules",
                self.descriptors.len(),
                self.index.len()
            );
        } else {
            warn!("Rule registry is empty; every rule will be rejected");
        }
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("descriptors", &self.descriptors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{BaseRule, NumberRule, StringRule};
    use crate::traits::Operation;

    struct Tagged(&'static str, &'static [&'static str]);

    impl RuleProvider for Tagged {
        fn rule_type(&self) -> &str {
            self.0
        }

        fn operations(&self) -> Vec<Operation> {
            self.1
                .iter()
                .map(|id| Operation::new(*id, |_, _| Ok(())))
                .collect()
        }
    }

    fn shared(provider: impl RuleProvider + 'static) -> Arc<dyn RuleProvider> {
        Arc::new(provider)
    }

    #[test]
    fn test_string_length_min_is_listed() {
        let registry = RuleRegistry::from_providers([shared(Tagged(
            "string",
            &["lengthMinValidate"],
        ))])
        .unwrap();

        let rules = registry.list_rules();
        assert_eq!(rules["string"], vec!["string_length_min"]);
        assert!(registry.contains("string_length_min"));
        assert!(registry.resolve("string_length_min").is_some());
    }

    #[test]
    fn test_duplicate_type_in_either_order() {
        let a = || shared(Tagged("text", &["aValidate"]));
        let b = || shared(Tagged("text", &["bValidate"]));

        for providers in [[a(), b()], [b(), a()]] {
            let result = RuleRegistry::from_providers(providers);
            assert!(matches!(
                result,
                Err(RuleError::DuplicateRuleType { ref type_tag, .. }) if type_tag == "text"
            ));
        }
    }

    #[test]
    fn test_untyped_collision_with_typed_rule_is_rejected() {
        let mut registry = RuleRegistry::new();
        registry
            .register(shared(Tagged("string", &["requiredValidate"])))
            .unwrap();

        let err = registry
            .register(shared(Tagged("", &["stringRequiredValidate"])))
            .unwrap_err();
        assert!(matches!(err, RuleError::DuplicateRuleName { ref rule, .. } if rule == "string_required"));

        // Nothing from the rejected provider leaked in
        assert_eq!(registry.descriptors().len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_collision_within_one_provider() {
        let result = RuleRegistry::from_providers([shared(Tagged(
            "",
            &["lengthMinValidate", "lengthMinValidateThis"],
        ))]);

        // `lengthMinValidateThis` drops `This` and keeps `validate`
        assert!(result.is_ok());

        let result = RuleRegistry::from_providers([shared(Tagged(
            "",
            &["emailValidate", "emailCheckValidate", "EmailValidate"],
        ))]);
        assert!(matches!(result, Err(RuleError::DuplicateRuleName { .. })));
    }

    #[test]
    fn test_empty_registry() {
        let registry = RuleRegistry::from_providers(Vec::new()).unwrap();
        assert!(!registry.is_loaded());
        assert!(registry.is_empty());
        assert!(registry.list_rules().is_empty());
    }

    #[test]
    fn test_builtins_from_config() {
        let config = RulesConfig::new(["base", "string", "number"]);
        let registry =
            RuleRegistry::from_config(&config, &ProviderCatalog::with_builtins()).unwrap();

        let rules = registry.list_rules();
        let tags: Vec<_> = rules.keys().map(String::as_str).collect();
        assert_eq!(tags, vec!["", "string", "number"]);
        assert!(rules[""].contains(&"required".to_string()));
        assert!(rules["string"].contains(&"string_length_min".to_string()));
        assert!(rules["number"].contains(&"number_between".to_string()));
    }

    #[test]
    fn test_unknown_provider_in_config() {
        let config = RulesConfig::new(["base", "postal"]);
        let err = RuleRegistry::from_config(&config, &ProviderCatalog::with_builtins()).unwrap_err();
        assert_eq!(err, RuleError::UnknownProvider("postal".to_string()));
    }

    #[test]
    fn test_same_provider_twice_is_duplicate_type() {
        let result = RuleRegistry::from_providers([
            shared(BaseRule),
            shared(StringRule),
            shared(NumberRule),
            shared(StringRule),
        ]);
        assert!(matches!(
            result,
            Err(RuleError::DuplicateRuleType { ref type_tag, .. }) if type_tag == "string"
        ));
    }
}
