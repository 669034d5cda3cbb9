// fieldcheck - rule-based validation of keyed records
//
// Rule providers publish named rules into a registry; callers describe each
// field with a pipe-delimited rule expression and get back per-field errors.

// Re-export core functionality
pub use fieldcheck_validation::*;

pub use fieldcheck_config;
pub use fieldcheck_log;

use std::sync::Arc;

/// Validate `data` against `rules` once.
///
/// Returns the ruled fields on success, the collected errors otherwise.
///
/// ```
/// use fieldcheck::{Data, ProviderCatalog, RuleRegistry, RulesConfig};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let config = RulesConfig::new(["base", "number"]);
/// let registry = Arc::new(RuleRegistry::from_config(&config, &ProviderCatalog::with_builtins()).unwrap());
///
/// let data: Data = [("age".to_string(), json!(30))].into_iter().collect();
/// let valid = fieldcheck::validate(&registry, [("age", "required|number_min:18")].into_iter().collect(), data).unwrap();
/// assert_eq!(valid["age"], json!(30));
/// ```
pub fn validate(
    registry: &Arc<RuleRegistry>,
    rules: FieldRuleSet,
    data: Data,
) -> Result<Data, ValidationErrors> {
    let mut validator = Validator::make(registry.clone(), rules, data, Messages::new());
    if validator.run() {
        Ok(validator.validated())
    } else {
        Err(validator.errors().clone())
    }
}

/// Load [`RulesConfig`] from the process environment and build a validator
/// over the built-in providers.
///
/// A missing or malformed configuration yields a validator whose every rule
/// fails as not loaded.
pub fn from_env() -> RuleResult<Validator> {
    let config = RulesConfig::loader().load_env().load_or_empty();
    Validator::from_config(&config, &ProviderCatalog::with_builtins())
}

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Data,
        Dispatcher,
        FieldRuleSet,
        Messages,
        Operation,
        ParsedRule,
        ProviderCatalog,
        Rejection,
        RuleError,
        RuleProvider,
        RuleRegistry,
        RulesConfig,
        ValidationErrors,
        Validator,
        Verdict,
    };
}
