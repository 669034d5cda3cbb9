// Rule dispatch

use crate::errors::{RuleError, RuleResult, RuleViolation};
use crate::expression::ParsedRule;
use crate::registry::RuleRegistry;
use fieldcheck_log::trace;
use serde_json::Value;
use std::sync::Arc;

/// Outcome of running one rule against one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed(RuleViolation),
}

impl Verdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

/// Resolves parsed rules against a registry and runs them.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: Arc<RuleRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// Run `rule` against `value`.
    ///
    /// Checks, in order, that the registry is loaded, that some provider
    /// publishes the rule, and that the index resolves it. The operation is
    /// only invoked once all three hold. A rejection from the operation is a
    /// [`Verdict::Failed`], never an error.
    pub fn dispatch(&self, value: &Value, rule: &ParsedRule) -> RuleResult<Verdict> {
        if !self.registry.is_loaded() {
            return Err(RuleError::RegistryNotLoaded);
        }

        if !self.registry.contains(&rule.rule) {
            return Err(RuleError::RuleNotFound(rule.rule.clone()));
        }

        let entry = self
            .registry
            .resolve(&rule.rule)
            .ok_or_else(|| RuleError::Unresolved(rule.rule.clone()))?;

        match (entry.handler)(value, rule.argument()) {
            Ok(()) => Ok(Verdict::Passed),
            Err(rejection) => {
                trace!("Rule {} rejected value: {}", rule.rule, rejection);
                Ok(Verdict::Failed(RuleViolation::new(
                    rule.rule.clone(),
                    rejection.reason,
                )))
            }
        }
    }

    /// Parse `token` and dispatch it.
    pub fn dispatch_token(&self, value: &Value, token: &str) -> RuleResult<Verdict> {
        self.dispatch(value, &ParsedRule::parse(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{BaseRule, StringRule};
    use crate::traits::{Operation, Rejection, RuleProvider};
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every argument it is called with.
    #[derive(Default)]
    struct Recording {
        calls: Arc<Mutex<Vec<Option<String>>>>,
    }

    impl RuleProvider for Recording {
        fn rule_type(&self) -> &str {
            "rec"
        }

        fn operations(&self) -> Vec<Operation> {
            let calls = self.calls.clone();
            vec![Operation::new("seenValidate", move |_, arg| {
                calls
                    .lock()
                    .map_err(|_| Rejection::new("poisoned"))?
                    .push(arg.map(str::to_string));
                Ok(())
            })]
        }
    }

    fn builtins() -> Dispatcher {
        let registry = RuleRegistry::from_providers([
            Arc::new(BaseRule) as Arc<dyn RuleProvider>,
            Arc::new(StringRule),
        ])
        .unwrap();
        Dispatcher::new(Arc::new(registry))
    }

    #[test]
    fn test_pass_and_fail() {
        let dispatcher = builtins();

        assert_eq!(
            dispatcher.dispatch_token(&json!("abc"), "required").unwrap(),
            Verdict::Passed
        );

        match dispatcher.dispatch_token(&json!("a"), "string_length_min:2").unwrap() {
            Verdict::Failed(violation) => assert_eq!(violation.rule, "string_length_min"),
            Verdict::Passed => panic!("expected a violation"),
        }
    }

    #[test]
    fn test_empty_registry_is_not_loaded() {
        let dispatcher = Dispatcher::new(Arc::new(RuleRegistry::new()));
        assert_eq!(
            dispatcher.dispatch_token(&json!(1), "required"),
            Err(RuleError::RegistryNotLoaded)
        );
    }

    #[test]
    fn test_unknown_rule() {
        let dispatcher = builtins();
        assert_eq!(
            dispatcher.dispatch_token(&json!(1), "unknown_rule"),
            Err(RuleError::RuleNotFound("unknown_rule".to_string()))
        );
    }

    #[test]
    fn test_argument_passed_only_when_present() {
        let provider = Recording::default();
        let calls = provider.calls.clone();
        let registry = RuleRegistry::from_providers([Arc::new(provider) as Arc<dyn RuleProvider>])
            .unwrap();
        let dispatcher = Dispatcher::new(Arc::new(registry));

        for token in ["rec_seen", "rec_seen:", "rec_seen:a:b"] {
            assert!(dispatcher.dispatch_token(&json!(null), token).unwrap().is_passed());
        }

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![None, Some(String::new()), Some("a:b".to_string())]
        );
    }
}
