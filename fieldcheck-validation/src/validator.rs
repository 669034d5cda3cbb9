// Validation orchestrator

use crate::catalog::ProviderCatalog;
use crate::dispatch::{Dispatcher, Verdict};
use crate::errors::{RuleResult, ValidationErrors};
use crate::expression::{FieldRuleSet, ParsedRule};
use crate::registry::RuleRegistry;
use fieldcheck_config::{DEFAULT_MESSAGE_TEMPLATE, RulesConfig};
use fieldcheck_log::debug;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Error key for failures of the rules engine itself.
pub const RULES_ENGINE_KEY: &str = "rules_engine";

/// Error key for problems with the validation request as a whole.
pub const VALIDATOR_KEY: &str = "validator";

pub const EMPTY_RULES_MESSAGE: &str = "Validation rules are empty, there is nothing to validate";

/// Field name -> value.
pub type Data = IndexMap<String, Value>;

/// Field name -> rule name -> custom failure message.
pub type Messages = IndexMap<String, IndexMap<String, String>>;

static NULL: Value = Value::Null;

/// Lifecycle of a [`Validator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Inputs set, no run since the last change
    Configured,
    /// A run is in progress
    Running,
    /// The last run finished with the current inputs
    Completed,
}

/// Runs every field's rules against its value and collects the failures.
///
/// A validator owns its run state; share the [`RuleRegistry`] instead of
/// the validator when validating from several threads.
///
/// ```
/// use fieldcheck_validation::{ProviderCatalog, RulesConfig, Validator};
/// use serde_json::json;
///
/// let config = RulesConfig::new(["base", "string"]);
/// let mut validator = Validator::from_config(&config, &ProviderCatalog::with_builtins()).unwrap();
///
/// validator
///     .set_rules([("name", "required|string_length_min:2")].into_iter().collect())
///     .set_data([("name", json!("J"))]);
///
/// assert!(!validator.run());
/// assert_eq!(
///     validator.first_error(),
///     "Invalid property - name. Validation failed in rule - string_length_min"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    dispatcher: Dispatcher,
    rules: FieldRuleSet,
    data: Data,
    messages: Messages,
    errors: ValidationErrors,
    state: RunState,
    message_template: String,
}

impl Validator {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry),
            rules: FieldRuleSet::new(),
            data: Data::new(),
            messages: Messages::new(),
            errors: ValidationErrors::new(),
            state: RunState::Configured,
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
        }
    }

    /// Build the registry from `config` and use its message template.
    pub fn from_config(config: &RulesConfig, catalog: &ProviderCatalog) -> RuleResult<Self> {
        let registry = RuleRegistry::from_config(config, catalog)?;
        Ok(Self::new(Arc::new(registry)).with_message_template(config.default_message.clone()))
    }

    /// A validator with all three inputs set, ready to [`run`](Self::run).
    pub fn make(
        registry: Arc<RuleRegistry>,
        rules: FieldRuleSet,
        data: Data,
        messages: Messages,
    ) -> Self {
        let mut validator = Self::new(registry);
        validator.rules = rules;
        validator.data = data;
        validator.messages = messages;
        validator
    }

    /// Template for failures without a custom message; `{field}` and
    /// `{rule}` are substituted.
    pub fn with_message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    pub fn set_rules(&mut self, rules: FieldRuleSet) -> &mut Self {
        self.rules = rules;
        self.state = RunState::Configured;
        self
    }

    pub fn set_data<I, K>(&mut self, data: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.data = data.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.state = RunState::Configured;
        self
    }

    /// Take the data from a JSON object; anything else clears the data.
    pub fn set_data_json(&mut self, data: &Value) -> &mut Self {
        let entries = data
            .as_object()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        self.data = entries;
        self.state = RunState::Configured;
        self
    }

    pub fn set_messages(&mut self, messages: Messages) -> &mut Self {
        self.messages = messages;
        self.state = RunState::Configured;
        self
    }

    /// Set one custom message.
    pub fn set_message(
        &mut self,
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut Self {
        self.messages
            .entry(field.into())
            .or_default()
            .insert(rule.into(), message.into());
        self.state = RunState::Configured;
        self
    }

    /// Replace the non-empty inputs, then [`run`](Self::run).
    pub fn validate(&mut self, rules: FieldRuleSet, data: Data, messages: Messages) -> bool {
        if !rules.is_empty() {
            self.set_rules(rules);
        }
        if !data.is_empty() {
            self.set_data(data);
        }
        if !messages.is_empty() {
            self.set_messages(messages);
        }
        self.run()
    }

    /// Validate the current inputs. Errors from a previous run are
    /// discarded first.
    ///
    /// Every rule of every field is attempted. Failures of the engine itself
    /// (unknown rule, empty registry) are recorded under
    /// [`RULES_ENGINE_KEY`] and do not stop the run.
    pub fn run(&mut self) -> bool {
        self.state = RunState::Running;
        self.errors.clear();

        if self.rules.is_empty() {
            self.errors.push(VALIDATOR_KEY, EMPTY_RULES_MESSAGE);
        }

        for (field, tokens) in self.rules.iter() {
            let value = self.data.get(field).unwrap_or(&NULL);

            for token in tokens {
                let rule = ParsedRule::parse(token);
                match self.dispatcher.dispatch(value, &rule) {
                    Ok(Verdict::Passed) => {}
                    Ok(Verdict::Failed(violation)) => {
                        debug!("Field {} failed {}: {}", field, violation.rule, violation.reason);
                        let message = self.message_for(field, &rule.rule);
                        self.errors.add(field, rule.rule, message);
                    }
                    Err(err) => {
                        debug!("Field {}: {}", field, err);
                        self.errors.push(RULES_ENGINE_KEY, err.to_string());
                    }
                }
            }
        }

        self.state = RunState::Completed;
        debug!(
            "Validated {} fields, {} errors",
            self.rules.len(),
            self.errors.len()
        );
        self.is_validated()
    }

    fn message_for(&self, field: &str, rule: &str) -> String {
        self.messages
            .get(field)
            .and_then(|rules| rules.get(rule))
            .filter(|message| !message.is_empty())
            .cloned()
            .unwrap_or_else(|| {
                self.message_template
                    .replace("{field}", field)
                    .replace("{rule}", rule)
            })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// The last run completed without errors and no input changed since.
    pub fn is_validated(&self) -> bool {
        self.state == RunState::Completed && self.errors.is_empty()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// First message of the first failing field, or `""`.
    pub fn first_error(&self) -> &str {
        self.errors.first().unwrap_or("")
    }

    /// Values of the fields that have rules, once validation passed.
    ///
    /// Empty unless [`is_validated`](Self::is_validated). Fields without
    /// rules are left out; ruled fields missing from the data are `null`.
    pub fn validated(&self) -> Data {
        if !self.is_validated() {
            return Data::new();
        }

        self.rules
            .fields()
            .map(|field| {
                let value = self.data.get(field).cloned().unwrap_or(Value::Null);
                (field.to_string(), value)
            })
            .collect()
    }

    /// Type tag -> published rule names of the underlying registry.
    pub fn list_rules(&self) -> IndexMap<String, Vec<String>> {
        self.dispatcher.registry().list_rules()
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        self.dispatcher.registry()
    }
}
