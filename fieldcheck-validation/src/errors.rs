// Engine errors and validation error records

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors raised by registry construction and rule dispatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// No providers are configured, so no rule can resolve
    #[error("Rule configuration not loaded or missing")]
    RegistryNotLoaded,

    /// The rule name is not published by any registered provider
    #[error("Rule {0} is missing or not loaded or has a different name")]
    RuleNotFound(String),

    /// Two providers claim the same type namespace
    #[error("Provider {provider} is of the same type '{type_tag}' as {existing}")]
    DuplicateRuleType {
        type_tag: String,
        provider: String,
        existing: String,
    },

    /// Two operations publish the same rule name
    #[error("Rule {rule} from {provider} is already published by {existing}")]
    DuplicateRuleName {
        rule: String,
        provider: String,
        existing: String,
    },

    /// A configured provider identifier has no factory in the catalog
    #[error("Unknown rule provider: {0}")]
    UnknownProvider(String),

    /// The rule was listed but the dispatch index had no entry for it
    #[error("Rule {0} is registered but could not be resolved")]
    Unresolved(String),
}

pub type RuleResult<T> = std::result::Result<T, RuleError>;

/// A rule that did not hold for a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// Published rule name
    pub rule: String,

    /// Explanation supplied by the provider
    pub reason: String,
}

impl RuleViolation {
    pub fn new(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule, self.reason)
    }
}

impl std::error::Error for RuleViolation {}

/// Per-field error messages collected by one validation run.
///
/// Fields and their entries keep insertion order. Entries are keyed by rule
/// name; unkeyed entries get their position (`"0"`, `"1"`, ...) as key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: IndexMap<String, IndexMap<String, String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field` under `rule`, replacing an earlier one.
    pub fn add(
        &mut self,
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.fields
            .entry(field.into())
            .or_default()
            .insert(rule.into(), message.into());
    }

    /// Append a message for `field` under the next positional key.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let entries = self.fields.entry(field.into()).or_default();
        let mut index = entries.len();
        while entries.contains_key(&index.to_string()) {
            index += 1;
        }
        entries.insert(index.to_string(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of messages across fields
    pub fn len(&self) -> usize {
        self.fields.values().map(IndexMap::len).sum()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// All messages for a field
    pub fn field(&self, field: &str) -> Option<&IndexMap<String, String>> {
        self.fields.get(field)
    }

    pub fn get(&self, field: &str, rule: &str) -> Option<&str> {
        self.fields.get(field)?.get(rule).map(String::as_str)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// First message of the first field with errors
    pub fn first(&self) -> Option<&str> {
        self.fields
            .values()
            .next()
            .and_then(|entries| entries.values().next())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, String>)> {
        self.fields.iter().map(|(field, entries)| (field.as_str(), entries))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "errors": self.fields })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, entries) in &self.fields {
            for message in entries.values() {
                writeln!(f, "{}: {}", field, message)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_and_unkeyed_entries() {
        let mut errors = ValidationErrors::new();
        errors.add("age", "required", "age is required");
        errors.push("rules_engine", "first");
        errors.push("rules_engine", "second");

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("age", "required"), Some("age is required"));
        assert_eq!(errors.get("rules_engine", "0"), Some("first"));
        assert_eq!(errors.get("rules_engine", "1"), Some("second"));
    }

    #[test]
    fn test_push_skips_taken_positions() {
        let mut errors = ValidationErrors::new();
        errors.add("field", "1", "keyed as one");
        errors.push("field", "a");
        errors.push("field", "b");

        assert_eq!(errors.get("field", "1"), Some("keyed as one"));
        assert_eq!(errors.get("field", "2"), Some("b"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_first_follows_insertion_order() {
        let mut errors = ValidationErrors::new();
        assert_eq!(errors.first(), None);

        errors.add("name", "string_alpha", "letters only");
        errors.add("age", "required", "age is required");
        errors.add("name", "required", "name is required");

        assert_eq!(errors.first(), Some("letters only"));
    }

    #[test]
    fn test_to_json_shape() {
        let mut errors = ValidationErrors::new();
        errors.add("age", "required", "missing");

        let json = errors.to_json();
        assert_eq!(json["errors"]["age"]["required"], "missing");
        assert_eq!(serde_json::to_value(&errors).unwrap()["age"]["required"], "missing");
    }

    #[test]
    fn test_rule_error_display() {
        let err = RuleError::RuleNotFound("unknown_rule".to_string());
        assert_eq!(
            err.to_string(),
            "Rule unknown_rule is missing or not loaded or has a different name"
        );

        let violation = RuleViolation::new("required", "value is empty");
        assert_eq!(violation.to_string(), "required: value is empty");
    }
}
