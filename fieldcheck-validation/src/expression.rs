// Rule expression parsing

use indexmap::IndexMap;

/// Separates sibling rules in a field's expression.
pub const RULE_SEPARATOR: char = '|';

/// Separates a rule name from its argument.
pub const ARGUMENT_SEPARATOR: char = ':';

/// A rule token split into name and optional argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedRule {
    pub rule: String,
    pub argument: Option<String>,
}

impl ParsedRule {
    /// Split on the first `:`. Everything after it, further colons
    /// included, is the argument. Never fails.
    pub fn parse(token: &str) -> Self {
        match token.split_once(ARGUMENT_SEPARATOR) {
            Some((rule, argument)) => Self {
                rule: rule.to_string(),
                argument: Some(argument.to_string()),
            },
            None => Self {
                rule: token.to_string(),
                argument: None,
            },
        }
    }

    /// Distinguishes `rule:` (empty argument) from `rule`.
    pub fn has_argument(&self) -> bool {
        self.argument.is_some()
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }
}

/// Whether a token carries an argument
pub fn is_composite(token: &str) -> bool {
    token.contains(ARGUMENT_SEPARATOR)
}

/// Field name -> rule tokens, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRuleSet {
    fields: IndexMap<String, Vec<String>>,
}

impl FieldRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field's pipe-delimited expression, replacing any earlier one.
    ///
    /// Empty tokens are kept; they fail later as unknown rules.
    pub fn insert(&mut self, field: impl Into<String>, expression: &str) {
        let tokens = expression
            .split(RULE_SEPARATOR)
            .map(str::to_string)
            .collect();
        self.fields.insert(field.into(), tokens);
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, tokens)| (field.as_str(), tokens.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldRuleSet
where
    K: Into<String>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (field, expression) in iter {
            set.insert(field, expression.as_ref());
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_token() {
        for token in ["required", "string_email", "", "a b"] {
            let parsed = ParsedRule::parse(token);
            assert_eq!(parsed.rule, token);
            assert!(!parsed.has_argument());
            assert!(!is_composite(token));
        }
    }

    #[test]
    fn test_composite_token() {
        let parsed = ParsedRule::parse("string_length_min:2");
        assert_eq!(parsed.rule, "string_length_min");
        assert_eq!(parsed.argument(), Some("2"));
        assert!(parsed.has_argument());
        assert!(is_composite("string_length_min:2"));
    }

    #[test]
    fn test_only_first_colon_splits() {
        let parsed = ParsedRule::parse("name:a:b");
        assert_eq!(parsed.rule, "name");
        assert_eq!(parsed.argument(), Some("a:b"));

        let parsed = ParsedRule::parse("string_regex:^\\d{2}:\\d{2}$");
        assert_eq!(parsed.argument(), Some("^\\d{2}:\\d{2}$"));
    }

    #[test]
    fn test_empty_argument_is_not_absent() {
        let parsed = ParsedRule::parse("string_length_min:");
        assert_eq!(parsed.rule, "string_length_min");
        assert_eq!(parsed.argument(), Some(""));
        assert!(parsed.has_argument());

        let parsed = ParsedRule::parse(":2");
        assert_eq!(parsed.rule, "");
        assert_eq!(parsed.argument(), Some("2"));
    }

    #[test]
    fn test_field_rule_set_keeps_order() {
        let set: FieldRuleSet = [
            ("name", "required|string_alpha"),
            ("age", "required|number_min:18|"),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.fields().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(
            set.get("age").unwrap(),
            &["required".to_string(), "number_min:18".to_string(), String::new()]
        );
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_insert_replaces() {
        let mut set = FieldRuleSet::new();
        set.insert("name", "required");
        set.insert("name", "string_alpha");

        assert_eq!(set.get("name").unwrap(), &["string_alpha".to_string()]);
        assert_eq!(set.len(), 1);
    }
}
