// Built-in rule providers

use crate::traits::{Operation, Rejection, RuleProvider};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

type Outcome = Result<(), Rejection>;

// ============================================================================
// Value helpers
// ============================================================================

/// Text form of a scalar; `null` reads as empty. Arrays and objects have none.
fn text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null => Some(Cow::Borrowed("")),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn text_or_reject(value: &Value) -> Result<Cow<'_, str>, Rejection> {
    text(value).ok_or_else(|| Rejection::new("expected a scalar value"))
}

fn number(value: &Value) -> Result<f64, Rejection> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| Rejection::new("expected a number"))
}

/// Empty in the loose sense: null, false, 0, "", "0", [] and {}.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn required_argument<'a>(argument: Option<&'a str>, rule: &str) -> Result<&'a str, Rejection> {
    argument.ok_or_else(|| Rejection::new(format!("{} requires an argument", rule)))
}

fn parse_argument<T: std::str::FromStr>(argument: &str, rule: &str) -> Result<T, Rejection> {
    argument
        .trim()
        .parse()
        .map_err(|_| Rejection::new(format!("{} has an invalid argument '{}'", rule, argument)))
}

/// A positive length bound; absent, zero and negative bounds are `None`.
fn length_bound(argument: Option<&str>, rule: &str) -> Result<Option<usize>, Rejection> {
    let Some(argument) = argument else {
        return Ok(None);
    };
    let bound: i64 = parse_argument(argument, rule)?;
    Ok(usize::try_from(bound).ok().filter(|bound| *bound > 0))
}

fn matching(regex: &Regex, value: &Value, reason: &str) -> Outcome {
    if regex.is_match(&text_or_reject(value)?) {
        Ok(())
    } else {
        Err(Rejection::new(reason))
    }
}

// ============================================================================
// Base rules
// ============================================================================

/// Untyped rules: `required`, `boolean`, `array`, `in:a,b,c`.
pub struct BaseRule;

impl BaseRule {
    fn required(value: &Value) -> Outcome {
        if is_blank(value) {
            Err(Rejection::new("value is required"))
        } else {
            Ok(())
        }
    }

    fn boolean(value: &Value) -> Outcome {
        let accepted = match value {
            Value::Bool(_) => true,
            Value::Number(n) => matches!(n.as_i64(), Some(0 | 1)),
            Value::String(s) => matches!(s.as_str(), "0" | "1" | "true" | "false"),
            _ => false,
        };
        if accepted {
            Ok(())
        } else {
            Err(Rejection::new("value must be a boolean"))
        }
    }

    fn array(value: &Value) -> Outcome {
        if value.is_array() {
            Ok(())
        } else {
            Err(Rejection::new("value must be an array"))
        }
    }

    fn one_of(value: &Value, argument: Option<&str>) -> Outcome {
        let allowed = required_argument(argument, "in")?;
        let value = text_or_reject(value)?;
        if allowed.split(',').any(|candidate| candidate.trim() == value) {
            Ok(())
        } else {
            Err(Rejection::new(format!("value must be one of {}", allowed)))
        }
    }
}

impl RuleProvider for BaseRule {
    fn rule_type(&self) -> &str {
        ""
    }

    fn operations(&self) -> Vec<Operation> {
        vec![
            Operation::new("requiredValidate", |value, _| Self::required(value)),
            Operation::new("booleanValidate", |value, _| Self::boolean(value)),
            Operation::new("arrayValidate", |value, _| Self::array(value)),
            Operation::new("inValidate", Self::one_of),
        ]
    }
}

// ============================================================================
// String rules
// ============================================================================

/// String rules, published with the `string_` prefix.
pub struct StringRule;

impl StringRule {
    /// Passes without an argument or with a minimum of 0 or less.
    fn length_min(value: &Value, argument: Option<&str>) -> Outcome {
        let Some(min) = length_bound(argument, "string_length_min")? else {
            return Ok(());
        };
        let length = text_or_reject(value)?.chars().count();
        if length < min {
            Err(Rejection::new(format!(
                "must be at least {} characters, got {}",
                min, length
            )))
        } else {
            Ok(())
        }
    }

    /// Passes without an argument or with a maximum of 0 or less.
    fn length_max(value: &Value, argument: Option<&str>) -> Outcome {
        let Some(max) = length_bound(argument, "string_length_max")? else {
            return Ok(());
        };
        let length = text_or_reject(value)?.chars().count();
        if length > max {
            Err(Rejection::new(format!(
                "must be at most {} characters, got {}",
                max, length
            )))
        } else {
            Ok(())
        }
    }

    fn regex(value: &Value, argument: Option<&str>) -> Outcome {
        let pattern = required_argument(argument, "string_regex")?;
        let regex = Regex::new(pattern)
            .map_err(|e| Rejection::new(format!("invalid pattern '{}': {}", pattern, e)))?;
        matching(&regex, value, "does not match required pattern")
    }
}

impl RuleProvider for StringRule {
    fn operations(&self) -> Vec<Operation> {
        vec![
            Operation::new("lengthMinValidate", Self::length_min),
            Operation::new("lengthMaxValidate", Self::length_max),
            Operation::new("emailValidate", |value, _| {
                matching(&EMAIL_REGEX, value, "must be a valid email")
            }),
            Operation::new("urlValidate", |value, _| {
                matching(&URL_REGEX, value, "must be a valid URL")
            }),
            Operation::new("uuidValidate", |value, _| {
                matching(&UUID_REGEX, value, "must be a valid UUID")
            }),
            Operation::new("alphaValidate", |value, _| {
                matching(&ALPHA_REGEX, value, "must contain only letters")
            }),
            Operation::new("alphanumericValidate", |value, _| {
                matching(&ALPHANUMERIC_REGEX, value, "must contain only letters and numbers")
            }),
            Operation::new("numericValidate", |value, _| {
                matching(&NUMERIC_REGEX, value, "must contain only digits")
            }),
            Operation::new("regexValidate", Self::regex),
        ]
    }
}

// ============================================================================
// Number rules
// ============================================================================

/// Numeric rules, published with the `number_` prefix. Numeric strings are
/// accepted.
pub struct NumberRule;

impl NumberRule {
    fn min(value: &Value, argument: Option<&str>) -> Outcome {
        let min: f64 = parse_argument(required_argument(argument, "number_min")?, "number_min")?;
        let value = number(value)?;
        if value < min {
            Err(Rejection::new(format!("must be at least {}", min)))
        } else {
            Ok(())
        }
    }

    fn max(value: &Value, argument: Option<&str>) -> Outcome {
        let max: f64 = parse_argument(required_argument(argument, "number_max")?, "number_max")?;
        let value = number(value)?;
        if value > max {
            Err(Rejection::new(format!("must be at most {}", max)))
        } else {
            Ok(())
        }
    }

    fn positive(value: &Value) -> Outcome {
        if number(value)? > 0.0 {
            Ok(())
        } else {
            Err(Rejection::new("must be a positive number"))
        }
    }

    /// `between:min,max`, bounds inclusive
    fn between(value: &Value, argument: Option<&str>) -> Outcome {
        let argument = required_argument(argument, "number_between")?;
        let (min, max) = argument.split_once(',').ok_or_else(|| {
            Rejection::new(format!("number_between expects 'min,max', got '{}'", argument))
        })?;
        let min: f64 = parse_argument(min, "number_between")?;
        let max: f64 = parse_argument(max, "number_between")?;
        let value = number(value)?;
        if value >= min && value <= max {
            Ok(())
        } else {
            Err(Rejection::new(format!("must be between {} and {}", min, max)))
        }
    }
}

impl RuleProvider for NumberRule {
    fn operations(&self) -> Vec<Operation> {
        vec![
            Operation::new("minValidate", Self::min),
            Operation::new("maxValidate", Self::max),
            Operation::new("positiveValidate", |value, _| Self::positive(value)),
            Operation::new("betweenValidate", Self::between),
        ]
    }
}
