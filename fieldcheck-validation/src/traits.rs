// Rule provider contract

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Why an operation rejected a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: String,
}

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// A validation operation: receives the value and, when the rule token
/// carried one, its literal argument.
pub type RuleFn = Arc<dyn Fn(&Value, Option<&str>) -> Result<(), Rejection> + Send + Sync>;

/// One named operation offered by a provider.
#[derive(Clone)]
pub struct Operation {
    /// Camel-case identifier, e.g. `lengthMinValidate`
    pub identifier: String,
    pub handler: RuleFn,
}

impl Operation {
    pub fn new<F>(identifier: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value, Option<&str>) -> Result<(), Rejection> + Send + Sync + 'static,
    {
        Self {
            identifier: identifier.into(),
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// A module of validation operations.
///
/// Only operations whose identifier carries the `Validate` marker after its
/// first character become rules; see [`crate::discovery`] for how rule names
/// are derived.
///
/// ```
/// use fieldcheck_validation::{Operation, Rejection, RuleProvider};
///
/// struct PostalCodeRule;
///
/// impl RuleProvider for PostalCodeRule {
///     fn operations(&self) -> Vec<Operation> {
///         vec![Operation::new("usValidate", |value, _| match value.as_str() {
///             Some(code) if code.len() == 5 && code.bytes().all(|b| b.is_ascii_digit()) => Ok(()),
///             _ => Err(Rejection::new("not a US postal code")),
///         })]
///     }
/// }
///
/// // Published as `postal_code_us`.
/// ```
pub trait RuleProvider: Send + Sync {
    /// Namespace tag for this provider's rules.
    ///
    /// Defaults to the Rust type path, which is reduced to a short tag at
    /// registration. Return `""` to publish rules without a prefix.
    fn rule_type(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Name used in log lines and error messages
    fn identity(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Every operation this provider offers
    fn operations(&self) -> Vec<Operation>;
}
