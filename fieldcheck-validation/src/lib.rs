//! Rule-based validation for fieldcheck
//!
//! Rules are published by providers, collected into a [`RuleRegistry`] and
//! referenced from pipe-delimited expressions such as
//! `required|string_length_min:2`.
//!
//! # Examples
//!
//! ## Validating a record
//!
//! ```
//! use fieldcheck_validation::{FieldRuleSet, ProviderCatalog, RulesConfig, Validator};
//! use serde_json::json;
//!
//! let config = RulesConfig::new(["base", "string", "number"]);
//! let mut validator = Validator::from_config(&config, &ProviderCatalog::with_builtins()).unwrap();
//!
//! let rules: FieldRuleSet = [
//!     ("email", "required|string_email"),
//!     ("age", "required|number_min:18"),
//! ]
//! .into_iter()
//! .collect();
//!
//! validator
//!     .set_rules(rules)
//!     .set_data([("email", json!("ann@example.com")), ("age", json!(17))]);
//!
//! assert!(!validator.run());
//! assert!(validator.errors().get("age", "number_min").is_some());
//! assert!(!validator.errors().contains_field("email"));
//! ```
//!
//! ## Custom providers
//!
//! Operations named `<alias>Validate` are published as `<type>_<alias>`,
//! where the type comes from [`RuleProvider::rule_type`].
//!
//! ```
//! use fieldcheck_validation::{Operation, Rejection, RuleProvider, RuleRegistry};
//! use std::sync::Arc;
//!
//! struct Slug;
//!
//! impl RuleProvider for Slug {
//!     fn rule_type(&self) -> &str {
//!         "slug"
//!     }
//!
//!     fn operations(&self) -> Vec<Operation> {
//!         vec![Operation::new("lowerCaseValidate", |value, _| {
//!             match value.as_str() {
//!                 Some(s) if s == s.to_lowercase() => Ok(()),
//!                 _ => Err(Rejection::new("must be lowercase")),
//!             }
//!         })]
//!     }
//! }
//!
//! let registry = RuleRegistry::from_providers([Arc::new(Slug) as Arc<dyn RuleProvider>]).unwrap();
//! assert!(registry.contains("slug_lower_case"));
//! ```

mod catalog;
mod discovery;
mod dispatch;
mod errors;
mod expression;
mod providers;
mod registry;
mod traits;
mod validator;

pub use catalog::*;
pub use discovery::*;
pub use dispatch::*;
pub use errors::*;
pub use expression::*;
pub use providers::*;
pub use registry::*;
pub use traits::*;
pub use validator::*;

pub use fieldcheck_config::{DEFAULT_MESSAGE_TEMPLATE, RulesConfig, RulesConfigLoader};
