//! Operation discovery.
//!
//! Turns a provider's operation table into published rule names:
//!
//! - `lengthMinValidate` becomes alias `length_min` (split at uppercase
//!   letters, drop the last segment, join with `_`, lowercase);
//! - a type tag containing `::` is reduced to a short tag, so
//!   `my_app::rules::PostalCodeRule` becomes `postal_code`;
//! - the published name is `{tag}_{alias}`, or just `{alias}` when the tag
//!   is empty.

use crate::traits::{RuleFn, RuleProvider};
use fieldcheck_log::{debug, warn};

/// Marker an identifier must contain to be treated as a rule operation.
pub const VALIDATION_MARKER: &str = "Validate";

/// Separator that marks a type path rather than a short tag.
const PATH_SEPARATOR: &str = "::";

/// A provider operation that passed discovery.
pub struct DiscoveredOperation {
    pub identifier: String,
    pub rule: String,
    pub handler: RuleFn,
}

/// Result of running discovery over one provider.
pub struct Discovery {
    pub type_tag: String,
    pub operations: Vec<DiscoveredOperation>,
}

/// Discover the rule operations of `provider`.
pub fn discover(provider: &dyn RuleProvider) -> Discovery {
    let type_tag = resolve_type_tag(provider.rule_type());
    let mut operations = Vec::new();

    for operation in provider.operations() {
        if !is_rule_operation(&operation.identifier) {
            debug!(
                "Skipping {}::{}: not a validation operation",
                provider.identity(),
                operation.identifier
            );
            continue;
        }

        let Some(alias) = rule_alias(&operation.identifier) else {
            warn!(
                "Skipping {}::{}: identifier yields an empty rule name",
                provider.identity(),
                operation.identifier
            );
            continue;
        };

        operations.push(DiscoveredOperation {
            rule: published_name(&type_tag, &alias),
            identifier: operation.identifier,
            handler: operation.handler,
        });
    }

    Discovery {
        type_tag,
        operations,
    }
}

/// The marker must appear, case-insensitively, somewhere after the start.
pub fn is_rule_operation(identifier: &str) -> bool {
    identifier
        .to_ascii_lowercase()
        .find(&VALIDATION_MARKER.to_ascii_lowercase())
        .is_some_and(|position| position > 0)
}

/// Derive the rule alias from an operation identifier.
///
/// Returns `None` when nothing is left after dropping the last segment.
pub fn rule_alias(identifier: &str) -> Option<String> {
    let mut segments = split_camel(identifier);
    segments.pop();
    let alias = segments.join("_").to_lowercase();
    (!alias.is_empty()).then_some(alias)
}

/// Resolve the provider's declared type into the tag used as rule prefix.
pub fn resolve_type_tag(declared: &str) -> String {
    if !declared.contains(PATH_SEPARATOR) {
        return declared.to_string();
    }

    let without_generics = declared.split('<').next().unwrap_or(declared);
    let short = without_generics
        .rsplit(PATH_SEPARATOR)
        .next()
        .unwrap_or(without_generics);
    let short = short.strip_suffix("Rule").unwrap_or(short);

    split_camel(short).join("_").to_lowercase()
}

/// `{type_tag}_{alias}`, or `alias` alone for the untyped namespace.
pub fn published_name(type_tag: &str, alias: &str) -> String {
    if type_tag.is_empty() {
        alias.to_string()
    } else {
        format!("{}_{}", type_tag, alias)
    }
}

/// Split before every uppercase letter, dropping empty pieces.
fn split_camel(identifier: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;

    for (index, c) in identifier.char_indices() {
        if c.is_uppercase() && index > start {
            segments.push(&identifier[start..index]);
            start = index;
        }
    }
    if start < identifier.len() {
        segments.push(&identifier[start..]);
    }

    segments
}
