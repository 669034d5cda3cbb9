//! Fuzz target for rule expression parsing and dispatch.
//!
//! Arbitrary expressions and values must never panic, whatever rule names
//! or arguments they carry.

#![no_main]

use arbitrary::Arbitrary;
use fieldcheck_validation::*;
use libfuzzer_sys::fuzz_target;
use serde_json::json;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Field name -> pipe-delimited expression
    fields: Vec<(String, String)>,
    /// Text value given to every field
    text: String,
    number: i64,
    use_number: bool,
}

fn registry() -> Arc<RuleRegistry> {
    static REGISTRY: OnceLock<Arc<RuleRegistry>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| {
            let config = RulesConfig::new(["base", "string", "number"]);
            let registry = RuleRegistry::from_config(&config, &ProviderCatalog::with_builtins())
                .expect("built-in providers register");
            Arc::new(registry)
        })
        .clone()
}

fuzz_target!(|input: FuzzInput| {
    // Parsing keeps everything after the first separator as the argument
    for (_, expression) in &input.fields {
        for token in expression.split(RULE_SEPARATOR) {
            let parsed = ParsedRule::parse(token);
            match &parsed.argument {
                Some(argument) => {
                    assert_eq!(format!("{}:{}", parsed.rule, argument), token);
                    assert!(!parsed.rule.contains(ARGUMENT_SEPARATOR));
                }
                None => assert_eq!(parsed.rule, token),
            }
        }
    }

    let rules: FieldRuleSet = input
        .fields
        .iter()
        .map(|(field, expression)| (field.as_str(), expression.as_str()))
        .collect();

    let value = if input.use_number {
        json!(input.number)
    } else {
        json!(input.text)
    };

    let mut validator = Validator::new(registry());
    validator.set_rules(rules.clone());
    validator.set_data(rules.fields().map(|field| (field.to_string(), value.clone())));

    let passed = validator.run();
    assert_eq!(passed, validator.errors().is_empty());
    if !passed {
        assert!(validator.validated().is_empty());
    }
});
