use criterion::{Criterion, criterion_group, criterion_main};
use fieldcheck::*;
use serde_json::json;
use std::hint::black_box;
use std::sync::Arc;

fn registry() -> Arc<RuleRegistry> {
    let config = RulesConfig::new(["base", "string", "number"]);
    Arc::new(RuleRegistry::from_config(&config, &ProviderCatalog::with_builtins()).unwrap())
}

fn bench_registry_build(c: &mut Criterion) {
    let catalog = ProviderCatalog::with_builtins();
    let config = RulesConfig::new(["base", "string", "number"]);

    c.bench_function("registry_from_config", |b| {
        b.iter(|| RuleRegistry::from_config(black_box(&config), &catalog).unwrap())
    });
}

fn bench_expression_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("expression_parsing");

    group.bench_function("parsed_rule", |b| {
        b.iter(|| ParsedRule::parse(black_box("string_regex:^\\d{2}:\\d{2}$")))
    });

    group.bench_function("field_rule_set", |b| {
        b.iter(|| {
            black_box(
                [
                    ("name", "required|string_alpha|string_length_max:40"),
                    ("email", "required|string_email"),
                    ("age", "required|number_between:18,130"),
                ]
                .into_iter()
                .collect::<FieldRuleSet>(),
            )
        })
    });

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let dispatcher = Dispatcher::new(registry());
    let email = json!("user@example.com");
    let rule = ParsedRule::parse("string_email");

    group.bench_function("string_email", |b| {
        b.iter(|| dispatcher.dispatch(black_box(&email), &rule).unwrap())
    });

    let missing = ParsedRule::parse("string_missing");
    group.bench_function("unknown_rule", |b| {
        b.iter(|| dispatcher.dispatch(black_box(&email), &missing).unwrap_err())
    });

    group.finish();
}

fn bench_validate_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_record");
    let registry = registry();

    let rules: FieldRuleSet = [
        ("name", "required|string_alpha|string_length_max:40"),
        ("email", "required|string_email"),
        ("id", "required|string_uuid"),
        ("age", "required|number_between:18,130"),
        ("role", "in:admin,editor,viewer"),
    ]
    .into_iter()
    .collect();

    let valid = json!({
        "name": "Ann",
        "email": "ann@example.com",
        "id": "550e8400-e29b-41d4-a716-446655440000",
        "age": 34,
        "role": "editor",
    });

    let invalid = json!({
        "name": "Ann 2",
        "email": "ann",
        "id": "nope",
        "age": 12,
        "role": "owner",
    });

    for (label, data) in [("valid", &valid), ("invalid", &invalid)] {
        let mut validator = Validator::new(registry.clone());
        validator.set_rules(rules.clone());
        validator.set_data_json(data);

        group.bench_function(label, |b| b.iter(|| black_box(validator.run())));
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_registry_build,
    bench_expression_parsing,
    bench_dispatch,
    bench_validate_record,
);
criterion_main!(benches);
