//! Benchmarks for extraction, injection and rule-driven transforms
//!
//! Copyright (c) 2025 Duomap Team
//! Licensed under the Apache-2.0 license

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use duomap_core::{
    extract, extract_cow, inject, transform, ConverterRegistry, Direction, Path, RuleSet,
};
use serde_json::{json, Value};

fn create_telecom_data(size: usize) -> Value {
    let telecom: Vec<Value> = (0..size)
        .map(|i| {
            json!({
                "system": if i % 3 == 0 { "phone" } else if i % 3 == 1 { "email" } else { "fax" },
                "value": format!("contact-{}", i),
                "rank": i + 1
            })
        })
        .collect();
    json!({"member": {"resourceType": "Practitioner", "telecom": telecom}})
}

fn path(raw: Value) -> Path {
    Path::from_value(&raw).unwrap()
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let data = create_telecom_data(100);

    let cases = vec![
        ("key", path(json!(["member", "resourceType"]))),
        ("index", path(json!(["member", "telecom", 50, "value"]))),
        ("filter", path(json!(["member", "telecom", {"rank": 99}, "value"]))),
        ("collection", path(json!(["member", "telecom", {"$collection": true, "$filter": {"system": "phone"}}]))),
    ];

    for (name, path) in &cases {
        group.bench_with_input(BenchmarkId::new("owned", name), path, |b, path| {
            b.iter(|| black_box(extract(black_box(&data), path)))
        });
        group.bench_with_input(BenchmarkId::new("borrowed", name), path, |b, path| {
            b.iter(|| black_box(extract_cow(black_box(&data), path)))
        });
    }

    group.finish();
}

fn bench_inject(c: &mut Criterion) {
    let mut group = c.benchmark_group("inject");
    let data = create_telecom_data(100);

    let cases = vec![
        ("create_nested", json!({}), path(json!(["member", "name", 0, "family", 0]))),
        ("upsert_existing", data.clone(), path(json!(["member", "telecom", {"rank": 99}, "use"]))),
        ("upsert_new", data, path(json!(["member", "telecom", {"system": "pager"}, "value"]))),
    ];

    for (name, target, path) in cases {
        group.bench_function(name, |b| {
            b.iter(|| black_box(inject(target.clone(), &path, json!("x"))))
        });
    }

    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    let rules = RuleSet::from_value(
        &json!([
            {"fhir": ["member", "resourceType"], "fhir_const": "Practitioner"},
            {"fhir": ["member", "name", 0, "family", 0], "form": ["lastName"]},
            {"fhir": ["member", "telecom", {"system": "email"}, "value"], "form": ["email"]},
            {
                "$mapping": [{"fhir": ["value"], "form": ["number"]}],
                "fhir": ["member", "telecom", {"$filter": {"system": "phone"}, "$collection": true}],
                "form": ["phones", {"$collection": true}]
            }
        ]),
        &ConverterRegistry::with_builtins(),
    )
    .unwrap();

    for size in [1usize, 10, 100] {
        let phones: Vec<Value> = (0..size).map(|i| json!({"number": format!("555-{:04}", i)})).collect();
        let form = json!({"lastName": "Last", "email": "a@b", "phones": phones});
        let fhir = transform(&form, rules.rules(), &Direction::new("form", "fhir")).unwrap();

        group.bench_with_input(BenchmarkId::new("forward", size), &form, |b, form| {
            b.iter(|| black_box(transform(form, rules.rules(), &Direction::new("form", "fhir"))))
        });
        group.bench_with_input(BenchmarkId::new("reverse", size), &fhir, |b, fhir| {
            b.iter(|| black_box(transform(fhir, rules.rules(), &Direction::new("fhir", "form"))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extract, bench_inject, bench_transform);
criterion_main!(benches);
