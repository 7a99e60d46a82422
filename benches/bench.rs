//! Criterion benchmarks for xlucene.
//!
//! Covers the three hot paths of a query's life:
//! - Parsing and type coercion
//! - Matching compiled queries against records
//! - Translation to the Elasticsearch DSL

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::hint::black_box;
use xlucene::matcher::DocumentMatcher;
use xlucene::parser::{CachedParser, Parser, Variables, parse};
use xlucene::translator::{Translator, TranslatorOptions};
use xlucene::types::{FieldType, TypeConfig};

const QUERIES: &[&str] = &[
    "name:bob",
    "name:bob AND age:>=21",
    "(status:open OR status:pending) AND NOT owner.name:alice",
    "age:[18 TO 65} AND created:>\"2020-01-01\" AND ip:\"10.0.0.0/8\"",
    "name:bo* OR name:/al.ce/ OR _exists_:email",
    "location:geoDistance(point:\"33.4,-111.8\" distance:50km) AND status:open",
];

fn type_config() -> TypeConfig {
    TypeConfig::new()
        .with_field("name", FieldType::String)
        .with_field("status", FieldType::String)
        .with_field("email", FieldType::String)
        .with_field("age", FieldType::Integer)
        .with_field("created", FieldType::Date)
        .with_field("ip", FieldType::Ip)
        .with_field("location", FieldType::GeoPoint)
        .with_field("owner", FieldType::Object)
        .with_field("owner.name", FieldType::String)
}

/// Generate records for matching benchmarks.
fn generate_records(count: usize) -> Vec<Value> {
    let names = ["bob", "alice", "carol", "dave", "erin"];
    let statuses = ["open", "pending", "closed"];
    (0..count)
        .map(|i| {
            json!({
                "name": names[i % names.len()],
                "status": statuses[i % statuses.len()],
                "age": (i % 80) as i64,
                "created": format!("20{:02}-06-15T12:00:00Z", 10 + i % 15),
                "ip": format!("10.{}.{}.{}", i % 256, (i / 7) % 256, (i / 3) % 256),
                "location": format!("{:.3},{:.3}", 33.0 + (i % 10) as f64 * 0.1, -112.0 + (i % 7) as f64 * 0.1),
                "owner": {"name": names[(i + 2) % names.len()]},
            })
        })
        .collect()
}

fn bench_parsing(c: &mut Criterion) {
    let config = type_config();
    let variables = Variables::new();
    let mut group = c.benchmark_group("parsing");

    group.throughput(Throughput::Elements(QUERIES.len() as u64));
    group.bench_function("parse_queries", |b| {
        b.iter(|| {
            for query in QUERIES {
                let _ = black_box(parse(black_box(query), &config, &variables));
            }
        })
    });

    let cached = CachedParser::new(Parser::new(config.clone()));
    group.bench_function("parse_queries_cached", |b| {
        b.iter(|| {
            for query in QUERIES {
                let _ = black_box(cached.parse(black_box(query), &variables));
            }
        })
    });

    group.finish();
}

fn bench_matching(c: &mut Criterion) {
    let config = type_config();
    let records = generate_records(1000);
    let mut group = c.benchmark_group("matching");

    group.bench_function("compile_matchers", |b| {
        let asts: Vec<_> = QUERIES
            .iter()
            .filter_map(|q| parse(q, &config, &Variables::new()).ok())
            .collect();
        b.iter(|| {
            for ast in &asts {
                black_box(DocumentMatcher::new(black_box(ast)));
            }
        })
    });

    group.throughput(Throughput::Elements(records.len() as u64));
    for (i, query) in QUERIES.iter().enumerate() {
        let Ok(ast) = parse(query, &config, &Variables::new()) else {
            continue;
        };
        let matcher = DocumentMatcher::new(&ast);
        group.bench_function(format!("match_records_{i}"), |b| {
            b.iter(|| {
                let count = records.iter().filter(|r| matcher.matches(black_box(r))).count();
                black_box(count)
            })
        });
    }

    group.finish();
}

fn bench_translation(c: &mut Criterion) {
    let config = type_config();
    let translator = Translator::new(TranslatorOptions::new().with_type_config(config.clone()));
    let asts: Vec<_> = QUERIES
        .iter()
        .filter_map(|q| parse(q, &config, &Variables::new()).ok())
        .collect();
    let mut group = c.benchmark_group("translation");

    group.throughput(Throughput::Elements(asts.len() as u64));
    group.bench_function("translate_queries", |b| {
        b.iter(|| {
            for ast in &asts {
                black_box(translator.translate(black_box(ast)));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_matching, bench_translation);
criterion_main!(benches);
