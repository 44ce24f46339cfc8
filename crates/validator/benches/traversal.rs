//! Benchmarks for schema resolution and traversal
//!
//! Measures:
//! - Cold resolution of a small type graph
//! - Warm validation of a valid graph (cache hits only)
//! - Validation of a wide list with failing elements

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tessera_validator::prelude::*;

fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with_type(
            TypeDef::new("Customer")
                .member(MemberDef::new("name", DeclaredType::Text).spec(RuleSpec::required()))
                .member(MemberDef::new("email", DeclaredType::Text).spec(RuleSpec::email()))
                .member(MemberDef::new("addresses", DeclaredType::list(DeclaredType::named("Address")))),
        )
        .with_type(
            TypeDef::new("Address")
                .member(MemberDef::new("street", DeclaredType::Text).spec(RuleSpec::required()))
                .member(MemberDef::new("zip", DeclaredType::Text).spec(RuleSpec::pattern("[0-9]{5}"))),
        )
}

fn customer(addresses: usize, valid: bool) -> Value {
    let zip = if valid { "10115" } else { "1011" };
    let list = (0..addresses)
        .map(|_| Object::new("Address").with("street", "Main St").with("zip", zip).into())
        .collect::<Vec<Value>>();
    Object::new("Customer")
        .with("name", "Ada")
        .with("email", "ada@example.com")
        .with("addresses", list)
        .into()
}

fn resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema/resolution");

    group.bench_function("cold", |b| {
        b.iter(|| {
            let cache = SchemaCache::builder()
                .resolver(ReflectionResolver::new(catalog()))
                .build();
            black_box(cache.get_or_resolve(&"Customer".into()))
        });
    });

    group.bench_function("warm", |b| {
        let cache = SchemaCache::builder()
            .resolver(ReflectionResolver::new(catalog()))
            .build();
        let name = TypeName::new("Customer");
        b.iter(|| black_box(cache.get_or_resolve(&name)));
    });

    group.finish();
}

fn traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/traversal");
    let cache = SchemaCache::builder()
        .resolver(ReflectionResolver::new(catalog()))
        .build();
    let validator = Validator::new(Arc::new(cache));
    let name = TypeName::new("Customer");

    for size in [1usize, 16, 256] {
        let valid = customer(size, true);
        group.bench_with_input(BenchmarkId::new("valid", size), &valid, |b, value| {
            b.iter(|| black_box(validator.check(&name, value)));
        });

        let invalid = customer(size, false);
        group.bench_with_input(BenchmarkId::new("invalid", size), &invalid, |b, value| {
            b.iter(|| black_box(validator.check(&name, value)));
        });
    }

    group.finish();
}

criterion_group!(benches, resolution, traversal);
criterion_main!(benches);
