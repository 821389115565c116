//! Type resolution and tag extraction throughput.
//!
//! Run with: cargo bench --bench resolve

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use phpdoc_reflect::symbols::{ClassIndex, ClassKind, ClassSymbol};
use phpdoc_reflect::{DocContext, NameResolutionContext, ScopeMetadata, TypeResolver, extract_tags};

const TYPES: &[&str] = &[
    "int",
    "?User",
    "int|string|null",
    "User[]",
    "array<string, User>",
    "array{id: int, name?: string, tags: list<string>}",
    "int<1, 100>",
    "string<\"asc\", \"desc\">",
];

const COMMENT: &str = "/**
 * Find users.
 * Looks users up by id and
 * returns every match.
 *
 * @param int[] $ids
 * @param array{limit?: int, order: string<\"asc\", \"desc\">} $options
 * @return User[]|null
 * @throws \\InvalidArgumentException
 * @method static User create(array $attributes = [], ?string $name = null)
 */";

fn context() -> NameResolutionContext {
    let mut index = ClassIndex::new();
    index.insert(ClassSymbol::new("App\\Models\\User", ClassKind::Class));
    index.extend_known(["InvalidArgumentException"]);
    let scope = ScopeMetadata::new("App\\Http").with_import("User", "App\\Models\\User");
    NameResolutionContext::new("App\\Http\\Controller", Arc::new(scope), Arc::new(index))
        .with_own_type("App\\Http\\Controller")
}

fn bench_resolve(c: &mut Criterion) {
    let ctx = context();
    let mut group = c.benchmark_group("resolve");

    for raw in TYPES {
        group.bench_with_input(BenchmarkId::new("warm", raw), raw, |b, raw| {
            let resolver = TypeResolver::new();
            resolver.resolve(raw, &ctx).ok();
            b.iter(|| resolver.resolve(black_box(raw), &ctx))
        });
        group.bench_with_input(BenchmarkId::new("cold", raw), raw, |b, raw| {
            b.iter(|| {
                let resolver = TypeResolver::new();
                resolver.resolve(black_box(raw), &ctx)
            })
        });
    }
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let ctx = context();
    let resolver = TypeResolver::new();
    c.bench_function("extract_tags", |b| {
        b.iter(|| extract_tags(black_box(COMMENT), &DocContext::new(&resolver, &ctx)))
    });
}

criterion_group!(benches, bench_resolve, bench_extract);
criterion_main!(benches);
