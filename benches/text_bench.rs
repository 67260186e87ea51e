use catalog_search::query::parse_query;
use catalog_search::text::{normalize, tokenize};
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_text(c: &mut Criterion) {
    let text = include_str!("../README.md");
    c.bench_function("normalize_readme", |b| b.iter(|| normalize(text)));
    c.bench_function("tokenize_readme", |b| b.iter(|| tokenize(text)));
    c.bench_function("parse_query", |b| {
        b.iter(|| parse_query("nations saving -grace al* label:rough* year:2000-2011"))
    });
}

criterion_group!(benches, bench_text);
criterion_main!(benches);
