//! Benchmarks for model-output post-processing.

use articleflow::html::clean_html_response;
use articleflow::parser::parse_structured;
use articleflow::testing::fixtures;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn parser_benchmark(c: &mut Criterion) {
    let outline = fixtures::outline_json();
    c.bench_function("parse_structured_outline", |b| {
        b.iter(|| parse_structured(black_box(&outline), "Stage 2"))
    });
}

fn html_benchmark(c: &mut Criterion) {
    let article = fixtures::article_html();
    c.bench_function("clean_html_response", |b| {
        b.iter(|| clean_html_response(black_box(&article)))
    });
}

criterion_group!(benches, parser_benchmark, html_benchmark);
criterion_main!(benches);
