use criterion::{Criterion, criterion_group, criterion_main};
use docsmith_engine::render::{MathError, MathMode, NoMath, render, tokenize};
use docsmith_engine::AttachmentStore;
mod common;

fn fake_tex(source: &str, mode: MathMode) -> Result<String, MathError> {
    Ok(match mode {
        MathMode::Inline => format!("<i>{}</i>", source.len()),
        MathMode::Display => format!("<b>{}</b>", source.len()),
    })
}

fn bench_plain_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_plain");
    group.sample_size(20);

    let content = common::generate_plain_text(200);
    let store = AttachmentStore::new();
    group.bench_function("escape_only", |b| {
        b.iter(|| {
            let markup = render(std::hint::black_box(&content), &store, &NoMath);
            std::hint::black_box(markup);
        });
    });

    group.finish();
}

fn bench_rich_section(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_rich");
    group.sample_size(20);

    let (content, store) = common::generate_rich_section(100);
    group.bench_function("tokenize", |b| {
        b.iter(|| {
            let tokens = tokenize(std::hint::black_box(&content), &store);
            std::hint::black_box(tokens);
        });
    });
    group.bench_function("render_with_math", |b| {
        b.iter(|| {
            let markup = render(std::hint::black_box(&content), &store, &fake_tex);
            std::hint::black_box(markup);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_plain_text, bench_rich_section);
criterion_main!(benches);
